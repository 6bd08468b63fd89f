pub mod friend;
pub mod post;
pub mod snapshot;

pub use friend::{Friend, FriendLink};
pub use post::{Post, FEED_RULE};
pub use snapshot::{Snapshot, Stats, MAX_EXPORT_POSTS};
