//! Friends listing pages: the extraction expression language and the
//! extractor that turns a page into roster entries.

pub mod dsl;
pub mod page;

pub use dsl::Expression;
pub use page::{extract, fetch_friends_page};
