use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A site in the roster, before any feed work has been done for it.
///
/// Static entries come from `SETTINGS_FRIENDS_LINKS`; page-sourced entries
/// come from the friends-page extractor and never carry a feed suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FriendLink {
    pub name: String,
    pub link: String,
    pub avatar: String,
    pub feed_suffix: String,
}

impl FriendLink {
    pub fn new(name: impl Into<String>, link: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            avatar: avatar.into(),
            feed_suffix: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friend {
    pub name: String,
    pub link: String,
    pub avatar: String,
    /// Last feed discovery failure, cleared on the next successful run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Friend {
    pub fn new(entry: &FriendLink) -> Self {
        Self {
            name: entry.name.clone(),
            link: entry.link.clone(),
            avatar: entry.avatar.clone(),
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.error.as_deref().map_or(true, str::is_empty)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.link
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_friend_copies_roster_fields() {
        let entry = FriendLink::new("Alice", "https://a.example", "https://a.example/me.png");
        let friend = Friend::new(&entry);
        assert_eq!(friend.name, "Alice");
        assert_eq!(friend.link, "https://a.example");
        assert_eq!(friend.avatar, "https://a.example/me.png");
        assert!(friend.error.is_none());
    }

    #[test]
    fn test_is_alive() {
        let mut friend = Friend::new(&FriendLink::new("A", "https://a", ""));
        assert!(friend.is_alive());
        friend.error = Some(String::new());
        assert!(friend.is_alive());
        friend.error = Some("no feed discovered for https://a".into());
        assert!(!friend.is_alive());
    }

    #[test]
    fn test_display_name_falls_back_to_link() {
        let friend = Friend::new(&FriendLink::new("", "https://a", ""));
        assert_eq!(friend.display_name(), "https://a");
    }

    #[test]
    fn test_error_omitted_from_json_when_absent() {
        let friend = Friend::new(&FriendLink::new("A", "https://a", ""));
        let json = serde_json::to_value(&friend).unwrap();
        assert!(json.get("error").is_none());
    }
}
