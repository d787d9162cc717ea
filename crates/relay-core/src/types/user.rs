//! User identity type.

use serde::{Deserialize, Serialize};

/// User identity (id, username, names, bot flag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_bot: bool,
}

impl User {
    /// Name shown to the model as the speaker: "first last", then username, then the numeric id.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        match &self.username {
            Some(u) if !u.is_empty() => u.clone(),
            _ => self.id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>, username: Option<&str>) -> User {
        User {
            id: 42,
            username: username.map(str::to_string),
            first_name: first.map(str::to_string),
            last_name: last.map(str::to_string),
            is_bot: false,
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(user(Some("Ada"), Some("Lovelace"), Some("ada")).display_name(), "Ada Lovelace");
        assert_eq!(user(Some("Ada"), None, None).display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_to_username_then_id() {
        assert_eq!(user(None, None, Some("ada")).display_name(), "ada");
        assert_eq!(user(Some(""), None, None).display_name(), "42");
    }
}
