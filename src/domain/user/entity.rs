//! User entity and related types

use serde::{Deserialize, Serialize};

/// User identifier as assigned by the user table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user as seen by the cache: identity plus configured prompt language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    prompt_language: String,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>, prompt_language: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            prompt_language: prompt_language.into(),
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Language tag every cache entry created for this user inherits
    pub fn prompt_language(&self) -> &str {
        &self.prompt_language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accessors() {
        let user = User::new(UserId::new(3), "ana", "Português");

        assert_eq!(user.id(), UserId::new(3));
        assert_eq!(user.username(), "ana");
        assert_eq!(user.prompt_language(), "Português");
    }

    #[test]
    fn test_user_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");

        let id: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(id.value(), 7);
    }
}
