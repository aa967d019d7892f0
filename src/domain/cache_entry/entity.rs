//! Cache entry entity and related types

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::codec::{decode_embedding, encode_embedding};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Identifier assigned by the record store; also the vector index key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheEntryId(i64);

impl CacheEntryId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for CacheEntryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CacheEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility class of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    /// Served to every user
    Global,
    /// Served only to the owning user
    User,
}

impl CacheScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::User => "user",
        }
    }
}

impl FromStr for CacheScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Self::Global),
            "user" => Ok(Self::User),
            other => Err(DomainError::invalid_argument(format!(
                "Scope not recognized: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for CacheScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cache entry that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewCacheEntry {
    scope: CacheScope,
    user_id: Option<UserId>,
    language: String,
    embedding: Vec<u8>,
    content: String,
    created_at: DateTime<Utc>,
}

impl NewCacheEntry {
    /// Build an entry owned by `user` under `scope`.
    ///
    /// Global entries drop the owner so that `user_id` is set iff the scope is `User`.
    pub fn new(
        user: &User,
        scope: CacheScope,
        embedding: &[f32],
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let user_id = match scope {
            CacheScope::User => Some(user.id()),
            CacheScope::Global => None,
        };

        Self {
            scope,
            user_id,
            language: user.prompt_language().to_string(),
            embedding: encode_embedding(embedding),
            content: content.into(),
            created_at,
        }
    }

    pub fn scope(&self) -> CacheScope {
        self.scope
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn embedding_bytes(&self) -> &[u8] {
        &self.embedding
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Attach the store-generated id
    pub fn with_id(self, id: CacheEntryId) -> CacheEntry {
        CacheEntry {
            id,
            scope: self.scope,
            user_id: self.user_id,
            language: self.language,
            embedding: self.embedding,
            content: self.content,
            usage_count: 0,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// A durable cache entry
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    id: CacheEntryId,
    scope: CacheScope,
    user_id: Option<UserId>,
    language: String,
    embedding: Vec<u8>,
    content: String,
    usage_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Restore an entry from stored columns, rejecting rows whose owner does not
    /// match their scope
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: CacheEntryId,
        scope: CacheScope,
        user_id: Option<UserId>,
        language: String,
        embedding: Vec<u8>,
        content: String,
        usage_count: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        match (scope, user_id) {
            (CacheScope::Global, Some(owner)) => {
                return Err(DomainError::storage(format!(
                    "Cache entry {} is global but owned by user {}",
                    id, owner
                )));
            }
            (CacheScope::User, None) => {
                return Err(DomainError::storage(format!(
                    "Cache entry {} is user-scoped without an owner",
                    id
                )));
            }
            _ => {}
        }

        Ok(Self {
            id,
            scope,
            user_id,
            language,
            embedding,
            content,
            usage_count,
            created_at,
            updated_at,
        })
    }

    // Getters

    pub fn id(&self) -> CacheEntryId {
        self.id
    }

    pub fn scope(&self) -> CacheScope {
        self.scope
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn embedding_bytes(&self) -> &[u8] {
        &self.embedding
    }

    /// Decode the stored embedding back into the vector the index holds
    pub fn embedding(&self) -> Result<Vec<f32>, DomainError> {
        decode_embedding(&self.embedding)
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn usage_count(&self) -> i64 {
        self.usage_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether this entry may be served to `user`
    pub fn is_visible_to(&self, user: &User) -> bool {
        let owner_matches = self.scope == CacheScope::Global || self.user_id == Some(user.id());

        owner_matches && self.language == user.prompt_language()
    }

    // Mutators

    /// Count one more served hit
    pub fn record_hit(&mut self, at: DateTime<Utc>) {
        self.usage_count += 1;
        self.updated_at = at;
    }

    /// Override the last-update timestamp
    pub fn set_updated_at(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
