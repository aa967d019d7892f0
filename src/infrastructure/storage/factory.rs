//! Storage factory for runtime backend selection

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::migrations::run_storage_migrations;
use super::postgres::{connect_pool, PostgresConfig};
use crate::domain::record_store::RecordStore;
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::record_store::{InMemoryRecordStore, PostgresRecordStore};
use crate::infrastructure::user::{InMemoryUserRepository, PostgresUserRepository};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    #[default]
    Memory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::Memory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

impl TryFrom<String> for StorageType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).ok_or_else(|| format!("unknown storage kind '{}'", value))
    }
}

/// User row loaded into the in-memory user table at startup
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: i64,
    pub username: String,
    pub prompt_language: String,
}

impl From<&SeedUser> for User {
    fn from(seed: &SeedUser) -> Self {
        User::new(UserId::new(seed.id), &seed.username, &seed.prompt_language)
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub kind: StorageType,
    pub postgres: PostgresConfig,
    /// Users available when running in memory
    pub memory_users: Vec<SeedUser>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageType::default(),
            postgres: PostgresConfig::default(),
            memory_users: vec![SeedUser {
                id: 1,
                username: "default".to_string(),
                prompt_language: "Português".to_string(),
            }],
        }
    }
}

/// Record store and user table sharing one backend
#[derive(Debug, Clone)]
pub struct StorageBackends {
    pub records: Arc<dyn RecordStore>,
    pub users: Arc<dyn UserRepository>,
}

/// Factory for creating storage backends
#[derive(Debug)]
pub struct StorageFactory;

impl StorageFactory {
    /// Creates the backends selected by the configuration
    pub async fn create(config: &StorageConfig) -> Result<StorageBackends, DomainError> {
        match config.kind {
            StorageType::Memory => {
                info!(users = config.memory_users.len(), "Using in-memory storage");

                Ok(StorageBackends {
                    records: Arc::new(InMemoryRecordStore::new()),
                    users: Arc::new(InMemoryUserRepository::with_users(
                        config.memory_users.iter().map(User::from),
                    )),
                })
            }
            StorageType::Postgres => {
                let pool = connect_pool(&config.postgres).await?;
                run_storage_migrations(&pool).await?;
                info!("Using PostgreSQL storage");

                Ok(StorageBackends {
                    records: Arc::new(PostgresRecordStore::new(pool.clone())),
                    users: Arc::new(PostgresUserRepository::new(pool)),
                })
            }
        }
    }
}
