//! Storage infrastructure - connection pooling, schema and backend selection

mod factory;
pub mod migrations;
mod postgres;

pub use factory::{SeedUser, StorageBackends, StorageConfig, StorageFactory, StorageType};
pub use migrations::{run_storage_migrations, storage_migrations, Migration, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig};
