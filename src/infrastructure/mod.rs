//! Infrastructure layer - External service implementations

pub mod embedding;
pub mod logging;
pub mod observability;
pub mod record_store;
pub mod scheduler;
pub mod semantic_cache;
pub mod storage;
pub mod user;
pub mod vector_index;
