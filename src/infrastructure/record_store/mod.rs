//! Record store implementations

mod in_memory;
mod postgres;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
