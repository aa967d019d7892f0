//! Record store capability
//!
//! Durable, transactional table of cache entries. Changes made through a
//! [`RecordTransaction`] stay invisible to other readers until `commit`.

mod repository;

pub use repository::{RecordStore, RecordTransaction};
