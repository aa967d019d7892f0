//! User domain
//!
//! Users are reference data for the cache: their id decides visibility of
//! user-scoped entries and their prompt language filters every lookup.

mod entity;
mod repository;

pub use entity::{User, UserId};
pub use repository::UserRepository;
