//! Vector index implementations

pub mod file;
mod flat;

pub use flat::FlatIndex;
