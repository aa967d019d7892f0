//! Semantic cache engine

mod engine;
#[cfg(test)]
mod faults;

pub use engine::CacheEngine;
