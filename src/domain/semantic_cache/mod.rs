//! Semantic cache domain models
//!
//! Configuration and result types of the cache engine, which matches new
//! queries against previously answered ones by embedding similarity.

mod config;
mod outcome;

pub use config::SemanticCacheConfig;
pub use outcome::{
    CacheHit, LookupOptions, LookupOutcome, MissReason, ReclaimParams, ReclaimReport,
    StoredAnswer, SweepOutcome,
};
