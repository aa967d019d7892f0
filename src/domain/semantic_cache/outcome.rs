//! Result types of cache engine operations

use serde::{Deserialize, Serialize};

use crate::domain::cache_entry::{CacheEntryId, CacheScope};

/// Per-lookup overrides of the configured search parameters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookupOptions {
    /// Minimum similarity for a hit
    pub threshold: Option<f32>,
    /// Candidates fetched from the index
    pub k: Option<usize>,
}

impl LookupOptions {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold.clamp(0.0, 1.0));
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k.max(1));
        self
    }
}

/// A cached answer served for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheHit {
    pub entry_id: CacheEntryId,
    pub content: String,
    pub similarity: f32,
}

/// Why a lookup was not served from cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    /// No index file exists yet
    IndexUnavailable,
    /// No candidate cleared the similarity threshold
    BelowThreshold,
    /// The best candidate is scoped to another user or language
    NotVisible,
    /// The best candidate has no backing record
    Divergence,
}

impl MissReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IndexUnavailable => "index_unavailable",
            Self::BelowThreshold => "below_threshold",
            Self::NotVisible => "not_visible",
            Self::Divergence => "divergence",
        }
    }
}

/// Outcome of a lookup; a miss is a normal result, not an error
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Hit(CacheHit),
    Miss(MissReason),
}

impl LookupOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub fn hit(self) -> Option<CacheHit> {
        match self {
            Self::Hit(hit) => Some(hit),
            Self::Miss(_) => None,
        }
    }

    pub fn miss_reason(&self) -> Option<MissReason> {
        match self {
            Self::Hit(_) => None,
            Self::Miss(reason) => Some(*reason),
        }
    }
}

/// Answer recorded by a successful store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnswer {
    pub entry_id: CacheEntryId,
    pub content: String,
    pub scope: CacheScope,
}

/// Parameters of one reclaim run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReclaimParams {
    pub max_vectors: usize,
    pub idle_days: u32,
}

impl ReclaimParams {
    pub fn new(max_vectors: usize, idle_days: u32) -> Self {
        Self {
            max_vectors,
            idle_days,
        }
    }
}

/// Result of one reclaim sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Nothing to evict; no write happened
    Unchanged,
    /// Entries deleted and the index rebuilt
    Evicted { count: usize },
    /// The sweep failed; nothing past the failing step was applied
    Failed { message: String },
}

impl SweepOutcome {
    pub fn evicted(&self) -> usize {
        match self {
            Self::Evicted { count } => *count,
            _ => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of a reclaim run: both sweeps, each committed on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclaimReport {
    pub idle: SweepOutcome,
    pub capacity: SweepOutcome,
}

impl ReclaimReport {
    /// Whether either sweep deleted entries and rebuilt the index
    pub fn rebuilt(&self) -> bool {
        self.idle.evicted() > 0 || self.capacity.evicted() > 0
    }

    pub fn total_evicted(&self) -> usize {
        self.idle.evicted() + self.capacity.evicted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_options_clamp() {
        let options = LookupOptions::default().with_threshold(2.0).with_k(0);

        assert_eq!(options.threshold, Some(1.0));
        assert_eq!(options.k, Some(1));
    }

    #[test]
    fn test_lookup_outcome_accessors() {
        let hit = LookupOutcome::Hit(CacheHit {
            entry_id: CacheEntryId::new(1),
            content: "Valletta".into(),
            similarity: 0.97,
        });
        assert!(hit.is_hit());
        assert_eq!(hit.miss_reason(), None);
        assert_eq!(hit.hit().unwrap().content, "Valletta");

        let miss = LookupOutcome::Miss(MissReason::Divergence);
        assert!(!miss.is_hit());
        assert_eq!(miss.miss_reason(), Some(MissReason::Divergence));
    }

    #[test]
    fn test_reclaim_report_rebuilt() {
        let unchanged = ReclaimReport {
            idle: SweepOutcome::Unchanged,
            capacity: SweepOutcome::Unchanged,
        };
        assert!(!unchanged.rebuilt());

        let evicted = ReclaimReport {
            idle: SweepOutcome::Failed {
                message: "boom".into(),
            },
            capacity: SweepOutcome::Evicted { count: 2 },
        };
        assert!(evicted.rebuilt());
        assert_eq!(evicted.total_evicted(), 2);
    }

    #[test]
    fn test_sweep_outcome_serialization() {
        let json = serde_json::to_string(&SweepOutcome::Evicted { count: 3 }).unwrap();
        assert_eq!(json, r#"{"status":"evicted","count":3}"#);
    }
}
