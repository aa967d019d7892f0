//! Cache endpoint payloads

use serde::{Deserialize, Serialize};

use crate::domain::cache_entry::{CacheEntryId, CacheScope};
use crate::domain::semantic_cache::{LookupOutcome, MissReason, ReclaimReport, StoredAnswer, SweepOutcome};

/// `POST /v1/query`
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub user_id: i64,
    /// Overrides the configured similarity threshold
    #[serde(default)]
    pub threshold: Option<f32>,
    /// Overrides the configured candidate count
    #[serde(default)]
    pub k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub hit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<CacheEntryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miss_reason: Option<MissReason>,
}

impl From<LookupOutcome> for QueryResponse {
    fn from(outcome: LookupOutcome) -> Self {
        match outcome {
            LookupOutcome::Hit(hit) => Self {
                hit: true,
                entry_id: Some(hit.entry_id),
                content: Some(hit.content),
                similarity: Some(hit.similarity),
                miss_reason: None,
            },
            LookupOutcome::Miss(reason) => Self {
                hit: false,
                entry_id: None,
                content: None,
                similarity: None,
                miss_reason: Some(reason),
            },
        }
    }
}

/// `POST /v1/answers`
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    pub query: String,
    pub answer: String,
    pub user_id: i64,
    /// `"global"` or `"user"`
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub success: bool,
    pub entry_id: CacheEntryId,
    pub content: String,
    pub scope: CacheScope,
}

impl From<StoredAnswer> for AnswerResponse {
    fn from(stored: StoredAnswer) -> Self {
        Self {
            success: true,
            entry_id: stored.entry_id,
            content: stored.content,
            scope: stored.scope,
        }
    }
}

/// `POST /admin/maintenance`; missing fields fall back to configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaintenanceRequest {
    #[serde(default)]
    pub max_vectors: Option<usize>,
    #[serde(default)]
    pub idle_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceResponse {
    pub rebuilt: bool,
    pub idle: SweepOutcome,
    pub capacity: SweepOutcome,
}

impl From<ReclaimReport> for MaintenanceResponse {
    fn from(report: ReclaimReport) -> Self {
        Self {
            rebuilt: report.rebuilt(),
            idle: report.idle,
            capacity: report.capacity,
        }
    }
}

/// `POST /admin/index/rebuild`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildResponse {
    pub vectors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::semantic_cache::CacheHit;

    #[test]
    fn test_miss_serialization_omits_hit_fields() {
        let response = QueryResponse::from(LookupOutcome::Miss(MissReason::BelowThreshold));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({"hit": false, "miss_reason": "below_threshold"}));
    }

    #[test]
    fn test_hit_serialization() {
        let response = QueryResponse::from(LookupOutcome::Hit(CacheHit {
            entry_id: CacheEntryId::new(3),
            content: "Valletta".into(),
            similarity: 1.0,
        }));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["hit"], true);
        assert_eq!(json["entry_id"], 3);
        assert_eq!(json["content"], "Valletta");
    }

    #[test]
    fn test_maintenance_request_defaults() {
        let request: MaintenanceRequest = serde_json::from_str("{}").unwrap();

        assert_eq!(request.max_vectors, None);
        assert_eq!(request.idle_days, None);
    }
}
