//! Request and response types of the HTTP surface

pub mod cache;
pub mod error;
pub mod json;

pub use cache::{
    AnswerRequest, AnswerResponse, MaintenanceRequest, MaintenanceResponse, QueryRequest,
    QueryResponse, RebuildResponse,
};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
