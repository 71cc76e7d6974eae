//! API request/response types shared by all routes

pub mod error;
pub mod json;
pub mod query;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use query::{QueryMetadata, QueryRequest, QueryResponse};
