//! Data transfer objects for web responses.
//!
//! Requests and successful responses are the domain's own serde types
//! (`Carpool` in, `EnhancedCarpool` out).

use serde::Serialize;

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
