//! Routing client error types.

use std::fmt;

/// Errors from the routing engine.
#[derive(Debug)]
pub enum RoutingError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Response body could not be parsed
    Json {
        message: String,
        body: Option<String>,
    },

    /// The router rejected the request (unreachable points, bad input, ...)
    Api { status: u16, message: String },

    /// The router answered without any path
    NoPath,

    /// The routed path has no usable length, e.g. all points snapped to the
    /// same road position
    DegeneratePath,
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::Http(e) => write!(f, "HTTP error: {e}"),
            RoutingError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            RoutingError::Api { status, message } => {
                write!(f, "routing error {status}: {message}")
            }
            RoutingError::NoPath => write!(f, "no path found"),
            RoutingError::DegeneratePath => {
                write!(f, "origin and destination too close to route")
            }
        }
    }
}

impl std::error::Error for RoutingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoutingError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RoutingError {
    fn from(err: reqwest::Error) -> Self {
        RoutingError::Http(err)
    }
}
