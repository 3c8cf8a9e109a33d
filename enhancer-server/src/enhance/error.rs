//! Enhancement error types.

use crate::routing::RoutingError;
use crate::stops::StopsError;

use super::estimate::DegenerateSegment;

/// Why a carpool could not be enhanced.
///
/// Enhancement is all-or-nothing: any of these aborts the whole carpool.
#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    /// The router could not produce a usable path
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// A stop fell on a zero-length route segment
    #[error(transparent)]
    DegenerateSegment(#[from] DegenerateSegment),

    /// Fewer than two stop times survived filtering
    #[error("less than two stops after enhancement ({count} left)")]
    InsufficientStops { count: usize },

    /// The stop lookup failed
    #[error(transparent)]
    StopLookup(#[from] StopsError),
}

impl EnhanceError {
    /// Routing failures: no path, or a path too degenerate to time stops on.
    pub fn is_routing_failure(&self) -> bool {
        matches!(
            self,
            EnhanceError::Routing(_) | EnhanceError::DegenerateSegment(_)
        )
    }
}
