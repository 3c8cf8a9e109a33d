//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::domain::{Carpool, EnhancedCarpool};
use crate::enhance::EnhanceError;
use crate::geometry::carpool_span_m;

use super::dto::ErrorResponse;
use super::state::AppState;

/// Offers spanning less than this (first to last stop, meters) are rejected.
pub const MIN_TRIP_SPAN_M: f64 = 1000.0;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(enhance_carpool))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Enhance a carpool offer.
async fn enhance_carpool(
    State(state): State<AppState>,
    Json(carpool): Json<Carpool>,
) -> Result<Json<EnhancedCarpool>, AppError> {
    validate_carpool(&carpool)?;

    let enhanced = state.transformer.enhance(&carpool).await?;
    info!(
        trip = %enhanced.trip_id(),
        stops = enhanced.stops.len(),
        "carpool enhanced"
    );

    Ok(Json(enhanced))
}

/// Reject offers the pipeline cannot make sense of.
fn validate_carpool(carpool: &Carpool) -> Result<(), AppError> {
    if carpool.stops.len() < 2 {
        return Err(AppError::Unprocessable {
            message: format!("carpool {} needs at least two stops", carpool.trip_id()),
        });
    }

    let span = carpool_span_m(carpool);
    if span < MIN_TRIP_SPAN_M {
        return Err(AppError::Unprocessable {
            message: format!(
                "carpool {} spans only {span:.0} m, at least {MIN_TRIP_SPAN_M:.0} m required",
                carpool.trip_id()
            ),
        });
    }

    Ok(())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    Unprocessable { message: String },
    FailedDependency { message: String },
    Internal { message: String },
}

impl From<EnhanceError> for AppError {
    fn from(e: EnhanceError) -> Self {
        match e {
            EnhanceError::InsufficientStops { .. } => AppError::FailedDependency {
                message: e.to_string(),
            },
            _ if e.is_routing_failure() => AppError::FailedDependency {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Unprocessable { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            AppError::FailedDependency { message } => (StatusCode::FAILED_DEPENDENCY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, CachedRouter};
    use crate::enhance::{EnhancerConfig, TripTransformer};
    use crate::routing::{GraphHopperClient, GraphHopperConfig, RoutingError};
    use crate::stops::{StopsError, StopsStore};

    fn carpool(stops_json: &str) -> Carpool {
        serde_json::from_str(&format!(
            r#"{{"id": "1", "agency": "mfdz", "departureTime": "08:00", "stops": {stops_json}}}"#
        ))
        .unwrap()
    }

    /// State whose router points at a port nothing listens on.
    fn unreachable_state() -> AppState {
        let config = GraphHopperConfig::new("http://127.0.0.1:9").with_timeout(2);
        let client = GraphHopperClient::new(config).unwrap();
        let router = CachedRouter::new(client, &CacheConfig::default());
        AppState::new(TripTransformer::new(
            StopsStore::default(),
            router,
            EnhancerConfig::default(),
        ))
    }

    #[test]
    fn single_stop_rejected() {
        let err = validate_carpool(&carpool(r#"[{"lat": 48.0, "lon": 9.0}]"#)).unwrap_err();
        assert!(matches!(err, AppError::Unprocessable { .. }));
    }

    #[test]
    fn short_span_rejected() {
        // ~744 m apart
        let short = carpool(r#"[{"lat": 48.0, "lon": 9.0}, {"lat": 48.0, "lon": 9.01}]"#);
        let err = validate_carpool(&short).unwrap_err();
        match err {
            AppError::Unprocessable { message } => assert!(message.contains("mfdz:1")),
            other => panic!("expected Unprocessable, got {other:?}"),
        }
    }

    #[test]
    fn long_span_accepted() {
        let long = carpool(r#"[{"lat": 48.0, "lon": 9.0}, {"lat": 48.0, "lon": 9.2}]"#);
        assert!(validate_carpool(&long).is_ok());
    }

    #[test]
    fn enhance_errors_map_to_status() {
        let cases = [
            (EnhanceError::from(RoutingError::NoPath), StatusCode::FAILED_DEPENDENCY),
            (
                EnhanceError::from(RoutingError::DegeneratePath),
                StatusCode::FAILED_DEPENDENCY,
            ),
            (
                EnhanceError::InsufficientStops { count: 1 },
                StatusCode::FAILED_DEPENDENCY,
            ),
            (
                EnhanceError::from(StopsError::Json {
                    message: "bad".to_string(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn short_carpool_rejected_before_routing() {
        let short = carpool(r#"[{"lat": 48.0, "lon": 9.0}, {"lat": 48.0, "lon": 9.001}]"#);
        let err = enhance_carpool(State(unreachable_state()), Json(short))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unprocessable { .. }));
    }

    #[tokio::test]
    async fn router_outage_is_failed_dependency() {
        let long = carpool(r#"[{"lat": 48.0, "lon": 9.0}, {"lat": 48.0, "lon": 9.2}]"#);
        let err = enhance_carpool(State(unreachable_state()), Json(long))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FailedDependency { .. }));
    }
}
