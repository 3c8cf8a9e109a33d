//! GraphHopper routing HTTP client.

use geo::Coord;

use crate::enhance::PathProvider;

use super::error::RoutingError;
use super::types::{ErrorResponse, RouteRequest, RouteResponse, RoutedPath};

/// Default base URL of a self-hosted GraphHopper instance.
const DEFAULT_BASE_URL: &str = "http://localhost:8989";

/// Default routing profile.
const DEFAULT_PROFILE: &str = "car";

/// Configuration for the routing client.
#[derive(Debug, Clone)]
pub struct GraphHopperConfig {
    /// Base URL of the GraphHopper server
    pub base_url: String,
    /// API key, sent as `key` query parameter when set
    pub api_key: Option<String>,
    /// Vehicle profile to route with
    pub profile: String,
    /// Locale for instruction texts
    pub locale: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GraphHopperConfig {
    /// Create a new config for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            profile: DEFAULT_PROFILE.to_string(),
            locale: "de".to_string(),
            timeout_secs: 30,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the routing profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for GraphHopperConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// GraphHopper routing client.
#[derive(Debug, Clone)]
pub struct GraphHopperClient {
    http: reqwest::Client,
    config: GraphHopperConfig,
}

impl GraphHopperClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GraphHopperConfig) -> Result<Self, RoutingError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    /// Route through `points` in order.
    ///
    /// Returns the first (best) path with its geometry and turn-by-turn
    /// instructions.
    pub async fn route(&self, points: &[Coord<f64>]) -> Result<RoutedPath, RoutingError> {
        let url = format!("{}/route", self.config.base_url.trim_end_matches('/'));

        let body = RouteRequest {
            points: points.iter().map(|c| [c.x, c.y]).collect(),
            profile: &self.config.profile,
            instructions: true,
            points_encoded: false,
            calc_points: true,
            locale: &self.config.locale,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // GraphHopper explains unroutable requests in `message`
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(RoutingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: RouteResponse =
            serde_json::from_str(&body).map_err(|e| RoutingError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        response
            .paths
            .into_iter()
            .next()
            .map(RoutedPath::from)
            .ok_or(RoutingError::NoPath)
    }
}

impl PathProvider for GraphHopperClient {
    async fn path_for_points(&self, points: &[Coord<f64>]) -> Result<RoutedPath, RoutingError> {
        self.route(points).await
    }
}
