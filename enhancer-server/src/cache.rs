//! Caching layer for routed paths.
//!
//! Carpool offers are re-submitted unchanged whenever a provider refreshes
//! its feed, so the same stop sequence gets routed over and over. Routes are
//! cached by their request coordinates, quantized to micro-degrees (about
//! 0.1 m) so that float noise in re-serialized offers still hits the cache.

use std::sync::Arc;
use std::time::Duration;

use geo::Coord;
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::enhance::PathProvider;
use crate::routing::{GraphHopperClient, RoutedPath, RoutingError};

/// Cache key for routes: the quantized request coordinates, in order.
type RouteKey = Vec<(i64, i64)>;

/// Cached route entry.
type RouteEntry = Arc<RoutedPath>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

fn quantize(points: &[Coord<f64>]) -> RouteKey {
    points
        .iter()
        .map(|c| {
            (
                (c.x * 1_000_000.0).round() as i64,
                (c.y * 1_000_000.0).round() as i64,
            )
        })
        .collect()
}

/// Router with caching.
///
/// Wraps a path provider (the GraphHopper client in production) and caches
/// its successful responses. Failures are never cached.
pub struct CachedRouter<P = GraphHopperClient> {
    inner: P,
    routes: MokaCache<RouteKey, RouteEntry>,
}

impl<P> CachedRouter<P> {
    /// Create a new cached router.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, routes }
    }
}

impl<P: PathProvider + Sync> PathProvider for CachedRouter<P> {
    async fn path_for_points(&self, points: &[Coord<f64>]) -> Result<RoutedPath, RoutingError> {
        let key = quantize(points);

        if let Some(cached) = self.routes.get(&key).await {
            debug!(points = points.len(), "route cache hit");
            return Ok(RoutedPath::clone(&cached));
        }

        debug!(
            points = points.len(),
            cached = self.routes.entry_count(),
            "route cache miss"
        );
        let path = self.inner.path_for_points(points).await?;
        self.routes.insert(key, Arc::new(path.clone())).await;

        Ok(path)
    }
}
