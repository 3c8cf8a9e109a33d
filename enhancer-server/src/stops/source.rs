//! Loading known stops from stop sources.
//!
//! A source is a local file or an HTTP(S) URL serving either GTFS-style CSV
//! stop rows (`stop_id,stop_name,stop_lat,stop_lon`, further columns
//! ignored) or a GeoJSON FeatureCollection of Point features. Each source
//! declares a vicinity: how far from a route its stops may lie and still be
//! offered along it.

use std::collections::HashSet;
use std::path::Path;

use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::error::StopsError;
use super::store::KnownStop;

/// Columns a CSV stop source must provide.
const REQUIRED_COLUMNS: [&str; 4] = ["stop_id", "stop_name", "stop_lat", "stop_lon"];

/// Encoding of a stop source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    GeoJson,
}

/// Where to load stops from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopSource {
    /// File path or HTTP(S) URL.
    pub url: String,
    /// Corridor half-width for stops of this source (meters).
    pub vicinity: f64,
    /// Encoding; guessed from the URL's extension when absent.
    #[serde(default)]
    pub format: Option<SourceFormat>,
    /// Namespace prepended to every stop id of this source, e.g. `bbnavi:`.
    #[serde(default)]
    pub id_prefix: Option<String>,
}

impl StopSource {
    pub fn new(url: impl Into<String>, vicinity: f64) -> Self {
        Self {
            url: url.into(),
            vicinity,
            format: None,
            id_prefix: None,
        }
    }

    /// Set the id namespace.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    fn is_remote(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }

    /// The declared format, or the one implied by the URL's extension.
    pub fn format(&self) -> SourceFormat {
        if let Some(format) = self.format {
            return format;
        }
        let path = self
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if path.ends_with(".geojson") || path.ends_with(".json") {
            SourceFormat::GeoJson
        } else {
            SourceFormat::Csv
        }
    }
}

#[derive(Debug, Deserialize)]
struct StopRow {
    stop_id: String,
    #[serde(default)]
    stop_name: String,
    stop_lat: f64,
    stop_lon: f64,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point {
        coordinates: Vec<f64>,
    },
    #[serde(other)]
    Other,
}

impl Feature {
    /// `properties.id`, falling back to the feature's own id.
    fn stop_id(&self) -> Option<String> {
        let id = self
            .properties
            .as_ref()
            .and_then(|p| p.get("id"))
            .or(self.id.as_ref())?;
        match id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn name(&self) -> String {
        self.properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// `(lon, lat)` of a Point geometry.
    fn position(&self) -> Option<(f64, f64)> {
        match &self.geometry {
            Some(Geometry::Point { coordinates }) if coordinates.len() >= 2 => {
                Some((coordinates[0], coordinates[1]))
            }
            _ => None,
        }
    }
}

/// Read the list of stop sources from a JSON file.
pub async fn read_stop_sources(path: impl AsRef<Path>) -> Result<Vec<StopSource>, StopsError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StopsError::Io {
            path: path.display().to_string(),
            source,
        })?;

    serde_json::from_str(&json).map_err(|e| StopsError::Json {
        message: e.to_string(),
    })
}

/// Fetch all sources concurrently. A stop id seen in an earlier source wins.
pub async fn load_sources(sources: &[StopSource]) -> Result<Vec<KnownStop>, StopsError> {
    let http = reqwest::Client::new();

    let loaded = try_join_all(sources.iter().map(|source| load_source(&http, source))).await?;

    let mut seen = HashSet::new();
    let stops = loaded
        .into_iter()
        .flatten()
        .filter(|stop| seen.insert(stop.id.clone()))
        .collect();

    Ok(stops)
}

async fn load_source(
    http: &reqwest::Client,
    source: &StopSource,
) -> Result<Vec<KnownStop>, StopsError> {
    let content = if source.is_remote() {
        let response = http.get(&source.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StopsError::Status {
                url: source.url.clone(),
                status: status.as_u16(),
            });
        }
        response.text().await?
    } else {
        tokio::fs::read_to_string(&source.url)
            .await
            .map_err(|e| StopsError::Io {
                path: source.url.clone(),
                source: e,
            })?
    };

    let format = source.format();
    let mut stops = match format {
        SourceFormat::Csv => parse_stops(&source.url, &content, source.vicinity)?,
        SourceFormat::GeoJson => parse_geojson_stops(&source.url, &content, source.vicinity)?,
    };
    if let Some(prefix) = &source.id_prefix {
        for stop in &mut stops {
            stop.id.insert_str(0, prefix);
        }
    }

    info!(source = %source.url, ?format, count = stops.len(), "loaded stops");
    Ok(stops)
}

/// Parse CSV stop rows. Rows that do not parse are skipped with a warning.
pub fn parse_stops(
    source_name: &str,
    content: &str,
    vicinity_m: f64,
) -> Result<Vec<KnownStop>, StopsError> {
    let csv_error = |message: String| StopsError::Csv {
        source_name: source_name.to_string(),
        message,
    };

    let mut reader = csv::Reader::from_reader(content.as_bytes());

    let headers = reader.headers().map_err(|e| csv_error(e.to_string()))?;
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(csv_error(format!("missing column `{missing}`")));
    }

    let mut stops = Vec::new();
    let mut skipped = 0;

    for row in reader.deserialize::<StopRow>() {
        match row {
            Ok(row) if !row.stop_id.is_empty() => stops.push(KnownStop {
                id: row.stop_id,
                name: row.stop_name,
                lat: row.stop_lat,
                lon: row.stop_lon,
                vicinity_m,
            }),
            Ok(_) | Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(source = source_name, skipped, "skipped invalid stop rows");
    }

    Ok(stops)
}

/// Parse the Point features of a GeoJSON FeatureCollection.
///
/// Features without an id or without a Point geometry are skipped with a
/// warning.
pub fn parse_geojson_stops(
    source_name: &str,
    content: &str,
    vicinity_m: f64,
) -> Result<Vec<KnownStop>, StopsError> {
    let collection: FeatureCollection =
        serde_json::from_str(content).map_err(|e| StopsError::Json {
            message: format!("{source_name}: {e}"),
        })?;

    let mut stops = Vec::new();
    let mut skipped = 0;

    for feature in &collection.features {
        match (feature.stop_id(), feature.position()) {
            (Some(id), Some((lon, lat))) => stops.push(KnownStop {
                id,
                name: feature.name(),
                lat,
                lon,
                vicinity_m,
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(source = source_name, skipped, "skipped invalid stop features");
    }

    Ok(stops)
}
