//! Stop store error types.

/// Errors that can occur while loading or querying stops.
#[derive(Debug, thiserror::Error)]
pub enum StopsError {
    /// Reading a local stop source failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Fetching a remote stop source failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote source answered with an error status
    #[error("stop source {url} returned {status}")]
    Status { url: String, status: u16 },

    /// A stop source is not valid CSV
    #[error("invalid CSV in {source_name}: {message}")]
    Csv {
        source_name: String,
        message: String,
    },

    /// The stop source list or a GeoJSON source is not valid JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
