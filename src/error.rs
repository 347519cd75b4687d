use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the catalog client, the favorites store and config loading.
#[derive(Debug, Error)]
pub enum Error {
    /// No response was obtained (connectivity, DNS, timeout).
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A response was obtained but its status was not a success.
    #[error("catalog unavailable: {url} -> {status}")]
    CatalogUnavailable { url: String, status: StatusCode },

    #[error("movie {movie_id} not found in catalog")]
    NotFound { movie_id: i32 },

    /// A success response whose body could not be used.
    #[error("invalid catalog response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// The persisted favorites blob does not parse or holds invalid records.
    #[error("favorites state is corrupt: {0}")]
    CorruptState(#[source] serde_json::Error),

    /// A caller-built movie that cannot be stored as a favorite.
    #[error("movie {movie_id} is not valid: {reason}")]
    InvalidMovie { movie_id: i32, reason: String },

    #[error("failed to encode favorites: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("storage error at {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
