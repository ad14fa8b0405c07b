//! Error types for fetching, decoding and rendering activity routes.

use thiserror::Error;

/// Failure while decoding or encoding a polyline string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolylineError {
    #[error("invalid character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("polyline ends in the middle of a value at byte {position}")]
    Truncated { position: usize },

    #[error("latitude at byte {position} has no matching longitude")]
    MissingLongitude { position: usize },

    #[error("value starting at byte {position} overflows")]
    Overflow { position: usize },

    #[error("decoded coordinate ({latitude}, {longitude}) is out of range")]
    OutOfRange { latitude: f64, longitude: f64 },

    #[error("precision {0} is not supported (max 10 digits)")]
    UnsupportedPrecision(u32),

    #[error("cannot encode invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

/// Unified error for the crate.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[cfg(feature = "http")]
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("rate limited by {url}")]
    RateLimited { url: String },

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Polyline(#[from] PolylineError),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
