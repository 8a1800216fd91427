//! Error types for zmanim-feed.

use thiserror::Error;

/// Errors that can occur while building a feed.
#[derive(Error, Debug)]
pub enum ZmanimError {
    #[error("Missing location parameters. Provide zip OR lat/lng.")]
    MissingLocation,

    #[error("Invalid zip code")]
    InvalidZip(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Calendar computation failed: {0}")]
    Computation(String),

    #[error("Postal code data error: {0}")]
    PostalData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZmanimError {
    /// Whether the error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ZmanimError::MissingLocation
                | ZmanimError::InvalidZip(_)
                | ZmanimError::InvalidCoordinates(_)
                | ZmanimError::InvalidTimezone(_)
                | ZmanimError::InvalidParameter { .. }
        )
    }
}

/// Result type alias for zmanim operations.
pub type ZmanimResult<T> = Result<T, ZmanimError>;
