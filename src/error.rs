use thiserror::Error;

/// Result type for discovery operations
pub type Result<T> = std::result::Result<T, DiscoverError>;

/// Errors that can occur while discovering devices
#[derive(Error, Debug)]
pub enum DiscoverError {
    /// The discovery target could not be parsed as an IP address
    #[error("Malformed discovery address: {0}")]
    InvalidTarget(String),

    /// A descriptor fetch did not finish in time
    #[error("Request timeout")]
    Timeout,

    /// A fetch was requested without a host or resource path
    #[error("Empty fetch request: {0}")]
    EmptyRequest(&'static str),

    /// A required element is missing from a descriptor document
    #[error("Missing descriptor element: {0}")]
    MissingElement(&'static str),

    /// The presentation URL is empty once normalized
    #[error("Invalid presentation URL: {0:?}")]
    InvalidPresentationUrl(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
