//! Error types for the analysis workflow.
//!
//! A [`ValidationError`] stops a submission before any network call, a [`RequestFailure`] is the
//! terminal state of a submission that reached the service.

use thiserror::Error;

/// Local, pre-submission rejection of the form values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Polygon text is not a non-empty JSON array of `[lon, lat]` number pairs.
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(String),

    /// Latitude or longitude is not a finite number.
    #[error("Invalid coordinate for '{field}': {value:?}")]
    InvalidCoordinate { field: &'static str, value: String },

    /// Field size is not a positive integer.
    #[error("Invalid field size: {value:?} (expected a positive integer of meters)")]
    InvalidSize { value: String },

    /// A required date field is empty.
    #[error("Missing date: '{field}' is required")]
    MissingDate { field: &'static str },

    /// A date field is present but not an ISO `YYYY-MM-DD` date.
    #[error("Invalid date for '{field}': {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
}

/// Transport or service failure of a single submission.
///
/// The message carried here is an opaque diagnostic meant for logs,
/// not for the end user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestFailure {
    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Analysis service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be parsed as an analysis response.
    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    /// The `image` field is not valid base64.
    #[error("Invalid image payload: {0}")]
    InvalidImage(String),
}

impl From<reqwest::Error> for RequestFailure {
    fn from(err: reqwest::Error) -> Self {
        RequestFailure::Transport(err.to_string())
    }
}

/// Errors raised while loading [`crate::config::AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid service URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
