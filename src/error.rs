//! Error types for Workbrew API operations.

use thiserror::Error;

use crate::response::ResponseMeta;

/// Errors that can occur during Workbrew API operations.
#[derive(Debug, Error)]
pub enum BrewError {
    /// Configuration is missing or incomplete.
    #[error("Workbrew configuration required: {0}")]
    ConfigMissing(String),

    /// Request path would resolve outside the configured workspace.
    #[error("Invalid path '{0}': expected a path relative to the workspace")]
    InvalidPath(String),

    /// A temporal field held neither a known status word nor an RFC3339 timestamp.
    #[error("Malformed temporal value '{0}': expected an RFC3339 timestamp or a status word")]
    MalformedTemporalValue(String),

    /// API request failed with a non-success status.
    #[error("Workbrew API error ({status_code}): {message}")]
    Api {
        message: String,
        status_code: u16,
        response: Box<ResponseMeta>,
    },

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        retry_after_secs: Option<u64>,
        response: Box<ResponseMeta>,
    },

    /// The response body could not be decoded into the requested type.
    #[error("Failed to decode response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        response: Box<ResponseMeta>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON encoding or parsing error outside of a response decode.
    #[error("JSON error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl BrewError {
    /// Response metadata attached to the error, if the server answered at all.
    pub fn response(&self) -> Option<&ResponseMeta> {
        match self {
            Self::Api { response, .. }
            | Self::RateLimited { response, .. }
            | Self::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// HTTP status code of the failed response, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status.as_u16())
    }
}

/// Result type alias for Workbrew operations.
pub type Result<T> = core::result::Result<T, BrewError>;
