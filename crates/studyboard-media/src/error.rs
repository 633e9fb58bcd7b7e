//! Error type shared by the media clients.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    /// A required environment variable is not set.
    #[error("missing configuration: env var {var} not set")]
    MissingConfig { var: String },

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    #[error("response error: status {status}")]
    Status { status: u16, body: String },

    #[error("response parse failed: {0}")]
    Parse(String),

    /// The embed response carried no player URL.
    #[error("no player URL in embed response")]
    NoPlayer,

    #[error("no search result at index {0}")]
    NoSuchResult(usize),
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;
