use thiserror::Error;

/// Errors produced while talking to the external language model.
///
/// Every component that calls a model absorbs these at its own boundary:
/// the email suggester turns them into the `UNKNOWN` sentinel, the extractor
/// into an absent candidate, and the responder into a user-visible message.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed at the serde level.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 429, 500, 503).
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The provider answered but produced no text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The model's text could not be parsed into the expected shape.
    #[error("could not parse model output: {0}")]
    Parse(String),

    /// Invalid configuration detected at build time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
