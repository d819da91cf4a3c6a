//! Error handling and custom error types
//!
//! Startup problems are [`ConfigError`]s, remote-call problems are
//! [`RequestError`]s and upload problems are [`ValidationError`]s. Only the
//! first kind is ever fatal.

use std::time::Duration;
use thiserror::Error;

/// Invalid or absent configuration. Blocks client construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing credential")]
    MissingCredential,

    #[error("invalid generation parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid setting {name}={value}: {reason}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("model id must not be empty")]
    EmptyModelId,

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Failure of a single analysis call. Never escapes the inference client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("content blocked by safety policy ({0})")]
    SafetyBlocked(String),

    #[error("service returned no text")]
    EmptyResponse,
}

impl RequestError {
    pub fn is_safety_block(&self) -> bool {
        matches!(self, RequestError::SafetyBlocked(_))
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RequestError::Malformed(err.to_string())
        } else {
            RequestError::Transport(err.to_string())
        }
    }
}

/// Problems with an upload or with a trigger that has nothing to analyze.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please upload an image to proceed.")]
    MissingImage,

    #[error("The uploaded file is empty.")]
    EmptyFile,

    #[error("The uploaded file is {size} bytes; the limit is {limit} bytes.")]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported file type '{0}'. Please upload a JPEG or PNG image.")]
    UnsupportedType(String),

    #[error("The uploaded file does not look like a {declared} image.")]
    ContentMismatch { declared: &'static str },

    #[error("The uploaded image could not be read: {0}")]
    Unreadable(String),

    #[error("The upload could not be processed: {0}")]
    MalformedForm(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
