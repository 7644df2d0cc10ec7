//! Error types for shiftlog-client.
//!
//! [`Error`] covers library-level failures (configuration, client
//! construction, telemetry setup). Request outcomes never use it; they
//! surface as [`crate::model::ErrorEnvelope`] inside an
//! [`crate::model::Outcome`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
