//! Error types for the data provider.
//!
//! # Design
//! Transport failures are kept in their own enum and wrapped verbatim by
//! `ProviderError::Transport`, so callers can tell "the request never
//! succeeded" apart from "the server answered with something we cannot
//! decode". Caller input is never validated, so there is no validation
//! variant.

/// Failures raised by a `Transport` implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be completed (DNS, connection, timeout, ...).
    #[error("transport failure: {0}")]
    Io(String),
}

/// Errors returned by `RequestMapper` and `DataProvider` operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response lacks something the operation depends on, such as the
    /// count header of a list response.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

/// Errors raised while assembling a `ProviderConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value {value:?} for {name}")]
    InvalidVar { name: &'static str, value: String },
}
