//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::Error as ParserError;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    Parse(#[from] ParserError),

    /// I/O error on a listener or connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TLS certificate or private key could not be loaded.
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
