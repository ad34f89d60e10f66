//! Error types for the HTTP request parser.

use thiserror::Error;

/// Errors that can occur while parsing an HTTP request from a byte stream.
///
/// Every variant is a parse failure: the connection layer maps all of them to
/// the same `400 Bad Request` response and never hands them to a handler.
#[derive(Debug, Error)]
pub enum Error {
    /// The request line did not split into exactly method, path and protocol.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The method token is not one of GET, POST, PUT or DELETE.
    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// The protocol token is not of the form `HTTP/<major>.<minor>`.
    #[error("Malformed protocol: {0}")]
    MalformedProtocol(String),

    /// A header line has no colon separating name and value.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// The `Content-Length` value is not a non-negative integer.
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// The stream ended before the request head was complete.
    #[error("Unexpected end of stream while reading request head")]
    UnexpectedEof,

    /// Reading from the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a JSON body.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
