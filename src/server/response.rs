//! HTTP response types and serialization.

use std::collections::HashMap;

use log::debug;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::parser::{Body, HttpVersion};
use crate::server::error::Error;

/// HTTP status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    Accepted = 202,
    NoContent = 204,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    PayloadTooLarge = 413,
    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Get the numeric status code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::BadGateway => "Bad Gateway",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

/// Represents an HTTP response.
///
/// The body is a stream; it is consumed when the response is written, so a
/// response value can be sent only once.
#[derive(Debug)]
pub struct HttpResponse {
    /// The numeric status code
    pub status_code: u16,
    /// The reason phrase written after the status code
    pub status_text: String,
    /// The protocol version written on the status line
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The response body, if any
    pub body: Option<Body>,
}

impl HttpResponse {
    /// Create a new HTTP/1.1 response with the given status code and no body.
    pub fn new(status: StatusCode) -> Self {
        Self::with_status(status.as_u16(), status.reason_phrase())
    }

    /// Create a response with an arbitrary status code and reason phrase.
    pub fn with_status(status_code: u16, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            version: HttpVersion::HTTP_11,
            headers: HashMap::new(),
            body: None,
        }
    }

    /// The fixed `404 Not Found` response sent when no route matches.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
            .with_content_type("text/plain")
            .with_body_string("Not Found")
    }

    /// The fixed `400 Bad Request` response sent when a request fails to parse.
    pub fn bad_request() -> Self {
        Self::new(StatusCode::BadRequest)
            .with_content_type("text/plain")
            .with_body_string("Bad Request")
    }

    /// Set the protocol version written on the status line.
    pub fn with_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the response body with a string.
    pub fn with_body_string(self, body: impl Into<String>) -> Self {
        self.with_body_bytes(body.into().into_bytes())
    }

    /// Set the response body with bytes.
    pub fn with_body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let content_length = body.len().to_string();
        self.body = Some(Body::from_bytes(body));
        self.with_header("Content-Length", content_length)
    }

    /// Stream the body from a reader.
    ///
    /// No `Content-Length` is added; the client sees the end of the body when
    /// the connection closes.
    pub fn with_body_reader<R>(mut self, reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        self.body = Some(Body::from_reader(reader));
        self
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Set the response body with a JSON value.
    ///
    /// This method serializes the provided value to JSON and sets it as the response body.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(value)?;
        Ok(self
            .with_content_type("application/json")
            .with_body_bytes(json))
    }

    /// Render the status line and headers, including the blank line that ends them.
    ///
    /// Headers are emitted sorted by name so the output is stable.
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "{} {} {}\r\n",
            self.version, self.status_code, self.status_text
        );

        let mut headers: Vec<(&String, &String)> = self.headers.iter().collect();
        headers.sort();
        for (name, value) in headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }

        head.push_str("\r\n");
        head.into_bytes()
    }
}

/// Write a response onto a byte sink.
///
/// Writes the head, then copies the body verbatim until it is exhausted, then
/// flushes. The first write failure aborts; bytes already sent stay sent.
pub async fn write_response<W>(writer: &mut W, response: HttpResponse) -> Result<(), Error>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&response.head_bytes()).await?;

    if let Some(mut body) = response.body {
        let copied = tokio::io::copy(&mut body, &mut *writer).await?;
        debug!("Wrote {copied} body bytes");
    }

    writer.flush().await?;
    Ok(())
}
