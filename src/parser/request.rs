//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};

use crate::parser::body::Body;
use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::{parse_protocol, HttpVersion};

const CONTENT_LENGTH: &str = "Content-Length";

/// Represents an HTTP request.
#[derive(Debug)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path, exactly as it appeared on the request line
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers, names kept as received; the last duplicate wins
    pub headers: HashMap<String, String>,
    /// The request body
    pub body: Body,
}

impl HttpRequest {
    /// Create a new HTTP request.
    ///
    /// Mostly useful for calling handlers directly in tests; the server builds
    /// requests through [`parse_request`].
    pub fn new(
        method: Method,
        path: impl Into<String>,
        version: HttpVersion,
        headers: HashMap<String, String>,
        body: Body,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            version,
            headers,
            body,
        }
    }

    /// Get a header value, ignoring ASCII case in the name.
    ///
    /// The map itself is case-sensitive. If it holds several spellings of the
    /// same name, any one of them may be returned.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header exists, ignoring ASCII case in the name.
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// The declared body length, if the request carried `Content-Length`.
    pub fn content_length(&self) -> Option<u64> {
        self.body.content_length()
    }

    /// Read the remaining body and parse it as JSON.
    pub async fn json<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        let bytes = self.body.read_all().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Read one `\n`-terminated line and trim surrounding whitespace.
async fn read_line<R>(reader: &mut R) -> Result<String, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 || !line.ends_with('\n') {
        return Err(Error::UnexpectedEof);
    }
    Ok(line.trim().to_string())
}

/// Parse an HTTP request head from a byte stream.
///
/// Consumes the request line and headers. The rest of the stream becomes the
/// request body and is read lazily by whoever holds the request: limited to
/// `Content-Length` bytes when that header is present, unbounded otherwise.
///
/// # Errors
///
/// Returns the first syntax error encountered. No partial request is produced.
pub async fn parse_request<R>(reader: R) -> Result<HttpRequest, Error>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut reader = BufReader::new(reader);

    // Request line: METHOD PATH PROTOCOL
    let request_line = read_line(&mut reader).await?;
    let parts: Vec<&str> = request_line.split(' ').collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.clone()));
    }

    let method = Method::from_str(parts[0])?;
    let path = parts[1].to_string();
    let version = parse_protocol(parts[2])?;

    // Headers run until the first empty line
    let mut headers = HashMap::new();
    let mut content_length = None;
    loop {
        let line = read_line(&mut reader).await?;
        if line.is_empty() {
            break;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::MalformedHeader(line.clone()))?;
        let name = name.trim();
        let value = value.trim();

        if name.eq_ignore_ascii_case(CONTENT_LENGTH) {
            content_length = Some(value.to_string());
        }
        headers.insert(name.to_string(), value.to_string());
    }

    let body = match content_length {
        Some(value) => {
            let length = value
                .parse::<u64>()
                .map_err(|_| Error::InvalidContentLength(value.clone()))?;
            Body::limited(reader, length)
        }
        None => Body::from_reader(reader),
    };

    Ok(HttpRequest {
        method,
        path,
        version,
        headers,
        body,
    })
}
