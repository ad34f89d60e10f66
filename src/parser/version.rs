//! HTTP protocol version token.

use std::fmt;
use std::str::FromStr;

use crate::parser::error::Error;

/// A protocol version as carried in `HTTP/<major>.<minor>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpVersion {
    pub major: u64,
    pub minor: u64,
}

impl HttpVersion {
    pub const HTTP_10: HttpVersion = HttpVersion { major: 1, minor: 0 };
    pub const HTTP_11: HttpVersion = HttpVersion { major: 1, minor: 1 };

    pub fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_11
    }
}

/// Parse and validate a protocol token such as `HTTP/1.1`.
///
/// The token must start with `HTTP/` and the remainder must be exactly two
/// dot-separated decimal integers.
pub fn parse_protocol(token: &str) -> Result<HttpVersion, Error> {
    let malformed = || Error::MalformedProtocol(token.to_string());

    let version = token.strip_prefix("HTTP/").ok_or_else(malformed)?;
    let mut parts = version.split('.');
    let (major, minor) = match (parts.next(), parts.next(), parts.next()) {
        (Some(major), Some(minor), None) => (major, minor),
        _ => return Err(malformed()),
    };

    let major = major.parse::<u64>().map_err(|_| malformed())?;
    let minor = minor.parse::<u64>().map_err(|_| malformed())?;
    Ok(HttpVersion { major, minor })
}

impl FromStr for HttpVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_protocol(s)
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}
