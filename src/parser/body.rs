//! Lazily-read message bodies.

use std::fmt;
use std::io::{self, Cursor};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

/// A message body read lazily from an underlying byte stream.
///
/// For requests this is a view over the connection. When the request declared
/// a `Content-Length`, the view ends after exactly that many bytes; otherwise
/// it runs until the peer closes its side of the connection.
pub struct Body {
    inner: Pin<Box<dyn AsyncRead + Send>>,
    length: Option<u64>,
}

impl Body {
    /// Wrap an arbitrary reader. The body has no declared length.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            inner: Box::pin(reader),
            length: None,
        }
    }

    /// Wrap a reader and stop after `length` bytes.
    pub fn limited<R>(reader: R, length: u64) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            inner: Box::pin(reader.take(length)),
            length: Some(length),
        }
    }

    /// A body backed by an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let length = bytes.len() as u64;
        Self {
            inner: Box::pin(Cursor::new(bytes)),
            length: Some(length),
        }
    }

    pub fn empty() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// The declared length, if the body is length-delimited.
    pub fn content_length(&self) -> Option<u64> {
        self.length
    }

    /// Read the remaining body into memory.
    pub async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        AsyncReadExt::read_to_end(self, &mut buf).await?;
        Ok(buf)
    }

    /// Read the remaining body as UTF-8 text.
    pub async fn read_string(&mut self) -> io::Result<String> {
        let mut buf = String::new();
        AsyncReadExt::read_to_string(self, &mut buf).await?;
        Ok(buf)
    }
}

impl AsyncRead for Body {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::from_bytes(text.into_bytes())
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::from_bytes(text.as_bytes())
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
