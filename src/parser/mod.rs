//! HTTP parser module.
//!
//! Turns a raw byte stream into an [`HttpRequest`]. The parser reads only the
//! request head eagerly; the body is left on the stream for the handler.

mod body;
mod request;
mod method;
mod version;
mod error;

// Re-export public items
pub use body::Body;
pub use request::HttpRequest;
pub use method::Method;
pub use version::{parse_protocol, HttpVersion};
pub use error::Error;

// Re-export the parse_request function
pub use request::parse_request;
