//! A minimal HTTP/1.1 server built directly on stream sockets.
//!
//! The crate parses requests by hand from a TCP (or TLS) byte stream,
//! dispatches them to handlers by exact path, and writes the handler's
//! response back. Every connection carries exactly one request.
//!
//! # Features
//!
//! - Request parsing from any `AsyncRead`, with lazily-read bodies framed by `Content-Length`
//! - GET, POST, PUT and DELETE requests with any `HTTP/<major>.<minor>` version token
//! - Exact-path routing with fixed `404 Not Found` and `400 Bad Request` responses
//! - Optional TLS termination from a PEM certificate and key
//! - JSON request and response bodies
//!
//! # Examples
//!
//! ## Parsing a request
//!
//! ```
//! use std::io::Cursor;
//! use stupidhttp::{parse_request, Method};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bytes = b"POST /echo HTTP/1.1\r\nHost: example.com\r\nContent-Length: 5\r\n\r\nhello";
//! let mut request = parse_request(Cursor::new(bytes.to_vec())).await.unwrap();
//!
//! assert_eq!(request.method, Method::POST);
//! assert_eq!(request.path, "/echo");
//! assert_eq!(request.body.read_string().await.unwrap(), "hello");
//! # }
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use stupidhttp::{HttpResponse, HttpServer, ServerConfig, StatusCode};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), stupidhttp::ServerError> {
//! let mut server = HttpServer::new(ServerConfig::new("127.0.0.1:8080"))?;
//!
//! server.add_handler("/hello", |_req| async {
//!     HttpResponse::new(StatusCode::Ok)
//!         .with_content_type("text/plain")
//!         .with_body_string("Hello, world!")
//! });
//!
//! server.start().await
//! # }
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{parse_protocol, parse_request, Body, Error as ParserError, HttpRequest, HttpVersion, Method};
pub use server::{
    handle_connection, write_response, BoundServer, Error as ServerError, HttpResponse, HttpServer, Router,
    ServerConfig, StatusCode,
};
