//! HTTP server implementation for stupidhttp.
//!
//! Accepts TCP or TLS connections, runs each one through the request parser,
//! dispatches by exact path and writes exactly one response back.

mod response;
mod config;
mod connection;
mod error;
mod router;
mod http_server;
mod tls;
mod tests;

// Re-export public items
pub use response::{write_response, HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use connection::handle_connection;
pub use error::Error;
pub use router::{HandlerFn, HandlerFuture, Router};
pub use http_server::{BoundServer, HttpServer};
pub use tls::load_tls_acceptor;
