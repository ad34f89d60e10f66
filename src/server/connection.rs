//! Per-connection request handling.
//!
//! Each accepted connection runs one pass through the state machine below and
//! is then closed:
//!
//! ```text
//! Parsing ──> Routing ──> Invoking ──> Responding ──> Closed
//!    │           │                        ^
//!    │           └── no route (404) ──────┤
//!    └── parse failure (400) ─────────────┘
//! ```

use std::sync::Arc;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf};

use crate::parser::{parse_request, HttpRequest};
use crate::server::error::Error;
use crate::server::router::{HandlerFn, Router};
use crate::server::response::{write_response, HttpResponse};

enum State<S> {
    Parsing(ReadHalf<S>),
    Routing(HttpRequest),
    Invoking(HttpRequest, HandlerFn),
    Responding(HttpResponse),
    Closed,
}

/// Serve exactly one request on `stream`, then close it.
///
/// Parse failures and unknown paths are answered with the fixed 400 and 404
/// responses and are not reported as errors. The returned error is the I/O
/// failure, if any, that prevented the response from being written.
pub async fn handle_connection<S>(stream: S, routes: Arc<Router>) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut state = State::Parsing(reader);
    let mut outcome = Ok(());

    loop {
        state = match state {
            State::Parsing(reader) => match parse_request(reader).await {
                Ok(request) => State::Routing(request),
                Err(e) => {
                    warn!("Rejecting malformed request: {e}");
                    State::Responding(HttpResponse::bad_request())
                }
            },

            State::Routing(request) => match routes.lookup(&request.path) {
                Some(handler) => State::Invoking(request, handler),
                None => {
                    debug!("No route for {method} {path}", method = request.method, path = request.path);
                    State::Responding(HttpResponse::not_found())
                }
            },

            State::Invoking(request, handler) => {
                let method = request.method;
                let path = request.path.clone();
                // The request and its body are released when the handler returns
                let response = handler(request).await;
                debug!("{method} {path} -> {status}", status = response.status_code);
                State::Responding(response)
            }

            State::Responding(response) => {
                outcome = write_response(&mut writer, response).await;
                if outcome.is_ok() {
                    outcome = writer.shutdown().await.map_err(Error::from);
                }
                State::Closed
            }

            State::Closed => break,
        };
    }

    outcome
}
