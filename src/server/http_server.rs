//! HTTP server implementation.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::task::{JoinError, JoinSet};
use tokio_rustls::TlsAcceptor;

use crate::parser::HttpRequest;
use crate::server::config::ServerConfig;
use crate::server::connection::handle_connection;
use crate::server::error::Error;
use crate::server::router::Router;
use crate::server::response::HttpResponse;
use crate::server::tls::load_tls_acceptor;

/// An HTTP server.
///
/// Handlers are registered on the server before it is bound. Binding moves the
/// route table behind an `Arc`, after which it is read-only.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    routes: Router,
    tls: Option<TlsAcceptor>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// When both a certificate and a key path are configured, they are loaded
    /// here and a bad pair fails construction.
    pub fn new(config: ServerConfig) -> Result<Self, Error> {
        let tls = match config.tls_paths() {
            Some((cert, key)) => Some(load_tls_acceptor(cert, key)?),
            None => {
                if config.cert_path.is_some() || config.key_path.is_some() {
                    warn!("TLS needs both a certificate and a key, serving cleartext");
                }
                None
            }
        };

        Ok(Self {
            config,
            routes: Router::new(),
            tls,
        })
    }

    /// Register a handler for an exact path. A later registration for the same path wins.
    pub fn add_handler<F, Fut>(&mut self, path: impl Into<String>, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResponse> + Send + 'static,
    {
        self.routes.add_handler(path, handler);
    }

    /// The registered routes.
    pub fn routes(&self) -> &Router {
        &self.routes
    }

    pub fn is_tls(&self) -> bool {
        self.tls.is_some()
    }

    /// Bind the listening socket without accepting yet.
    pub async fn bind(self) -> Result<BoundServer, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        let server = BoundServer {
            listener,
            routes: Arc::new(self.routes),
            tls: self.tls,
        };
        server.display_server_info(self.config.max_header_size)?;
        Ok(server)
    }

    /// Bind and serve until Ctrl+C.
    pub async fn start(self) -> Result<(), Error> {
        self.bind().await?.run().await
    }
}

/// A server whose socket is bound and whose routes are frozen.
pub struct BoundServer {
    listener: TcpListener,
    routes: Arc<Router>,
    tls: Option<TlsAcceptor>,
}

impl BoundServer {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Display the listening address and registered endpoints.
    fn display_server_info(&self, max_header_size: usize) -> Result<(), Error> {
        let scheme = if self.tls.is_some() { "https" } else { "http" };
        info!("Server listening on {scheme}://{addr}", addr = self.local_addr()?);
        info!("Max header size: {max_header_size} bytes (not enforced)");

        info!("Registered endpoints:");
        for path in self.routes.paths() {
            info!("  {path}");
        }
        Ok(())
    }

    /// Serve connections until Ctrl+C is received.
    pub async fn run(self) -> Result<(), Error> {
        self.run_until(async {
            match signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    }

    /// Serve connections until `shutdown` resolves, then wait for in-flight ones.
    ///
    /// Every accepted connection gets its own task. Accept errors are logged and
    /// the loop accepts again right away.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => self.spawn_connection(socket, addr, &mut tasks),
                        Err(e) => error!("Error accepting connection: {e}"),
                    }
                }
            }

            while let Some(res) = tasks.try_join_next() {
                log_task_result(res);
            }
        }

        Self::perform_shutdown(&mut tasks).await;
        Ok(())
    }

    fn spawn_connection(&self, socket: TcpStream, addr: SocketAddr, tasks: &mut JoinSet<()>) {
        let routes = self.routes.clone();

        match &self.tls {
            Some(acceptor) => {
                let acceptor = acceptor.clone();
                tasks.spawn(async move {
                    match acceptor.accept(socket).await {
                        Ok(stream) => serve(stream, addr, routes).await,
                        Err(e) => warn!("TLS handshake with {addr} failed: {e}"),
                    }
                });
            }
            None => {
                tasks.spawn(serve(socket, addr, routes));
            }
        }
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        // Wait for all tasks to complete (with timeout)
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let drained = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                log_task_result(res);
            }
        })
        .await;

        if drained.is_err() {
            warn!("Shutdown timed out, aborting {len} connections", len = tasks.len());
            tasks.abort_all();
        }
        info!("Server shutdown complete");
    }
}

async fn serve<S>(stream: S, addr: SocketAddr, routes: Arc<Router>)
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    if let Err(e) = handle_connection(stream, routes).await {
        error!("Error handling connection from {addr}: {e}");
    }
}

fn log_task_result(res: Result<(), JoinError>) {
    if let Err(e) = res {
        error!("Connection task failed: {e}");
    }
}
