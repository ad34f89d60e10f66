//! Demo server: serves a greeting, an echo endpoint and a health check.

use std::path::PathBuf;

use clap::Parser;
use log::info;
use serde::Serialize;
use stupidhttp::{HttpResponse, HttpServer, ServerConfig, ServerError, StatusCode};

/// Command-line configuration for the demo server.
#[derive(Debug, Parser)]
#[command(name = "stupidhttp")]
#[command(about = "A minimal HTTP/1.1 server on raw stream sockets")]
#[command(version)]
struct Cli {
    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1:8080", env = "STUPIDHTTP_ADDR")]
    addr: String,

    /// PEM certificate chain; enables TLS together with --key
    #[arg(long, env = "STUPIDHTTP_CERT")]
    cert: Option<PathBuf>,

    /// PEM private key; enables TLS together with --cert
    #[arg(long, env = "STUPIDHTTP_KEY")]
    key: Option<PathBuf>,

    /// Maximum request head size in bytes
    #[arg(long, default_value = "8192", env = "STUPIDHTTP_MAX_HEADER_SIZE")]
    max_header_size: usize,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        ServerConfig {
            addr: cli.addr,
            cert_path: cli.cert,
            key_path: cli.key,
            max_header_size: cli.max_header_size,
        }
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    env_logger::init();

    let config = ServerConfig::from(Cli::parse());
    let mut server = HttpServer::new(config)?;

    server.add_handler("/", |_req| async {
        HttpResponse::new(StatusCode::Ok)
            .with_content_type("text/plain")
            .with_body_string("Hello, world!")
    });

    server.add_handler("/echo", |mut req| async move {
        match req.body.read_all().await {
            Ok(body) => HttpResponse::new(StatusCode::Ok)
                .with_content_type(req.header("Content-Type").unwrap_or("text/plain").to_string())
                .with_body_bytes(body),
            Err(e) => HttpResponse::new(StatusCode::BadRequest)
                .with_content_type("text/plain")
                .with_body_string(format!("Could not read body: {e}")),
        }
    });

    server.add_handler("/health", |_req| async {
        let health = Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        };
        HttpResponse::new(StatusCode::Ok)
            .with_json(&health)
            .unwrap_or_else(|_| HttpResponse::new(StatusCode::InternalServerError))
    });

    info!("Starting stupidhttp");
    server.start().await
}
