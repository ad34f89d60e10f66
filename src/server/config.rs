//! Server configuration.

use std::path::PathBuf;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to, e.g. `127.0.0.1:8080`.
    pub addr: String,
    /// PEM certificate chain. TLS is enabled only when `key_path` is set too.
    pub cert_path: Option<PathBuf>,
    /// PEM private key. TLS is enabled only when `cert_path` is set too.
    pub key_path: Option<PathBuf>,
    /// The maximum request head size. Reported at startup; the parser does not enforce it.
    pub max_header_size: usize,
}

impl ServerConfig {
    /// A cleartext configuration bound to `addr`.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    /// Enable TLS with the given certificate chain and private key files.
    pub fn with_tls(mut self, cert_path: impl Into<PathBuf>, key_path: impl Into<PathBuf>) -> Self {
        self.cert_path = Some(cert_path.into());
        self.key_path = Some(key_path.into());
        self
    }

    /// Both TLS paths, if both are set.
    pub fn tls_paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
            cert_path: None,
            key_path: None,
            max_header_size: 8192,
        }
    }
}
