//! Tests for the HTTP server implementation.

#[cfg(test)]
mod server_tests {
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};

    use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

    use std::collections::HashMap;

    use crate::parser::{parse_request, Body, HttpRequest, HttpVersion, Method};
    use crate::server::{
        handle_connection, load_tls_acceptor, write_response, Error, HttpResponse, HttpServer, Router,
        ServerConfig, StatusCode,
    };

    // Mock TcpStream for testing; written bytes stay readable after the stream is dropped
    struct MockTcpStream {
        read_data: Cursor<Vec<u8>>,
        write_data: Arc<Mutex<Vec<u8>>>,
    }

    impl MockTcpStream {
        fn new(read_data: &[u8]) -> (Self, Arc<Mutex<Vec<u8>>>) {
            let written = Arc::new(Mutex::new(Vec::new()));
            let stream = Self {
                read_data: Cursor::new(read_data.to_vec()),
                write_data: written.clone(),
            };
            (stream, written)
        }
    }

    impl AsyncRead for MockTcpStream {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            let n = std::io::Read::read(&mut this.read_data, buf.initialize_unfilled())?;
            buf.advance(n);
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncWrite for MockTcpStream {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.write_data.lock().unwrap().extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    // A sink that rejects every write
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    impl AsyncRead for BrokenPipe {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    async fn serve(routes: Router, request: &[u8]) -> (Result<(), Error>, String) {
        let (stream, written) = MockTcpStream::new(request);
        let result = handle_connection(stream, Arc::new(routes)).await;
        let response = String::from_utf8_lossy(&written.lock().unwrap()).into_owned();
        (result, response)
    }

    fn body_of(response: &str) -> &str {
        response.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
    }

    fn echo_router() -> Router {
        let mut routes = Router::new();
        routes.add_handler("/echo", |mut req| async move {
            let body = req.body.read_all().await.unwrap();
            HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/plain")
                .with_body_bytes(body)
        });
        routes
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr, "127.0.0.1:8080");
        assert_eq!(config.max_header_size, 8192);
        assert!(config.tls_paths().is_none());

        let config = ServerConfig::new("0.0.0.0:9000").with_tls("cert.pem", "key.pem");
        assert_eq!(config.addr, "0.0.0.0:9000");
        assert!(config.tls_paths().is_some());
    }

    #[test]
    fn test_server_creation_without_tls() {
        let server = HttpServer::new(ServerConfig::new("127.0.0.1:0")).unwrap();
        assert!(!server.is_tls());
        assert!(server.routes().is_empty());
    }

    #[test]
    fn test_single_tls_path_falls_back_to_cleartext() {
        let mut config = ServerConfig::new("127.0.0.1:0");
        config.cert_path = Some("does-not-matter.pem".into());
        let server = HttpServer::new(config).unwrap();
        assert!(!server.is_tls());
    }

    #[test]
    fn test_missing_tls_files_fail_construction() {
        let config = ServerConfig::new("127.0.0.1:0").with_tls("/nonexistent/cert.pem", "/nonexistent/key.pem");
        let result = HttpServer::new(config);
        assert!(matches!(result, Err(Error::TlsConfig(_))));
    }

    #[test]
    fn test_pem_without_certificates_is_rejected() {
        let dir = std::env::temp_dir();
        let cert = dir.join(format!("stupidhttp-empty-cert-{}.pem", std::process::id()));
        let key = dir.join(format!("stupidhttp-empty-key-{}.pem", std::process::id()));
        std::fs::write(&cert, "not a certificate\n").unwrap();
        std::fs::write(&key, "not a key either\n").unwrap();

        let result = load_tls_acceptor(&cert, &key);
        assert!(matches!(result, Err(Error::TlsConfig(ref msg)) if msg.contains("no certificates")));

        std::fs::remove_file(cert).unwrap();
        std::fs::remove_file(key).unwrap();
    }

    #[test]
    fn test_key_file_without_private_key_is_rejected() {
        let data = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");
        let cert = std::path::Path::new(data).join("localhost.pem");
        // The CA file holds a certificate and nothing else
        let key = std::path::Path::new(data).join("ca.pem");

        let result = load_tls_acceptor(&cert, &key);
        assert!(matches!(result, Err(Error::TlsConfig(ref msg)) if msg.contains("no private key")));
    }

    #[test]
    fn test_checked_in_key_pair_loads() {
        let data = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");
        let config = ServerConfig::new("127.0.0.1:0").with_tls(
            std::path::Path::new(data).join("localhost.pem"),
            std::path::Path::new(data).join("localhost.key"),
        );
        let server = HttpServer::new(config).unwrap();
        assert!(server.is_tls());
    }

    #[tokio::test]
    async fn test_handler_called_directly() {
        let routes = echo_router();
        let handler = routes.lookup("/echo").unwrap();

        let request = HttpRequest::new(Method::POST, "/echo", HttpVersion::HTTP_11, HashMap::new(), Body::empty());
        assert_eq!(request.content_length(), Some(0));

        let mut response = handler(request).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers.get("Content-Length").unwrap(), "0");
        let body = response.body.as_mut().unwrap().read_all().await.unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_router_registration_overwrites() {
        let mut routes = Router::new();
        routes.add_handler("/a", |_req| async { HttpResponse::new(StatusCode::Ok) });
        routes.add_handler("/b", |_req| async { HttpResponse::new(StatusCode::Ok) });
        routes.add_handler("/a", |_req| async { HttpResponse::new(StatusCode::Created) });

        assert_eq!(routes.len(), 2);
        assert_eq!(routes.paths(), vec!["/a", "/b"]);
        assert!(routes.lookup("/a").is_some());
        assert!(routes.lookup("/c").is_none());
    }

    #[test]
    fn test_router_lookup_is_exact() {
        let mut routes = Router::new();
        routes.add_handler("/test", |_req| async { HttpResponse::new(StatusCode::Ok) });

        assert!(routes.lookup("/test").is_some());
        assert!(routes.lookup("/test/").is_none());
        assert!(routes.lookup("/TEST").is_none());
        assert!(routes.lookup("/test?x=1").is_none());
        assert!(routes.lookup("/%74est").is_none());
    }

    #[tokio::test]
    async fn test_later_registration_is_invoked() {
        let mut routes = Router::new();
        routes.add_handler("/a", |_req| async { HttpResponse::new(StatusCode::Ok) });
        routes.add_handler("/a", |_req| async { HttpResponse::new(StatusCode::Created) });

        let (result, response) = serve(routes, b"GET /a HTTP/1.1\r\n\r\n").await;
        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 201 Created\r\n"));
    }

    #[tokio::test]
    async fn test_handle_connection_with_valid_request() {
        let mut routes = Router::new();
        routes.add_handler("/test", |_req| async {
            HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/plain")
                .with_body_string("Test response")
        });

        let (result, response) = serve(routes, b"GET /test HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert!(response.contains("Content-Length: 13\r\n"));
        assert_eq!(body_of(&response), "Test response");
    }

    #[tokio::test]
    async fn test_handler_invoked_exactly_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let other_hits = Arc::new(AtomicUsize::new(0));

        let mut routes = Router::new();
        let counter = hits.clone();
        routes.add_handler("/test", move |_req| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { HttpResponse::new(StatusCode::Ok) }
        });
        let counter = other_hits.clone();
        routes.add_handler("/other", move |_req| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { HttpResponse::new(StatusCode::Ok) }
        });

        let (result, _) = serve(routes, b"GET /test HTTP/1.1\r\n\r\n").await;
        assert!(result.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(other_hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handle_connection_with_not_found() {
        let mut routes = Router::new();
        routes.add_handler("/test", |_req| async { HttpResponse::new(StatusCode::Ok) });

        let (result, response) = serve(routes, b"GET /nonexistent HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

        // A missing route is answered, not reported as an error
        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(response.contains("Content-Type: text/plain\r\n"));
        assert_eq!(body_of(&response), "Not Found");
    }

    #[tokio::test]
    async fn test_short_request_line_is_bad_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut routes = Router::new();
        let counter = hits.clone();
        routes.add_handler("/test", move |_req| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { HttpResponse::new(StatusCode::Ok) }
        });

        let (result, response) = serve(routes, b"GET /test\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert_eq!(body_of(&response), "Bad Request");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_every_parse_failure_is_bad_request() {
        let cases: [&[u8]; 6] = [
            b"PATCH /echo HTTP/1.1\r\n\r\n",
            b"GET /echo HTTPS/1.1\r\n\r\n",
            b"GET /echo HTTP/1.1\r\nNoColon\r\n\r\n",
            b"POST /echo HTTP/1.1\r\nContent-Length: ten\r\n\r\n",
            b"GET /echo HTTP/1.1\r\n",
            b"",
        ];

        for request in cases {
            let (result, response) = serve(echo_router(), request).await;
            assert!(result.is_ok());
            assert!(
                response.starts_with("HTTP/1.1 400 Bad Request\r\n"),
                "unexpected response for {:?}: {response}",
                String::from_utf8_lossy(request)
            );
        }
    }

    #[tokio::test]
    async fn test_echo_post_body() {
        let body = "This is a test POST body";
        let request = format!(
            "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );

        let (result, response) = serve(echo_router(), request.as_bytes()).await;

        assert!(result.is_ok());
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert_eq!(body_of(&response), body);
    }

    #[tokio::test]
    async fn test_handler_sees_only_declared_body() {
        let request = b"POST /echo HTTP/1.1\r\nContent-Length: 4\r\n\r\nbodyGARBAGE";
        let (_, response) = serve(echo_router(), request).await;
        assert_eq!(body_of(&response), "body");
    }

    #[tokio::test]
    async fn test_handler_receives_parsed_request() {
        let mut routes = Router::new();
        routes.add_handler("/inspect", |req| async move {
            let summary = format!(
                "{} {} {} {}",
                req.method,
                req.path,
                req.version,
                req.headers.get("X-Name").map(String::as_str).unwrap_or("-")
            );
            HttpResponse::new(StatusCode::Ok).with_body_string(summary)
        });

        let (_, response) = serve(routes, b"DELETE /inspect HTTP/1.0\r\nX-Name: first\r\nX-Name: last\r\n\r\n").await;
        assert_eq!(body_of(&response), "DELETE /inspect HTTP/1.0 last");
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let mut routes = Router::new();
        routes.add_handler("/", |_req| async { HttpResponse::new(StatusCode::Ok) });

        let result = handle_connection(BrokenPipe, Arc::new(routes)).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_write_response_layout() {
        let response = HttpResponse::with_status(418, "I'm a teapot")
            .with_version(HttpVersion::HTTP_10)
            .with_header("X-B", "2")
            .with_header("X-A", "1")
            .with_body_string("short and stout");

        let mut out = Vec::new();
        write_response(&mut out, response).await.unwrap();

        let expected = "HTTP/1.0 418 I'm a teapot\r\n\
                        Content-Length: 15\r\n\
                        X-A: 1\r\n\
                        X-B: 2\r\n\
                        \r\n\
                        short and stout";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_write_response_without_body() {
        let mut out = Vec::new();
        write_response(&mut out, HttpResponse::new(StatusCode::NoContent)).await.unwrap();
        assert_eq!(out, b"HTTP/1.1 204 No Content\r\n\r\n");
    }

    #[tokio::test]
    async fn test_streamed_body_is_copied_verbatim() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let response = HttpResponse::new(StatusCode::Ok).with_body_reader(Cursor::new(payload.clone()));

        let mut out = Vec::new();
        write_response(&mut out, response).await.unwrap();

        let head = b"HTTP/1.1 200 OK\r\n\r\n";
        assert_eq!(&out[..head.len()], head);
        assert_eq!(&out[head.len()..], payload.as_slice());
    }

    #[tokio::test]
    async fn test_serialized_response_reparses() {
        let response = HttpResponse::new(StatusCode::Created)
            .with_content_type("application/json")
            .with_header("X-Request-Id", "abc-123")
            .with_json(&serde_json::json!({ "id": 7 }))
            .unwrap();
        let expected_headers = response.headers.clone();

        let mut out = Vec::new();
        write_response(&mut out, response).await.unwrap();

        // Swap the status line for a request line so the request parser reads the rest
        let text = String::from_utf8(out).unwrap();
        let (status_line, rest) = text.split_once("\r\n").unwrap();
        assert_eq!(status_line, "HTTP/1.1 201 Created");
        let as_request = format!("PUT /reparse HTTP/1.1\r\n{rest}");

        let mut parsed = parse_request(Cursor::new(as_request.into_bytes())).await.unwrap();
        assert_eq!(parsed.method, Method::PUT);
        assert_eq!(parsed.headers, expected_headers);
        assert_eq!(parsed.body.read_string().await.unwrap(), r#"{"id":7}"#);
    }

    #[test]
    fn test_sentinel_responses() {
        let not_found = HttpResponse::not_found();
        assert_eq!(not_found.status_code, 404);
        assert_eq!(not_found.status_text, "Not Found");
        assert_eq!(not_found.version, HttpVersion::HTTP_11);
        assert_eq!(not_found.headers.get("Content-Type").unwrap(), "text/plain");

        let bad_request = HttpResponse::bad_request();
        assert_eq!(bad_request.status_code, 400);
        assert_eq!(bad_request.status_text, "Bad Request");
        assert_eq!(bad_request.headers.get("Content-Length").unwrap(), "11");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
        assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    }
}
