//! End-to-end scenarios driven over a real socket against a running [`Server`].
//!
//! Colocated unit tests cover parsing, encoding negotiation, and range merging
//! in isolation; these tests drive the full accept -> parse -> handle -> write
//! pipeline with a plain `tokio::net::TcpStream` as the client.

use dispatch_http::{
    limits::ConnLimits, CompressionType, Handled, Method, Request, Response, Server, StatusCode,
};
use std::time::Duration;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

struct EchoHandler {
    file_path: std::path::PathBuf,
    file_len: u64,
}

impl dispatch_http::Handler for EchoHandler {
    async fn handle(&self, _: &mut (), req: &Request, resp: &mut Response) -> Handled {
        match req.url().path() {
            b"/hi" => resp.status(StatusCode::Ok).body("hi"),

            b"/close" => resp.status(StatusCode::Ok).close().body("closed"),

            b"/a" => resp.status(StatusCode::Ok).body("resp-a"),
            b"/b" => resp.status(StatusCode::Ok).body("resp-b"),

            b"/encoding" => {
                let picked = Response::negotiate_encoding(
                    req.header(b"accept-encoding"),
                    CompressionType::Brotli,
                    &[CompressionType::Gzip],
                )
                .expect("gzip is acceptable");
                resp.status(StatusCode::Ok)
                    .add_encoding_header(picked)
                    .body("payload")
            }

            b"/file" => {
                assert_eq!(req.method(), Method::Head);
                resp.status(StatusCode::Ok)
                    .send_file(&self.file_path)
                    .await
                    .expect("temp file must open")
            }

            b"/range" => {
                let header = req.header(b"range").expect("range header required");
                match Response::parse_ranges(header, self.file_len) {
                    Ok(ranges) => resp
                        .status(StatusCode::Ok)
                        .header("x-range-count", ranges.len())
                        .body(""),
                    Err(status) => resp.status(status).body(""),
                }
            }

            _ => resp.status(StatusCode::NotFound).body(""),
        }
    }
}

async fn spawn_server() -> (std::net::SocketAddr, std::path::PathBuf, u64) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let file_path = std::env::temp_dir().join(format!("dispatch_http_e2e_{}.bin", addr.port()));
    let contents = b"the quick brown fox jumps over";
    tokio::fs::write(&file_path, contents).await.unwrap();
    let file_len = contents.len() as u64;

    let server = Server::builder()
        .listener(listener)
        .handler(EchoHandler {
            file_path: file_path.clone(),
            file_len,
        })
        .connection_limits(ConnLimits {
            socket_read_timeout: Duration::from_secs(2),
            socket_write_timeout: Duration::from_secs(2),
            ..ConnLimits::default()
        })
        .build();

    tokio::spawn(server.launch());

    (addr, file_path, file_len)
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(headers: &str) -> Option<usize> {
    headers.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-length")
            .then(|| value.trim().parse().ok())
            .flatten()
    })
}

/// Reads one full response (status line + headers + body, if `content-length`
/// names one) off `stream`. Leaves any pipelined bytes that arrived after it
/// untouched on the socket - callers reading a second response just call this
/// again.
async fn read_response(stream: &mut TcpStream) -> (String, Vec<u8>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers completed");
        buf.extend_from_slice(&chunk[..n]);
    };

    let headers = String::from_utf8(buf[..header_end].to_vec()).unwrap();
    let wanted = content_length(&headers).unwrap_or(0);
    let mut body = buf[header_end + 4..].to_vec();

    while body.len() < wanted {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body completed");
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(wanted);

    (headers, body)
}

/// Asserts that, for a short window, no further bytes arrive on `stream` -
/// used to confirm a HEAD response carries no body.
async fn assert_no_more_bytes(stream: &mut TcpStream) {
    let mut byte = [0u8; 1];
    let result = tokio::time::timeout(Duration::from_millis(100), stream.read(&mut byte)).await;
    assert!(result.is_err(), "expected no further bytes, got some");
}

#[tokio::test]
async fn http10_send_text_closes_connection() {
    let (addr, _file, _len) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /hi HTTP/1.0\r\nHost: x\r\n\r\n")
        .await
        .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();

    assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(text.contains("content-length: 0000000002\r\n"));
    assert!(text.ends_with("\r\n\r\nhi"));
}

#[tokio::test]
async fn connection_close_header_closes_keepalive_connection() {
    let (addr, _file, _len) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /close HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("connection: close\r\n"));
    assert!(text.ends_with("closed"));
}

#[tokio::test]
async fn pipelined_requests_both_handled_connection_stays_open() {
    let (addr, _file, _len) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /a HTTP/1.1\r\nHost: x\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();

    let (headers_a, body_a) = read_response(&mut stream).await;
    assert!(headers_a.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body_a, b"resp-a");

    let (headers_b, body_b) = read_response(&mut stream).await;
    assert!(headers_b.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body_b, b"resp-b");

    assert_no_more_bytes(&mut stream).await;
}

#[tokio::test]
async fn accept_encoding_negotiation_prefers_acceptable_fallback() {
    let (addr, _file, _len) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /encoding HTTP/1.1\r\nHost: x\r\nAccept-Encoding: gzip, br;q=0\r\n\r\n")
        .await
        .unwrap();

    let (headers, body) = read_response(&mut stream).await;
    assert!(headers.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(headers.contains("Content-Encoding: gzip\r\n"));
    assert_eq!(body, b"payload");
}

#[tokio::test]
async fn head_request_with_send_file_has_no_body() {
    let (addr, _file, file_len) = spawn_server().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"HEAD /file HTTP/1.1\r\nHost: x\r\n\r\n")
        .await
        .unwrap();

    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0);
        buf.extend_from_slice(&chunk[..n]);
    };
    let headers = String::from_utf8(buf[..header_end].to_vec()).unwrap();
    let trailing = &buf[header_end + 4..];

    assert!(headers.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(content_length(&headers), Some(file_len as usize));
    assert!(trailing.is_empty());
    assert_no_more_bytes(&mut stream).await;
}

#[tokio::test]
async fn range_overlap_rejected_touching_merged_disjoint_kept_separate() {
    let (addr, _file, _len) = spawn_server().await;

    // Overlapping ranges -> 416.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /range HTTP/1.1\r\nHost: x\r\nRange: bytes=0-9,5-14\r\n\r\n")
        .await
        .unwrap();
    let (headers, _) = read_response(&mut stream).await;
    assert!(headers.starts_with("HTTP/1.1 416 Range Not Satisfiable\r\n"));

    // Disjoint ranges -> kept as two ranges.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /range HTTP/1.1\r\nHost: x\r\nRange: bytes=0-9,20-29\r\n\r\n")
        .await
        .unwrap();
    let (headers, _) = read_response(&mut stream).await;
    assert!(headers.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(headers.contains("x-range-count: 2\r\n"));

    // Touching ranges -> merged into one.
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /range HTTP/1.1\r\nHost: x\r\nRange: bytes=0-9,10-19\r\n\r\n")
        .await
        .unwrap();
    let (headers, _) = read_response(&mut stream).await;
    assert!(headers.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(headers.contains("x-range-count: 1\r\n"));
}
