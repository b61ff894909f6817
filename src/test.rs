//! End-to-end tests.
//!
//! These run a real server on a loopback port and talk to it over TCP.

use std::fs;
use std::io::Cursor;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use bytes::Bytes;
use chrono::NaiveDateTime;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use crate::client::Client;
use crate::client::prompt::Console;
use crate::client::response::ClientResponse;
use crate::config::{ClientConfig, Config};
use crate::server::Server;
use crate::server::attendance::CONFIRMATION;


//------------ Helpers -------------------------------------------------------

const PDF: &[u8] = b"%PDF-1.4\n\x00\x01\x02\xff binary stuff\n%%EOF";
const JPEG: &[u8] = b"\xff\xd8\xff\xe0\x00\x10JFIF\x00 pixels \xff\xd9";

fn config(dir: &Path) -> Config {
    Config {
        listen: SocketAddr::from(([127, 0, 0, 1], 0)),
        read_timeout: Duration::from_millis(500),
        files_dir: dir.into(),
        attendance_log: dir.join("data/attendance.csv"),
        .. Default::default()
    }
}

/// Starts a server serving from `dir` and returns its address.
async fn start(dir: &Path) -> SocketAddr {
    let config = config(dir);
    let server = Server::new(&config).unwrap();
    let listener = TcpListener::bind(config.listen).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.serve(listener));
    addr
}

/// Sends a request in the given pieces and returns the parsed response.
async fn send(addr: SocketAddr, pieces: &[&[u8]]) -> ClientResponse {
    let mut sock = TcpStream::connect(addr).await.unwrap();
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        sock.write_all(piece).await.unwrap();
    }
    let mut response = Vec::new();
    sock.read_to_end(&mut response).await.unwrap();
    ClientResponse::parse(Bytes::from(response)).unwrap()
}

async fn get(addr: SocketAddr, path: &str) -> ClientResponse {
    let request = format!("GET {} HTTP/1.1\r\nHost: test\r\n\r\n", path);
    send(addr, &[request.as_bytes()]).await
}

fn head(response: &ClientResponse) -> String {
    String::from_utf8_lossy(response.head()).into_owned()
}

fn attendance_lines(dir: &Path) -> Vec<String> {
    fs::read_to_string(
        dir.join("data/attendance.csv")
    ).unwrap().lines().map(Into::into).collect()
}


//------------ Tests ---------------------------------------------------------

#[tokio::test]
async fn index_page() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path()).await;
    for path in ["/", "/index.html"] {
        let res = get(addr, path).await;
        let res_head = head(&res);
        assert!(res_head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(res_head.contains("Content-Type: text/html; charset=utf-8"));
        assert!(res_head.contains(
            &format!("Content-Length: {}", res.body().len())
        ));
        assert!(res.body().starts_with(b"<!DOCTYPE html>"));
    }
}

#[tokio::test]
async fn static_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("document.pdf"), PDF).unwrap();
    let addr = start(dir.path()).await;

    let res = get(addr, "/document.pdf").await;
    let pdf_head = head(&res);
    assert!(pdf_head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(pdf_head.contains("Content-Type: application/pdf"));
    assert!(pdf_head.contains(&format!("Content-Length: {}", PDF.len())));
    assert_eq!(res.body(), PDF);

    let res = get(addr, "/wow.jpg").await;
    assert!(head(&res).starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(String::from_utf8_lossy(res.body()).contains("wow.jpg"));

    fs::write(dir.path().join("wow.jpg"), JPEG).unwrap();
    let res = get(addr, "/wow.jpg").await;
    let jpeg_head = head(&res);
    assert!(jpeg_head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(jpeg_head.contains("Content-Type: image/jpeg"));
    assert!(jpeg_head.contains(&format!("Content-Length: {}", JPEG.len())));
    assert_eq!(res.body(), JPEG);
}

#[tokio::test]
async fn record_attendance() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path()).await;
    let res = send(addr, &[
        b"POST /attendance HTTP/1.1\r\n\
          Content-Type: application/x-www-form-urlencoded\r\n\
          Content-Length: 17\r\n\r\nID=123&Name=Alice"
    ]).await;
    assert!(head(&res).starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head(&res).contains("Content-Type: text/plain; charset=utf-8"));
    assert_eq!(res.body(), CONFIRMATION.as_bytes());

    let lines = attendance_lines(dir.path());
    assert_eq!(lines.len(), 1);
    let fields: Vec<_> = lines[0].split(',').collect();
    assert_eq!(fields.len(), 4);
    assert!(
        NaiveDateTime::parse_from_str(fields[0], "%Y-%m-%dT%H:%M:%S").is_ok()
    );
    assert!(fields[1].starts_with("127.0.0.1:"));
    assert_eq!(fields[2], "123");
    assert_eq!(fields[3], "Alice");
}

#[tokio::test]
async fn fragmented_body() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path()).await;
    let res = send(addr, &[
        b"POST /attendance HTTP/1.1\r\nContent-",
        b"Length: 22\r\n\r\nID=9&Na",
        b"me=Grace+Hopper&ignored=trailing+data",
    ]).await;
    assert_eq!(res.body(), CONFIRMATION.as_bytes());
    let lines = attendance_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(",9,Grace Hopper"));
}

// A length that can never arrive makes the server read until the timeout
// and then handle whatever it got.
#[tokio::test]
async fn huge_content_length() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path()).await;
    let res = send(addr, &[
        b"POST /attendance HTTP/1.1\r\n\
          Content-Length: 18446744073709551615\r\n\r\nID=1&Name=Max"
    ]).await;
    assert!(head(&res).starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(res.body(), CONFIRMATION.as_bytes());
    let lines = attendance_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(",1,Max"));
}

#[tokio::test]
async fn invalid_content_length() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path()).await;
    let res = send(addr, &[
        b"POST /attendance HTTP/1.1\r\nContent-Length: abc\r\n\r\n\
          ID=1&Name=Eve"
    ]).await;
    assert!(
        head(&res).starts_with("HTTP/1.1 500 Internal Server Error\r\n")
    );
    assert!(String::from_utf8_lossy(res.body()).contains("Server error"));
    assert!(!dir.path().join("data/attendance.csv").exists());
}

#[tokio::test]
async fn body_without_length_is_not_awaited() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path()).await;
    let res = send(addr, &[b"POST /attendance HTTP/1.1\r\n\r\n"]).await;
    assert_eq!(res.body(), CONFIRMATION.as_bytes());
    let lines = attendance_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(",,"));
}

#[tokio::test]
async fn unknown_path() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path()).await;
    let res = get(addr, "/nope").await;
    assert!(head(&res).starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(head(&res).contains("Content-Type: text/html; charset=utf-8"));
    assert!(String::from_utf8_lossy(res.body()).contains("/nope"));
}

#[tokio::test]
async fn unparsable_request() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path()).await;
    let res = send(addr, &[b"HELLO\r\n\r\n"]).await;
    assert!(head(&res).starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(String::from_utf8_lossy(res.body()).contains("not handled"));
}

#[tokio::test(flavor = "multi_thread")]
async fn client_and_server() {
    let dir = tempfile::tempdir().unwrap();
    let addr = start(dir.path()).await;
    let out_dir = tempfile::tempdir().unwrap();
    let client = Client::new(ClientConfig {
        port: addr.port(),
        output_dir: out_dir.path().into(),
        open_browser: false,
        .. Default::default()
    });

    let output = tokio::task::spawn_blocking(move || {
        let mut console = Console::new(
            Cursor::new("127.0.0.1\npost\n/attendance\n42\nAda Lovelace\n"),
            Vec::new()
        );
        client.run_with(&mut console).unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }).await.unwrap();

    assert!(output.contains("ID=42&Name=Ada+Lovelace"));
    assert!(output.contains("--- Server Message ---"));
    assert!(output.contains(CONFIRMATION));
    let lines = attendance_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(",42,Ada Lovelace"));
}
