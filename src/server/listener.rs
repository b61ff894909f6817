//! The listener and the connection workers.

use std::io;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use bytes::Bytes;
use futures::FutureExt;
use log::{debug, error, info};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use crate::http::CHUNK_SIZE;
use crate::http::framing::RequestFramer;
use crate::http::request::{Request, request_line};
use crate::http::response::Response;
use super::dispatch::State;


//------------ listen --------------------------------------------------------

/// Accepts connections until the listener breaks.
///
/// Each connection is handed to its own task. The future only resolves if
/// accepting fails.
pub async fn listen(
    listener: TcpListener, state: Arc<State>, read_timeout: Duration,
) {
    loop {
        let (sock, peer) = match listener.accept().await {
            Ok(some) => some,
            Err(err) => {
                error!("Fatal error accepting connection: {}", err);
                return
            }
        };
        info!("Accepted: {}", peer);
        tokio::spawn(
            handle_connection(sock, peer, state.clone(), read_timeout)
        );
    }
}


//------------ handle_connection ---------------------------------------------

/// Processes a single connection.
///
/// Reads one request, answers it, and closes the connection. Whatever
/// happens while producing the response, the client gets some response.
pub async fn handle_connection<S: AsyncRead + AsyncWrite + Unpin>(
    mut sock: S,
    peer: SocketAddr,
    state: Arc<State>,
    read_timeout: Duration,
) {
    let response = match read_request(&mut sock, read_timeout).await {
        Ok(raw) if raw.is_empty() => {
            debug!("Empty request from {}", peer);
            Response::not_found("Empty request")
        }
        Ok(raw) => {
            info!("--- Request from {} ---", peer);
            info!("{}", request_line(&raw));
            let req = Request::parse(&raw);
            if req.is_none() {
                info!("(unparsable request line)");
            }
            match AssertUnwindSafe(
                state.handle_request(req, peer)
            ).catch_unwind().await {
                Ok(response) => response,
                Err(_) => {
                    error!("Request handler for {} panicked", peer);
                    Response::server_error()
                }
            }
        }
        Err(err) => {
            error!("Failed to read request from {}: {}", peer, err);
            Response::server_error()
        }
    };
    if let Err(err) = sock.write_all(&response.to_bytes()).await {
        debug!("Failed to send response to {}: {}", peer, err);
        return
    }
    let _ = sock.shutdown().await;
}


//------------ read_request --------------------------------------------------

/// Reads a request from a socket.
///
/// Each read waits for at most `read_timeout`. If it times out or the peer
/// stops sending, whatever has been received is returned.
pub async fn read_request<R: AsyncRead + Unpin>(
    sock: &mut R, read_timeout: Duration,
) -> Result<Bytes, io::Error> {
    let mut framer = RequestFramer::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let read = match tokio::time::timeout(
            read_timeout, sock.read(&mut chunk)
        ).await {
            Ok(read) => read?,
            Err(_) => break,
        };
        if read == 0 {
            break
        }
        if framer.push(&chunk[..read]) {
            break
        }
    }
    Ok(framer.into_message())
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use tokio::io::{duplex, AsyncWriteExt};
    use super::super::attendance::AttendanceLog;
    use super::super::files::StaticFiles;
    use super::super::pages::IndexPage;

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn read_fragmented_body() {
        let (mut client, mut server) = duplex(64);
        let writer = tokio::spawn(async move {
            client.write_all(
                b"POST /attendance HTTP/1.1\r\nContent-Length: 17\r\n\r\n"
            ).await.unwrap();
            client.write_all(b"ID=123").await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            client.write_all(b"&Name=Alice and more").await.unwrap();
            client
        });
        let raw = read_request(&mut server, TIMEOUT).await.unwrap();
        assert!(raw.ends_with(b"\r\n\r\nID=123&Name=Alice"));
        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn read_until_timeout() {
        let (mut client, mut server) = duplex(64);
        client.write_all(b"GET / HTTP/1.1\r\nHost: x").await.unwrap();
        let raw = read_request(&mut server, TIMEOUT).await.unwrap();
        assert_eq!(raw, &b"GET / HTTP/1.1\r\nHost: x"[..]);
        drop(client);
    }

    #[tokio::test]
    async fn read_until_eof() {
        let (mut client, mut server) = duplex(64);
        client.write_all(b"GET /").await.unwrap();
        drop(client);
        let raw = read_request(&mut server, TIMEOUT).await.unwrap();
        assert_eq!(raw, &b"GET /"[..]);
    }

    #[tokio::test]
    async fn empty_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = Arc::new(State::new(
            IndexPage::default(),
            StaticFiles::new(dir.path()),
            AttendanceLog::new(dir.path().join("attendance.csv")),
        ));
        let (mut client, server) = duplex(4096);
        client.shutdown().await.unwrap();
        handle_connection(
            server, "127.0.0.1:1234".parse().unwrap(), state, TIMEOUT
        ).await;
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        assert!(response.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
        assert!(response.ends_with(b"<p>Empty request</p>"));
    }
}
