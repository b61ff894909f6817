//! Exchanging a request for a response.
//!
//! The client doesn’t look at the headers to find the end of the response.
//! It simply reads until the server closes the connection.

use std::{fmt, io};
use std::io::{Read, Write};
use std::net::TcpStream;
use bytes::Bytes;
use crate::http::{CHUNK_SIZE, split_message};
use super::request::OutgoingRequest;


//------------ Constants -----------------------------------------------------

/// How much of an invalid response is shown.
pub const INVALID_PREVIEW_LEN: usize = 2000;


//------------ exchange ------------------------------------------------------

/// Sends a request to a server and returns the raw response.
///
/// This opens a new connection to `host` and `port`, writes the request,
/// and reads until the server closes the connection. There is no timeout.
pub fn exchange(
    host: &str, port: u16, request: &OutgoingRequest
) -> Result<Bytes, ExchangeError> {
    let mut sock = TcpStream::connect(
        (host, port)
    ).map_err(ExchangeError::Connect)?;
    sock.write_all(&request.to_bytes()).map_err(ExchangeError::Io)?;
    read_to_eof(&mut sock).map_err(ExchangeError::Io)
}

/// Reads everything from `sock` until end-of-file.
pub fn read_to_eof(sock: &mut impl Read) -> Result<Bytes, io::Error> {
    let mut res = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        match sock.read(&mut chunk) {
            Ok(0) => return Ok(res.into()),
            Ok(read) => res.extend_from_slice(&chunk[..read]),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => { }
            Err(err) => return Err(err),
        }
    }
}


//------------ ClientResponse ------------------------------------------------

/// A response split into its head and body.
#[derive(Clone, Debug)]
pub struct ClientResponse {
    head: Bytes,
    body: Bytes,
}

impl ClientResponse {
    /// Splits a raw response at the first empty line.
    ///
    /// Nothing else is checked: the status line and headers are not
    /// parsed and the body is used whatever its length.
    pub fn parse(raw: Bytes) -> Result<Self, ExchangeError> {
        let (head, body) = match split_message(&raw) {
            Some((head, body)) => (head.len(), raw.len() - body.len()),
            None => return Err(ExchangeError::InvalidResponse(raw)),
        };
        Ok(ClientResponse {
            head: raw.slice(..head),
            body: raw.slice(body..),
        })
    }

    /// Returns the status line and headers.
    pub fn head(&self) -> &Bytes {
        &self.head
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}


//------------ ExchangeError -------------------------------------------------

/// Exchanging a request for a response failed.
#[derive(Debug)]
pub enum ExchangeError {
    /// Connecting to the server failed.
    Connect(io::Error),

    /// Sending or receiving failed.
    Io(io::Error),

    /// The response has no empty line after its head.
    ///
    /// Contains everything that was received.
    InvalidResponse(Bytes),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExchangeError::Connect(ref err) => {
                write!(f, "failed to connect: {}", err)
            }
            ExchangeError::Io(ref err) => {
                write!(f, "connection failed: {}", err)
            }
            ExchangeError::InvalidResponse(_) => {
                f.write_str("invalid HTTP response")
            }
        }
    }
}

impl std::error::Error for ExchangeError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    /// A reader that hands out its data in small pieces.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
        interrupt: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into())
            }
            let len = self.step.min(buf.len()).min(self.data.len());
            buf[..len].copy_from_slice(&self.data[..len]);
            self.data = &self.data[len..];
            Ok(len)
        }
    }

    #[test]
    fn read_everything() {
        let data = vec![7u8; 3 * CHUNK_SIZE + 5];
        let read = read_to_eof(&mut Trickle {
            data: &data, step: 1000, interrupt: false
        }).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn split_response() {
        let res = ClientResponse::parse(Bytes::from_static(
            b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nab\r\n\r\n"
        )).unwrap();
        assert_eq!(res.head(), &b"HTTP/1.1 200 OK\r\nContent-Length: 4"[..]);
        assert_eq!(res.body(), &b"ab\r\n\r\n"[..]);
    }

    #[test]
    fn invalid_response() {
        match ClientResponse::parse(Bytes::from_static(b"HTTP/1.1 200 OK\r\n")) {
            Err(ExchangeError::InvalidResponse(raw)) => {
                assert_eq!(raw, &b"HTTP/1.1 200 OK\r\n"[..])
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
