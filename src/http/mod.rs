//! The bits of HTTP/1.1 both sides need.
//!
//! Messages are framed the simplest possible way: a head made of the start
//! line and header lines each terminated by CRLF, an empty line, and then
//! the body. Where a body ends is determined by the `Content-Length` header
//! on the server side and by the peer closing the connection on the client
//! side. There is no chunked encoding and there is no keep-alive.

use std::fmt;

pub mod framing;
pub mod request;
pub mod response;


//------------ Constants -----------------------------------------------------

/// The empty line separating the head of a message from its body.
pub const DELIMITER: &[u8] = b"\r\n\r\n";

/// The size of the chunks we read from a socket.
pub const CHUNK_SIZE: usize = 4096;


//------------ Splitting Messages --------------------------------------------

/// Returns the position of the first head delimiter in `data`.
///
/// The position is that of the delimiter’s first octet.
pub fn find_delimiter(data: &[u8]) -> Option<usize> {
    data.windows(DELIMITER.len()).position(|window| window == DELIMITER)
}

/// Splits a message into its head and its body.
///
/// The delimiter itself is part of neither. Returns `None` if there is no
/// delimiter at all.
pub fn split_message(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = find_delimiter(data)?;
    Some((&data[..pos], &data[pos + DELIMITER.len()..]))
}


//------------ Method --------------------------------------------------------

/// The method of a request.
///
/// Only GET and POST mean anything to us. Everything else is kept verbatim
/// so it can be sent or logged.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    /// Creates a method from its token.
    ///
    /// Methods are case-sensitive, so `get` is not GET.
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            _ => Method::Other(token.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        match *self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(ref token) => token.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//------------ Headers -------------------------------------------------------

/// A list of header fields.
///
/// The fields are kept in the order they were added, which is also the
/// order they are written out in. Lookup ignores ASCII case.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of a header field.
    ///
    /// If a field with the same name already exists, its value is replaced
    /// and it keeps its position. Otherwise the field is appended.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| {
            key.eq_ignore_ascii_case(&name)
        }) {
            Some(field) => field.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns the value of the field with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(key, _)| {
            key.eq_ignore_ascii_case(name)
        }).map(|(_, value)| value.as_str())
    }

    /// Returns the value of the Content-Length field if it is a number.
    pub fn content_length(&self) -> Option<usize> {
        self.get("content-length")?.trim().parse().ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// Writes the fields as header lines, each terminated by CRLF.
impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{}: {}\r\n", name, value)?;
        }
        Ok(())
    }
}


//------------ compose_head --------------------------------------------------

/// Composes the head of a message including the trailing empty line.
pub fn compose_head(
    start_line: impl fmt::Display, headers: &Headers
) -> String {
    format!("{}\r\n{}\r\n", start_line, headers)
}


//============ Tests =========================================================
