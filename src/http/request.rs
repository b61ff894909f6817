//! Parsing requests.

use bytes::Bytes;
use super::{DELIMITER, Headers, Method, find_delimiter};


//------------ Request -------------------------------------------------------

/// A request received by the server.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    path: String,
    version: String,

    /// The header fields with all names converted to lower case.
    headers: Headers,

    /// Everything after the head.
    ///
    /// This has not been cut to the declared length.
    body: Bytes,
}

impl Request {
    /// Parses a request from the raw octets received.
    ///
    /// Returns `None` if there is no delimiter after the head or if the
    /// request line isn’t made of a method, a path, and a version. Header
    /// lines without a colon are skipped. Octets in the head that aren’t
    /// valid UTF-8 are replaced.
    pub fn parse(raw: &Bytes) -> Option<Self> {
        let pos = find_delimiter(raw)?;
        let head = String::from_utf8_lossy(&raw[..pos]);
        let mut lines = head.split("\r\n");

        let mut request_line = lines.next()?.splitn(3, ' ');
        let method = Method::from_token(request_line.next()?);
        let path = request_line.next()?.into();
        let version = request_line.next()?.into();

        let mut headers = Headers::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                headers.set(name.trim().to_lowercase(), value.trim());
            }
        }

        Some(Request {
            method, path, version, headers,
            body: raw.slice(pos + DELIMITER.len()..),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns whether this is a GET request for the given path.
    pub fn is_get(&self, path: &str) -> bool {
        self.method == Method::Get && self.path == path
    }

    /// Returns whether this is a POST request for the given path.
    pub fn is_post(&self, path: &str) -> bool {
        self.method == Method::Post && self.path == path
    }

    /// Returns the body cut to the declared length.
    ///
    /// If there is no Content-Length or it is zero, the whole body is
    /// returned. If the field is present but its value isn’t a
    /// non-negative decimal number, returns `None`.
    pub fn declared_body(&self) -> Option<Bytes> {
        let len = match self.headers.get("content-length") {
            Some(value) => value.trim().parse::<usize>().ok()?,
            None => 0,
        };
        if len == 0 {
            Some(self.body.clone())
        }
        else {
            Some(self.body.slice(..len.min(self.body.len())))
        }
    }
}


//------------ request_line --------------------------------------------------

/// Returns the first line of a raw request for logging.
pub fn request_line(raw: &[u8]) -> String {
    let end = raw.windows(2).position(|window| window == b"\r\n")
        .unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}


//============ Tests =========================================================
