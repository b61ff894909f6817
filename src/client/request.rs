//! Building requests.

use std::fmt;
use bytes::{Bytes, BytesMut};
use crate::http::{Headers, Method, compose_head};


//------------ Constants -----------------------------------------------------

/// Bodies at least this long are left out when showing a request.
const PREVIEW_LIMIT: usize = 512;

/// The content type of an attendance form.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The content type of a free text body.
const TEXT_CONTENT_TYPE: &str = "text/plain";


//------------ RequestBuilder ------------------------------------------------

/// Assembles a request.
///
/// Every request gets a `Host` and a `Connection: close` header. Bodies and
/// their headers are added via [`form`](#method.form) or
/// [`text`](#method.text). Header values are used as given, there is no
/// escaping of any kind.
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    headers: Headers,
    body: Bytes,
}

impl RequestBuilder {
    pub fn new(method: Method, path: impl Into<String>, host: &str) -> Self {
        let mut headers = Headers::new();
        headers.set("Host", host);
        headers.set("Connection", "close");
        RequestBuilder {
            method,
            path: path.into(),
            headers,
            body: Bytes::new(),
        }
    }

    /// Adds a header if it has a value.
    ///
    /// A header with a value of `None` is left out of the request
    /// entirely.
    pub fn header(
        mut self, name: &str, value: Option<impl Into<String>>
    ) -> Self {
        if let Some(value) = value {
            self.headers.set(name, value);
        }
        self
    }

    /// Adds an attendance form as the body.
    pub fn form(self, id: &str, name: &str) -> Self {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("ID", id)
            .append_pair("Name", name)
            .finish();
        self.body(FORM_CONTENT_TYPE, body)
    }

    /// Adds some plain text as the body.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.body(TEXT_CONTENT_TYPE, text.into())
    }

    fn body(mut self, content_type: &str, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        let len = self.body.len();
        self.header(
            "Content-Type", Some(content_type)
        ).header(
            "Content-Length", Some(len.to_string())
        )
    }

    pub fn build(self) -> OutgoingRequest {
        let head = compose_head(
            format_args!("{} {} HTTP/1.1", self.method, self.path),
            &self.headers
        );
        OutgoingRequest {
            method: self.method,
            path: self.path,
            head: head.into(),
            body: self.body,
        }
    }
}


//------------ OutgoingRequest -----------------------------------------------

/// A request ready to be sent.
#[derive(Clone, Debug)]
pub struct OutgoingRequest {
    method: Method,
    path: String,

    /// The request line and headers including the empty line.
    head: Bytes,

    body: Bytes,
}

impl OutgoingRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn head(&self) -> &Bytes {
        &self.head
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the request as it goes onto the wire.
    pub fn to_bytes(&self) -> Bytes {
        let mut res = BytesMut::with_capacity(
            self.head.len() + self.body.len()
        );
        res.extend_from_slice(&self.head);
        res.extend_from_slice(&self.body);
        res.freeze()
    }

    /// Returns a displayable version of the request.
    ///
    /// Short bodies are shown as text. Long bodies are replaced by a note.
    pub fn preview(&self) -> Preview {
        Preview(self)
    }
}


//------------ Preview -------------------------------------------------------

/// Shows a request for humans.
pub struct Preview<'a>(&'a OutgoingRequest);

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0.head))?;
        if self.0.body.is_empty() {
            Ok(())
        }
        else if self.0.body.len() < PREVIEW_LIMIT {
            f.write_str(&String::from_utf8_lossy(&self.0.body))
        }
        else {
            f.write_str("\n(binary or long body omitted)")
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn get() {
        let req = RequestBuilder::new(
            Method::Get, "/index.html", "127.0.0.1"
        ).header("Content-Length", None::<String>).build();
        assert_eq!(
            req.to_bytes(),
            &b"GET /index.html HTTP/1.1\r\n\
               Host: 127.0.0.1\r\n\
               Connection: close\r\n\
               \r\n"[..]
        );
        assert_eq!(req.preview().to_string(), "GET /index.html HTTP/1.1\r\n\
            Host: 127.0.0.1\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn attendance_form() {
        let req = RequestBuilder::new(
            Method::Post, "/attendance", "10.0.0.5"
        ).form("123", "Alice Smith").build();
        assert_eq!(
            req.to_bytes(),
            &b"POST /attendance HTTP/1.1\r\n\
               Host: 10.0.0.5\r\n\
               Connection: close\r\n\
               Content-Type: application/x-www-form-urlencoded\r\n\
               Content-Length: 23\r\n\
               \r\n\
               ID=123&Name=Alice+Smith"[..]
        );
        assert!(req.preview().to_string().ends_with("\r\n\r\nID=123&Name=Alice+Smith"));
    }

    #[test]
    fn text() {
        let req = RequestBuilder::new(
            Method::Post, "/notes", "localhost"
        ).text("hello").build();
        assert_eq!(*req.method(), Method::Post);
        assert_eq!(req.path(), "/notes");
        assert!(req.head().ends_with(
            b"Content-Type: text/plain\r\nContent-Length: 5\r\n\r\n"
        ));
        assert_eq!(req.body(), &b"hello"[..]);
    }

    #[test]
    fn long_body_preview() {
        let req = RequestBuilder::new(
            Method::Post, "/notes", "localhost"
        ).text("x".repeat(PREVIEW_LIMIT)).build();
        let preview = req.preview().to_string();
        assert!(preview.starts_with("POST /notes HTTP/1.1\r\n"));
        assert!(preview.ends_with("\r\n\r\n\n(binary or long body omitted)"));
        assert!(!preview.contains("xxx"));
    }
}
