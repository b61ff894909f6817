//! Building responses.

use std::fmt;
use bytes::{Bytes, BytesMut};
use super::{Headers, compose_head};


//------------ Status --------------------------------------------------------

/// The status of a response.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Status {
    code: u16,
    reason: &'static str,
}

impl Status {
    pub const OK: Status = Status { code: 200, reason: "OK" };
    pub const NOT_FOUND: Status = Status { code: 404, reason: "Not Found" };
    pub const INTERNAL_SERVER_ERROR: Status = Status {
        code: 500, reason: "Internal Server Error"
    };

    pub fn code(self) -> u16 {
        self.code
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}


//------------ Response ------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Response {
    status: Status,
    headers: Headers,
    body: Bytes,
}

impl Response {
    /// Returns a Not Found response carrying the given message.
    pub fn not_found(message: impl fmt::Display) -> Self {
        Self::error(Status::NOT_FOUND, message)
    }

    /// Returns the response for when processing a request went wrong.
    ///
    /// The actual reason has hopefully been logged, so we don’t tell the
    /// client anything.
    pub fn server_error() -> Self {
        Self::error(Status::INTERNAL_SERVER_ERROR, "Server error")
    }

    /// Creates an error response.
    ///
    /// The body is a minimal HTML document with the status code as the
    /// title and `message` as its only paragraph.
    pub fn error(status: Status, message: impl fmt::Display) -> Self {
        ResponseBuilder::new(
            status
        ).content_type(
            ContentType::HTML
        ).body(
            format!("<h1>{}</h1><p>{}</p>", status.code(), message)
        )
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the response as it goes onto the wire.
    pub fn to_bytes(&self) -> Bytes {
        let head = compose_head(
            format_args!("HTTP/1.1 {}", self.status), &self.headers
        );
        let mut res = BytesMut::with_capacity(head.len() + self.body.len());
        res.extend_from_slice(head.as_bytes());
        res.extend_from_slice(&self.body);
        res.freeze()
    }
}


//------------ ResponseBuilder ----------------------------------------------

#[derive(Debug)]
pub struct ResponseBuilder {
    status: Status,
    headers: Headers,
}

impl ResponseBuilder {
    /// Creates a new builder with the given status.
    pub fn new(status: Status) -> Self {
        ResponseBuilder {
            status,
            headers: Headers::new(),
        }
    }

    /// Creates a new builder for a 200 OK response.
    pub fn ok() -> Self {
        Self::new(Status::OK)
    }

    /// Adds the content type header.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.headers.set("Content-Type", content_type.0);
        self
    }

    /// Finalizes the response by adding a body.
    ///
    /// This also adds the Content-Length header.
    pub fn body(mut self, body: impl Into<Bytes>) -> Response {
        let body = body.into();
        self.headers.set("Content-Length", body.len().to_string());
        Response {
            status: self.status,
            headers: self.headers,
            body
        }
    }
}


//------------ ContentType ---------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContentType(&'static str);

impl ContentType {
    pub const HTML: ContentType = ContentType("text/html; charset=utf-8");
    pub const TEXT: ContentType = ContentType("text/plain; charset=utf-8");
    pub const PDF: ContentType = ContentType("application/pdf");
    pub const JPEG: ContentType = ContentType("image/jpeg");

    pub fn as_str(self) -> &'static str {
        self.0
    }
}


//============ Tests =========================================================
