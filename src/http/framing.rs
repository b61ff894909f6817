//! Deciding where a request ends.
//!
//! The server reads a request in chunks until the head is complete and, if
//! the head declares a `Content-Length`, until that many body octets have
//! arrived. [`RequestFramer`] implements this rule on plain byte slices so
//! it can be used and tested without any sockets.
//!
//! A request without a `Content-Length` is complete as soon as the head is.
//! Any body octets that arrive later are never looked at, even for a POST.
//!
//! [`RequestFramer`]: struct.RequestFramer.html

use bytes::{Bytes, BytesMut};
use super::{DELIMITER, find_delimiter};


//------------ RequestFramer -------------------------------------------------

/// Accumulates the chunks of a single request.
#[derive(Debug)]
pub struct RequestFramer {
    /// Everything received so far.
    buf: BytesMut,

    /// Where we are.
    state: State,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    /// Waiting for the delimiter after the head.
    Head,

    /// Waiting for the body to reach its declared length.
    ///
    /// The request ends at offset `end` of the buffer.
    Body { end: usize },

    /// The request is complete and ends at offset `end`.
    Done { end: usize },
}

impl RequestFramer {
    pub fn new() -> Self {
        RequestFramer {
            buf: BytesMut::new(),
            state: State::Head,
        }
    }

    /// Adds a chunk of received data.
    ///
    /// Returns whether the request is now complete. Once it is, further
    /// data is ignored.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if let State::Done { .. } = self.state {
            return true
        }
        let searched = self.buf.len().saturating_sub(DELIMITER.len() - 1);
        self.buf.extend_from_slice(chunk);

        if let State::Head = self.state {
            let pos = match find_delimiter(&self.buf[searched..]) {
                Some(pos) => searched + pos,
                None => return false,
            };
            let body_start = pos + DELIMITER.len();
            self.state = match scan_content_length(&self.buf[..pos]) {
                // A length we could never hold saturates and is never
                // reached. Reading then stops at a timeout or EOF.
                Some(len) => {
                    State::Body { end: body_start.saturating_add(len) }
                }
                None => State::Done { end: self.buf.len() },
            };
        }
        if let State::Body { end } = self.state {
            if self.buf.len() >= end {
                self.state = State::Done { end }
            }
        }
        self.is_complete()
    }

    /// Returns whether the request is complete.
    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Done { .. })
    }

    /// Returns whether no data at all has been received.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Converts the framer into the received request.
    ///
    /// For a complete request with a declared length, this is the head and
    /// exactly that many octets of body. In all other cases, including an
    /// incomplete request, it is everything received so far.
    pub fn into_message(mut self) -> Bytes {
        if let State::Done { end } = self.state {
            self.buf.truncate(end);
        }
        self.buf.freeze()
    }
}

impl Default for RequestFramer {
    fn default() -> Self {
        Self::new()
    }
}


//------------ scan_content_length -------------------------------------------

/// Finds the declared body length in a request head.
///
/// Only the first line starting with `content-length:` in any case is
/// considered. If its value isn’t a non-negative decimal number, the
/// request is treated as having no declared length.
fn scan_content_length(head: &[u8]) -> Option<usize> {
    const NAME: &[u8] = b"content-length:";

    let line = head.split(|&ch| ch == b'\n').map(|line| {
        line.strip_suffix(b"\r").unwrap_or(line)
    }).find(|line| {
        line.len() >= NAME.len()
            && line[..NAME.len()].eq_ignore_ascii_case(NAME)
    })?;
    std::str::from_utf8(&line[NAME.len()..]).ok()?.trim().parse().ok()
}


//============ Tests =========================================================
