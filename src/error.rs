//! The two error types shared across the crate.
//!
//! [`Failed`] says an operation was given up on. Whoever produced it has
//! already logged what went wrong, so the caller only needs to stop.
//!
//! [`ExitError`] is what the binaries end with. It maps to the exit status
//! of the process.

use std::{fmt, io};
use log::error;


//------------ Failed --------------------------------------------------------

/// An operation was given up on after logging the reason.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Failed;

impl Failed {
    /// Logs `err` prefixed with `context`.
    pub fn io(context: impl fmt::Display, err: io::Error) -> Self {
        error!("{}: {}", context, err);
        Failed
    }
}


//------------ ExitError -----------------------------------------------------

/// The reason a binary stops with a non-zero status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitError {
    /// Anything that went wrong. Exits with status 1.
    Generic,
}

impl ExitError {
    pub fn exit_code(self) -> i32 {
        match self {
            ExitError::Generic => 1,
        }
    }
}

impl From<Failed> for ExitError {
    fn from(_: Failed) -> ExitError {
        ExitError::Generic
    }
}
