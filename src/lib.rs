//! The Rollcall library.
//!
//! This crate contains all the moving parts of both the Rollcall server and
//! client. The two binaries are only very tiny frontends.
//!
//! Both sides speak a deliberately small subset of HTTP/1.1 directly over
//! TCP. The shared bits live in [`http`], the server in [`server`], and the
//! client in [`client`].

pub use self::client::Client;
pub use self::config::{ClientConfig, Config};
pub use self::error::{ExitError, Failed};
pub use self::log::Logger;
pub use self::server::Server;

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod log;
pub mod server;
pub mod utils;

#[cfg(test)]
mod test;
