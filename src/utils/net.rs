//! Sockets.

use std::io;
use std::net::{SocketAddr, TcpListener as StdListener};
use log::error;
use tokio::net::TcpListener;
use crate::error::ExitError;


/// Opens the server’s listening socket.
///
/// The socket is bound synchronously. This must be called from within the
/// runtime.
pub fn bind(addr: &SocketAddr) -> Result<TcpListener, ExitError> {
    let fatal = |what: &str, err: io::Error| {
        error!("Fatal: cannot {} {}: {}", what, addr, err);
        ExitError::Generic
    };
    let listener = StdListener::bind(addr).map_err(|err| {
        fatal("listen on", err)
    })?;
    listener.set_nonblocking(true).map_err(|err| {
        fatal("configure socket for", err)
    })?;
    TcpListener::from_std(listener).map_err(|err| {
        fatal("register socket for", err)
    })
}
