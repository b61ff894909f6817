//! The HTTP server.
//!
//! The server answers a fixed set of requests, see [`dispatch`] for the
//! list. Each accepted connection carries exactly one request and is closed
//! once the response has been written.
//!
//! [`dispatch`]: dispatch/index.html

pub use self::dispatch::State;

pub mod attendance;
pub mod dispatch;
pub mod files;
pub mod listener;
pub mod pages;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use log::{error, info};
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use crate::config::Config;
use crate::error::{ExitError, Failed};
use crate::utils::net::bind;


//------------ Server --------------------------------------------------------

/// A configured server ready to run.
#[derive(Clone, Debug)]
pub struct Server {
    /// The address to listen on.
    listen: SocketAddr,

    /// The timeout for each read from a connection.
    read_timeout: Duration,

    /// Everything the request handlers need.
    state: Arc<State>,
}

impl Server {
    /// Creates a new server from the configuration.
    ///
    /// This fails if a configured index page can’t be read.
    pub fn new(config: &Config) -> Result<Self, Failed> {
        Ok(Server {
            listen: config.listen,
            read_timeout: config.read_timeout,
            state: Arc::new(State::from_config(config)?),
        })
    }

    /// Runs the server until interrupted.
    ///
    /// Creates a runtime, binds the listener, and serves connections until
    /// Ctrl-C is pressed.
    pub fn run(self) -> Result<(), ExitError> {
        let runtime = Runtime::new().map_err(|err| {
            error!("Failed to create runtime: {}", err);
            ExitError::Generic
        })?;
        runtime.block_on(async move {
            let listener = bind(&self.listen)?;
            info!("Serving HTTP on {}", self.listen);
            tokio::select! {
                _ = self.serve(listener) => Err(ExitError::Generic),
                res = tokio::signal::ctrl_c() => {
                    match res {
                        Ok(()) => {
                            info!("Shutting down.");
                            Ok(())
                        }
                        Err(err) => {
                            error!("Failed to listen for Ctrl-C: {}", err);
                            Err(ExitError::Generic)
                        }
                    }
                }
            }
        })
    }

    /// Serves connections arriving at `listener`.
    ///
    /// The returned future only resolves if the listener breaks.
    pub async fn serve(self, listener: TcpListener) {
        listener::listen(listener, self.state, self.read_timeout).await
    }
}
