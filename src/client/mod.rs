//! The interactive HTTP client.
//!
//! The client asks for a server, a method and a path, sends a single
//! request, shows the response head, and then deals with the body
//! according to the rules in [`output`].
//!
//! [`output`]: output/index.html

pub mod output;
pub mod prompt;
pub mod request;
pub mod response;

use std::io::{self, BufRead, Write};
use bytes::Bytes;
use log::error;
use crate::config::ClientConfig;
use crate::error::Failed;
use crate::http::Method;
use self::output::{Action, Output};
use self::prompt::Console;
use self::request::{OutgoingRequest, RequestBuilder};
use self::response::{
    ClientResponse, ExchangeError, INVALID_PREVIEW_LEN, exchange
};


//------------ Client --------------------------------------------------------

/// The client.
#[derive(Clone, Debug)]
pub struct Client {
    config: ClientConfig,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Client { config }
    }

    /// Runs a single exchange on the terminal.
    pub fn run(&self) -> Result<(), Failed> {
        let stdin = io::stdin();
        self.run_with(&mut Console::new(stdin.lock(), io::stdout()))
    }

    /// Runs a single exchange using the given console.
    pub fn run_with<R: BufRead, W: Write>(
        &self, console: &mut Console<R, W>
    ) -> Result<(), Failed> {
        let host = console.ask(
            "Enter the server IP address \
             (e.g., 127.0.0.1 or your host's IP): "
        )?;
        let method = Method::from_token(
            &console.ask("Enter HTTP method (GET or POST): ")?.to_uppercase()
        );
        let path = console.ask(
            "Enter request path \
             (e.g., /index.html, /document.pdf, /wow.jpg, /attendance): "
        )?;
        let request = Self::build_request(console, method, path, &host)?;

        console.write(format_args!(
            "\n--- Sending HTTP Request ---\n\n{}\n", request.preview()
        ))?;

        let response = match exchange(&host, self.config.port, &request)
                                .and_then(ClientResponse::parse) {
            Ok(response) => response,
            Err(ExchangeError::InvalidResponse(raw)) => {
                Self::show_invalid(console, &raw)?;
                return Err(Failed)
            }
            Err(err) => {
                error!("{}:{}: {}", host, self.config.port, err);
                return Err(Failed)
            }
        };

        console.write(format_args!(
            "\n--- Response Headers ---\n\n{}\n",
            String::from_utf8_lossy(response.head())
        ))?;
        Output::new(
            self.config.output_dir.clone(), self.config.open_browser
        ).process(
            Action::select(request.method(), request.path()),
            response.body(),
            console.output()
        )
    }

    /// Asks for whatever else the request needs and builds it.
    fn build_request<R: BufRead, W: Write>(
        console: &mut Console<R, W>,
        method: Method,
        path: String,
        host: &str,
    ) -> Result<OutgoingRequest, Failed> {
        let builder = match method {
            Method::Post if path == "/attendance" => {
                let id = console.ask("Enter your Student ID: ")?;
                let name = console.ask("Enter your Name: ")?;
                RequestBuilder::new(method, path, host).form(&id, &name)
            }
            Method::Post => {
                let text = console.ask_line(
                    "Enter data to send in POST request: "
                )?;
                RequestBuilder::new(method, path, host).text(text)
            }
            _ => {
                RequestBuilder::new(
                    method, path, host
                ).header("Content-Length", None::<String>)
            }
        };
        Ok(builder.build())
    }

    fn show_invalid<R: BufRead, W: Write>(
        console: &mut Console<R, W>, raw: &Bytes
    ) -> Result<(), Failed> {
        let len = raw.len().min(INVALID_PREVIEW_LEN);
        console.write(format_args!(
            "\nError: Invalid HTTP response.\n{}\n",
            String::from_utf8_lossy(&raw[..len])
        ))
    }
}


//============ Tests =========================================================
