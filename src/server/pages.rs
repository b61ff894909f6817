//! The index page.

use std::fs;
use bytes::Bytes;
use log::error;
use crate::config::Config;
use crate::error::Failed;
use crate::http::request::Request;
use crate::http::response::{ContentType, Response, ResponseBuilder};


//------------ DEFAULT_INDEX -------------------------------------------------

/// The page served if no other page is configured.
pub const DEFAULT_INDEX: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <title>Rollcall</title>
  <style>
    body{font-family:system-ui,sans-serif;margin:2rem;}
    code{background:#f4f4f4;padding:.2rem .4rem;border-radius:4px}
  </style>
</head>
<body>
  <h1>Rollcall</h1>
  <p>This page is served by a tiny HTTP server built on plain TCP sockets.</p>
  <ul>
    <li>GET <code>/document.pdf</code> to download the PDF</li>
    <li>GET <code>/wow.jpg</code> to download the picture</li>
    <li>POST <code>/attendance</code> with <code>ID</code> and <code>Name</code> to record attendance</li>
  </ul>
</body>
</html>
"#;


//------------ IndexPage -----------------------------------------------------

/// Serves the index page at `/` and `/index.html`.
///
/// The page is kept in memory for the lifetime of the server.
#[derive(Clone, Debug)]
pub struct IndexPage {
    content: Bytes,
}

impl IndexPage {
    pub fn new(content: impl Into<Bytes>) -> Self {
        IndexPage { content: content.into() }
    }

    /// Creates the page from the configuration.
    ///
    /// If a page file is configured, it is read once right here.
    pub fn from_config(config: &Config) -> Result<Self, Failed> {
        match config.index_page.as_ref() {
            Some(path) => match fs::read(path) {
                Ok(content) => Ok(Self::new(content)),
                Err(err) => {
                    error!(
                        "Failed to read index page {}: {}",
                        path.display(), err
                    );
                    Err(Failed)
                }
            }
            None => Ok(Self::default())
        }
    }

    pub fn handle_get(&self, req: Request) -> Result<Response, Request> {
        if req.is_get("/") || req.is_get("/index.html") {
            Ok(
                ResponseBuilder::ok()
                    .content_type(ContentType::HTML)
                    .body(self.content.clone())
            )
        }
        else {
            Err(req)
        }
    }
}

impl Default for IndexPage {
    fn default() -> Self {
        Self::new(DEFAULT_INDEX)
    }
}
