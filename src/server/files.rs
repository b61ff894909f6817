//! Serving the static files.

use std::io;
use std::path::PathBuf;
use log::error;
use crate::http::request::Request;
use crate::http::response::{ContentType, Response, ResponseBuilder};


//------------ FILES ---------------------------------------------------------

/// The files we serve: request path, file name, and content type.
const FILES: &[(&str, &str, ContentType)] = &[
    ("/document.pdf", "document.pdf", ContentType::PDF),
    ("/wow.jpg", "wow.jpg", ContentType::JPEG),
];


//------------ StaticFiles ---------------------------------------------------

/// Serves a fixed set of files from a directory.
///
/// Files are read in full for every request. There is no caching and no
/// support for ranges.
#[derive(Clone, Debug)]
pub struct StaticFiles {
    dir: PathBuf,
}

impl StaticFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        StaticFiles { dir: dir.into() }
    }

    pub async fn handle_get(&self, req: Request) -> Result<Response, Request> {
        let (name, content_type) = match FILES.iter().find(|(path, _, _)| {
            req.is_get(path)
        }) {
            Some((_, name, content_type)) => (name, *content_type),
            None => return Err(req)
        };
        let path = self.dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(data) => {
                Ok(
                    ResponseBuilder::ok()
                        .content_type(content_type)
                        .body(data)
                )
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Ok(Response::not_found(format!("File {} not found", name)))
            }
            Err(err) => {
                error!("Failed to read {}: {}", path.display(), err);
                Ok(Response::server_error())
            }
        }
    }
}
