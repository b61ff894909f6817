//! Rules on how to dispatch a request.
//!
//! Requests are matched against a fixed set of method and path pairs. Paths
//! are compared literally, so `/index.html?x=1` is not the index page.
//!
//! | method | path                 | handler                   |
//! |--------|----------------------|---------------------------|
//! | GET    | `/`, `/index.html`   | [`IndexPage`]             |
//! | GET    | `/document.pdf`      | [`StaticFiles`]           |
//! | GET    | `/wow.jpg`           | [`StaticFiles`]           |
//! | POST   | `/attendance`        | [`AttendanceLog`]         |
//!
//! Everything else gets a 404 response naming the path.

use std::net::SocketAddr;
use crate::config::Config;
use crate::error::Failed;
use crate::http::request::Request;
use crate::http::response::Response;
use super::attendance::AttendanceLog;
use super::files::StaticFiles;
use super::pages::IndexPage;


//------------ State ---------------------------------------------------------

/// Everything the handlers need.
///
/// A single value is shared by all connections. Nothing in here changes
/// after the server has been started.
#[derive(Clone, Debug)]
pub struct State {
    index: IndexPage,
    files: StaticFiles,
    attendance: AttendanceLog,
}

impl State {
    pub fn new(
        index: IndexPage,
        files: StaticFiles,
        attendance: AttendanceLog,
    ) -> Self {
        State { index, files, attendance }
    }

    pub fn from_config(config: &Config) -> Result<Self, Failed> {
        Ok(Self::new(
            IndexPage::from_config(config)?,
            StaticFiles::new(config.files_dir.clone()),
            AttendanceLog::new(config.attendance_log.clone()),
        ))
    }

    /// Produces the response for a request.
    ///
    /// If the request couldn’t be parsed, `req` is `None`. It then matches
    /// no handler and gets the same response as an unknown path.
    pub async fn handle_request(
        &self, req: Option<Request>, peer: SocketAddr
    ) -> Response {
        let req = match req {
            Some(req) => req,
            None => return not_handled("(unparsable)")
        };

        let req = match self.index.handle_get(req) {
            Ok(response) => return response,
            Err(req) => req
        };
        let req = match self.files.handle_get(req).await {
            Ok(response) => return response,
            Err(req) => req
        };
        let req = match self.attendance.handle_post(req, peer).await {
            Ok(response) => return response,
            Err(req) => req
        };

        not_handled(req.path())
    }
}

/// The response for a request no handler accepted.
fn not_handled(path: &str) -> Response {
    Response::not_found(format_args!("Path {} not handled", path))
}


//============ Tests =========================================================
