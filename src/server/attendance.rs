//! Recording attendance.
//!
//! Students submit their ID and name as a URL-encoded form to
//! `/attendance`. Every submission is appended as one line to a CSV file:
//!
//! ```text
//! 2024-03-07T09:05:01,192.0.2.7:51234,123,Alice
//! ```
//!
//! The columns are the local time of the submission, the address and port
//! of the client, the ID, and the name. Values are written as submitted,
//! there is no quoting.

use std::{fmt, fs, io};
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use log::{error, info};
use crate::http::request::Request;
use crate::http::response::{ContentType, Response, ResponseBuilder};
use crate::utils::date::format_local_iso_date;


//------------ Constants -----------------------------------------------------

/// The path attendance is submitted to.
const PATH: &str = "/attendance";

/// The body of the response for a successful submission.
pub const CONFIRMATION: &str = "Attendance recorded successfully!";


//------------ AttendanceRecord ----------------------------------------------

/// A single submission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttendanceRecord {
    pub timestamp: DateTime<Local>,
    pub peer: SocketAddr,
    pub id: String,
    pub name: String,
}

impl AttendanceRecord {
    /// Creates a record from a URL-encoded form.
    ///
    /// The ID is taken from the `ID` field or, if that is missing, the `id`
    /// field. Likewise, the name is taken from `Name` or `name`. Fields with
    /// an empty value count as missing. If a field appears more than once,
    /// the first value is used. A missing value becomes an empty string.
    pub fn from_form(
        form: &[u8], peer: SocketAddr, timestamp: DateTime<Local>
    ) -> Self {
        let mut upper_id = None;
        let mut lower_id = None;
        let mut upper_name = None;
        let mut lower_name = None;
        for (key, value) in form_urlencoded::parse(form) {
            if value.is_empty() {
                continue
            }
            let slot = match &*key {
                "ID" => &mut upper_id,
                "id" => &mut lower_id,
                "Name" => &mut upper_name,
                "name" => &mut lower_name,
                _ => continue
            };
            if slot.is_none() {
                *slot = Some(value.into_owned())
            }
        }
        AttendanceRecord {
            timestamp,
            peer,
            id: upper_id.or(lower_id).unwrap_or_default(),
            name: upper_name.or(lower_name).unwrap_or_default(),
        }
    }
}

impl fmt::Display for AttendanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "{},{}:{},{},{}",
            format_local_iso_date(self.timestamp),
            self.peer.ip(), self.peer.port(),
            self.id, self.name
        )
    }
}


//------------ AttendanceLog -------------------------------------------------

/// The append-only file attendance is recorded in.
///
/// The file is opened for each record and closed again right after. Each
/// record is written with a single call, so concurrent writers may
/// interleave whole lines but never parts of them. There is no lock.
#[derive(Clone, Debug)]
pub struct AttendanceLog {
    path: PathBuf,
}

impl AttendanceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AttendanceLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record to the log.
    ///
    /// Creates the directory of the log file if necessary.
    pub async fn append(
        &self, record: &AttendanceRecord
    ) -> Result<(), io::Error> {
        let path = self.path.clone();
        let line = format!("{}\n", record);
        tokio::task::spawn_blocking(move || {
            Self::append_line(&path, line.as_bytes())
        }).await.map_err(io::Error::other)?
    }

    fn append_line(path: &Path, line: &[u8]) -> Result<(), io::Error> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::OpenOptions::new()
            .create(true).append(true).open(path)?
            .write_all(line)
    }

    pub async fn handle_post(
        &self, req: Request, peer: SocketAddr
    ) -> Result<Response, Request> {
        if !req.is_post(PATH) {
            return Err(req)
        }
        let body = match req.declared_body() {
            Some(body) => body,
            None => {
                error!(
                    "Invalid Content-Length in attendance from {}: {}",
                    peer,
                    req.headers().get("content-length").unwrap_or_default()
                );
                return Ok(Response::server_error())
            }
        };
        let record = AttendanceRecord::from_form(&body, peer, Local::now());
        if let Err(err) = self.append(&record).await {
            error!(
                "Failed to write attendance log {}: {}",
                self.path.display(), err
            );
            return Ok(Response::server_error())
        }
        info!("Attendance recorded: {}", record);
        Ok(
            ResponseBuilder::ok()
                .content_type(ContentType::TEXT)
                .body(CONFIRMATION)
        )
    }
}


//============ Tests =========================================================
