//! Doing something with a received body.
//!
//! What happens with the body depends only on the method and path of the
//! request, never on the status or headers of the response:
//!
//! | method | path                 | action                                  |
//! |--------|----------------------|-----------------------------------------|
//! | GET    | `/`, `/index.html`   | save as `downloaded_page.html`, open it |
//! | GET    | `/document.pdf`      | save as `received.pdf`                  |
//! | GET    | `/wow.jpg`           | save as `wow.jpg`                       |
//! | POST   | `/attendance`        | print the body                          |
//!
//! Everything else is ignored.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use log::{debug, error};
use crate::error::Failed;
use crate::http::Method;


//------------ Action --------------------------------------------------------

/// What to do with a response body.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// Save the body to a file and try to show it in a browser.
    SavePage(&'static str),

    /// Save the body to a file.
    Save(&'static str),

    /// Print the body as the server’s message.
    PrintMessage,

    /// Do nothing.
    Nothing,
}

impl Action {
    pub fn select(method: &Method, path: &str) -> Self {
        match (method, path) {
            (Method::Get, "/") | (Method::Get, "/index.html") => {
                Action::SavePage("downloaded_page.html")
            }
            (Method::Get, "/document.pdf") => Action::Save("received.pdf"),
            (Method::Get, "/wow.jpg") => Action::Save("wow.jpg"),
            (Method::Post, "/attendance") => Action::PrintMessage,
            _ => Action::Nothing,
        }
    }
}


//------------ Output --------------------------------------------------------

/// Where and how bodies are put.
#[derive(Clone, Debug)]
pub struct Output {
    /// The directory files are saved in.
    dir: PathBuf,

    /// Whether to open saved pages in a browser.
    open_browser: bool,
}

impl Output {
    pub fn new(dir: impl Into<PathBuf>, open_browser: bool) -> Self {
        Output { dir: dir.into(), open_browser }
    }

    /// Performs `action` for `body`.
    ///
    /// Messages for the user are written to `out`.
    pub fn process(
        &self, action: Action, body: &[u8], out: &mut impl Write
    ) -> Result<(), Failed> {
        match action {
            Action::SavePage(name) => {
                let path = self.save(name, body, out)?;
                if self.open_browser {
                    open_browser(&path)
                }
            }
            Action::Save(name) => {
                self.save(name, body, out)?;
            }
            Action::PrintMessage => {
                let res = match std::str::from_utf8(body) {
                    Ok(text) => {
                        writeln!(out, "\n--- Server Message ---\n\n{}", text)
                    }
                    Err(_) => {
                        writeln!(
                            out, "\n--- Server Message ---\n\n(binary data)"
                        )
                    }
                };
                res.map_err(|err| Failed::io("Failed to write output", err))?;
            }
            Action::Nothing => { }
        }
        Ok(())
    }

    fn save(
        &self, name: &str, body: &[u8], out: &mut impl Write
    ) -> Result<PathBuf, Failed> {
        let path = self.dir.join(name);
        if let Err(err) = fs::write(&path, body) {
            error!("Failed to write {}: {}", path.display(), err);
            return Err(Failed)
        }
        writeln!(out, "Saved {}", path.display()).map_err(|err| {
            Failed::io("Failed to write output", err)
        })?;
        Ok(path)
    }
}


//------------ open_browser --------------------------------------------------

/// Tries to open a file in the user’s browser.
///
/// Failure is only logged at debug level.
fn open_browser(path: &Path) {
    let path = fs::canonicalize(path).unwrap_or_else(|_| path.into());
    let mut cmd = browser_command();
    cmd.arg(&path).stdin(Stdio::null()).stdout(Stdio::null())
        .stderr(Stdio::null());
    if let Err(err) = cmd.spawn() {
        debug!("Failed to open {} in a browser: {}", path.display(), err);
    }
}

#[cfg(target_os = "macos")]
fn browser_command() -> Command {
    Command::new("open")
}

#[cfg(windows)]
fn browser_command() -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]);
    cmd
}

#[cfg(not(any(target_os = "macos", windows)))]
fn browser_command() -> Command {
    Command::new("xdg-open")
}


//============ Tests =========================================================
