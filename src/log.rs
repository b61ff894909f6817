//! Logging.
//!
//! Both binaries log through the `log` crate. [`Logger::init`] installs a
//! global logger that sends warnings and errors to stderr. Once the
//! configuration is known, [`Logger::switch_logging`] replaces it with the
//! configured target and level. The switch can only happen once per
//! process.

use std::{fs, io, process};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use chrono::Local;
use log::{Level, LevelFilter, Record, error};
use crate::config::LogTarget;
use crate::error::Failed;
use crate::utils::date::format_local_iso_date;


//------------ Logger --------------------------------------------------------

/// The configured logger.
pub struct Logger {
    /// Where messages go.
    backend: Mutex<Backend>,

    /// The most verbose level that is logged.
    level: LevelFilter,
}

impl Logger {
    /// Installs the global logger.
    ///
    /// This should happen first thing in `main`. Until logging is switched,
    /// only warnings and errors are shown and they all go to stderr.
    pub fn init() -> Result<(), Failed> {
        if let Err(err) = log::set_logger(&GLOBAL_LOGGER) {
            eprintln!("Failed to initialize logger: {err}.\nAborting.");
            return Err(Failed)
        }
        log::set_max_level(LevelFilter::Warn);
        Ok(())
    }

    /// Switches logging to the given level and target.
    ///
    /// If `timestamp` is `true`, lines written to stderr start with the
    /// local time. Lines written to a file always do.
    pub fn switch_logging(
        level: LevelFilter,
        target: &LogTarget,
        timestamp: bool,
    ) -> Result<(), Failed> {
        let logger = Self::new(level, target, timestamp)?;
        if GLOBAL_LOGGER.inner.set(logger).is_err() {
            error!("Logging has already been configured.");
            return Err(Failed)
        }
        log::set_max_level(level);
        Ok(())
    }

    fn new(
        level: LevelFilter,
        target: &LogTarget,
        timestamp: bool,
    ) -> Result<Self, Failed> {
        let backend = match *target {
            LogTarget::Stderr => Backend::Stderr { timestamp },
            LogTarget::File(ref path) => Backend::open(path)?,
        };
        Ok(Logger { backend: Mutex::new(backend), level })
    }

    /// Locks the backend.
    ///
    /// A panic elsewhere while holding the lock doesn’t stop logging.
    fn backend(&self) -> MutexGuard<Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes a record.
    ///
    /// If writing to a log file fails, there is no way to report anything
    /// anymore, so the process exits.
    fn log(&self, record: &Record) {
        if self.is_noise(record) {
            return
        }
        let mut backend = self.backend();
        if let Err(err) = backend.write(record) {
            if let Backend::File { ref path, .. } = *backend {
                eprintln!(
                    "Logging to file {} failed: {}. Exiting.",
                    path.display(), err
                );
            }
            process::exit(1)
        }
    }

    fn flush(&self) {
        self.backend().flush()
    }

    /// Returns whether a record comes from a dependency and is too chatty.
    ///
    /// The runtime’s own debug output is only shown at trace level.
    fn is_noise(&self, record: &Record) -> bool {
        if self.level >= LevelFilter::Trace || record.level() <= Level::Info {
            return false
        }
        match record.module_path() {
            Some(module) => {
                module.starts_with("tokio") || module.starts_with("mio")
            }
            None => false
        }
    }
}


//------------ Backend -------------------------------------------------------

/// The place log lines are written to.
enum Backend {
    /// An append-only log file.
    File {
        file: fs::File,
        path: PathBuf,
    },

    /// Standard error, possibly with a timestamp on every line.
    Stderr {
        timestamp: bool,
    }
}

impl Backend {
    /// Opens a log file for appending, creating it if necessary.
    fn open(path: &Path) -> Result<Self, Failed> {
        match fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Ok(Backend::File { file, path: path.into() }),
            Err(err) => {
                Err(Failed::io(
                    format_args!("Failed to open log file {}", path.display()),
                    err
                ))
            }
        }
    }

    /// Writes a single line for `record`.
    ///
    /// Failing to write to stderr is ignored.
    fn write(&mut self, record: &Record) -> Result<(), io::Error> {
        match *self {
            Backend::File { ref mut file, .. } => {
                writeln!(
                    file, "[{}] [{}] {}",
                    format_local_iso_date(Local::now()),
                    record.level(), record.args()
                )
            }
            Backend::Stderr { timestamp } => {
                let mut stderr = io::stderr().lock();
                if timestamp {
                    let _ = write!(
                        stderr, "[{}] ", format_local_iso_date(Local::now())
                    );
                }
                let _ = writeln!(
                    stderr, "[{}] {}", record.level(), record.args()
                );
                Ok(())
            }
        }
    }

    fn flush(&mut self) {
        match *self {
            Backend::File { ref mut file, .. } => {
                let _ = file.flush();
            }
            Backend::Stderr { .. } => {
                let _ = io::stderr().lock().flush();
            }
        }
    }
}


//------------ GlobalLogger --------------------------------------------------

/// The logger handed to the `log` crate.
///
/// It forwards to the configured [`Logger`] once there is one and writes
/// straight to stderr before that.
struct GlobalLogger {
    inner: OnceLock<Logger>,
}

static GLOBAL_LOGGER: GlobalLogger = GlobalLogger { inner: OnceLock::new() };

impl log::Log for GlobalLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        match self.inner.get() {
            Some(logger) => logger.log(record),
            None => {
                let _ = writeln!(
                    io::stderr().lock(), "[{}] {}",
                    record.level(), record.args()
                );
            }
        }
    }

    fn flush(&self) {
        if let Some(logger) = self.inner.get() {
            logger.flush()
        }
    }
}


//============ Tests =========================================================
