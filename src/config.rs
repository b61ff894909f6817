//! Configuration.
//!
//! The server reads its [`Config`] from an optional TOML file and then lets
//! command line options override it. The client asks for almost everything
//! interactively, so its [`ClientConfig`] only comes from the command line.

use std::{fmt, fs, io};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use clap::{Command, Args, ArgAction, ArgMatches, FromArgMatches};
use dirs::home_dir;
use log::{LevelFilter, error};
use crate::error::Failed;


//------------ Defaults for Some Values --------------------------------------

/// The default port for both server and client.
pub const DEFAULT_PORT: u16 = 8080;

/// The default address to listen on.
const DEFAULT_LISTEN: SocketAddr = SocketAddr::new(
    IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT
);

/// The default timeout for a single read from a client connection.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// The default location of the attendance log relative to the work dir.
const DEFAULT_ATTENDANCE_LOG: &str = "data/attendance.csv";

/// The name of the config file looked for in the home directory.
const HOME_CONFIG_FILE: &str = ".rollcall.conf";


//------------ Config --------------------------------------------------------

/// Server configuration.
///
/// Use [`config_args`](#method.config_args) to register the options with
/// clap and [`from_arg_matches`](#method.from_arg_matches) to turn the
/// result into a config.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The address to listen on for HTTP connections.
    pub listen: SocketAddr,

    /// How long to wait for each chunk of a request.
    ///
    /// When a read times out, whatever has arrived so far is treated as
    /// the complete request.
    pub read_timeout: Duration,

    /// The directory the static files are served from.
    pub files_dir: PathBuf,

    /// The path of the attendance log file.
    pub attendance_log: PathBuf,

    /// An HTML file to serve instead of the built-in index page.
    pub index_page: Option<PathBuf>,

    /// The most verbose level that is logged.
    pub log_level: LevelFilter,

    /// Where log output goes.
    pub log_target: LogTarget,
}

impl Config {
    pub fn config_args(app: Command) -> Command {
        ServerArgs::augment_args(app)
    }

    /// Creates the configuration from parsed command line options.
    ///
    /// The base is the file named by `--config`. Without that option it is
    /// `$HOME/.rollcall.conf` if that exists or the defaults otherwise.
    /// Relative paths on the command line are taken relative to `cur_dir`,
    /// those in a config file relative to the file.
    pub fn from_arg_matches(
        matches: &ArgMatches,
        cur_dir: &Path,
    ) -> Result<Self, Failed> {
        let args = ServerArgs::from_arg_matches(
            matches
        ).expect("bug in command line arguments parser");
        let mut res = match args.config {
            Some(ref path) => {
                let path = cur_dir.join(path);
                match ConfigFile::read(&path)? {
                    Some(file) => Self::from_config_file(file)?,
                    None => {
                        error!("Config file {} not found.", path.display());
                        return Err(Failed)
                    }
                }
            }
            None => Self::from_home_dir()?,
        };
        res.apply_args(args, cur_dir);
        Ok(res)
    }

    /// Overrides values with those given on the command line.
    fn apply_args(&mut self, args: ServerArgs, cur_dir: &Path) {
        if let Some(addr) = args.listen {
            self.listen = addr
        }
        if let Some(secs) = args.read_timeout {
            self.read_timeout = Duration::from_secs(secs)
        }
        if let Some(dir) = args.files_dir {
            self.files_dir = cur_dir.join(dir)
        }
        if let Some(path) = args.attendance_log {
            self.attendance_log = cur_dir.join(path)
        }
        if let Some(path) = args.index_page {
            self.index_page = Some(cur_dir.join(path))
        }
        match args.logfile.as_deref() {
            Some("-") => self.log_target = LogTarget::Stderr,
            Some(file) => {
                self.log_target = LogTarget::File(cur_dir.join(file))
            }
            None => { }
        }
        self.log_level = args.verbosity.apply(self.log_level);
    }

    /// Uses the config file in the home directory if there is one.
    fn from_home_dir() -> Result<Self, Failed> {
        let path = match home_dir() {
            Some(dir) => dir.join(HOME_CONFIG_FILE),
            None => return Ok(Self::default()),
        };
        match ConfigFile::read(&path)? {
            Some(file) => Self::from_config_file(file),
            None => Ok(Self::default()),
        }
    }

    /// Creates a config from the content of a config file.
    ///
    /// Every key must be known. Missing keys get their default values.
    fn from_config_file(mut file: ConfigFile) -> Result<Self, Failed> {
        let default = Self::default();
        let log_target = Self::log_target_from_config_file(&mut file)?;
        let res = Config {
            listen: file.take_from_str("listen")?.unwrap_or(default.listen),
            read_timeout: {
                file.take_u64("read-timeout")?
                    .map(Duration::from_secs)
                    .unwrap_or(default.read_timeout)
            },
            files_dir: {
                file.take_path("files-dir")?.unwrap_or(default.files_dir)
            },
            attendance_log: {
                file.take_path("attendance-log")?
                    .unwrap_or(default.attendance_log)
            },
            index_page: file.take_path("index-page")?,
            log_level: {
                file.take_from_str("log-level")?.unwrap_or(default.log_level)
            },
            log_target,
        };
        file.check_exhausted()?;
        Ok(res)
    }

    /// Combines the `log` and `log-file` keys into a log target.
    fn log_target_from_config_file(
        file: &mut ConfigFile
    ) -> Result<LogTarget, Failed> {
        let target = file.take_string("log")?;
        let log_file = file.take_path("log-file")?;
        match (target.as_deref(), log_file) {
            (None, _) | (Some("stderr"), _) => Ok(LogTarget::Stderr),
            (Some("file"), Some(path)) => Ok(LogTarget::File(path)),
            (Some("file"), None) => {
                file.complain(format_args!(
                    "log target 'file' needs a 'log-file' value"
                ))
            }
            (Some(other), _) => {
                file.complain(format_args!("unknown log target '{}'", other))
            }
        }
    }
}


//--- Default

impl Default for Config {
    fn default() -> Self {
        Config {
            listen: DEFAULT_LISTEN,
            read_timeout: DEFAULT_READ_TIMEOUT,
            files_dir: PathBuf::from("."),
            attendance_log: PathBuf::from(DEFAULT_ATTENDANCE_LOG),
            index_page: None,
            log_level: LevelFilter::Info,
            log_target: LogTarget::default(),
        }
    }
}


//------------ ClientConfig --------------------------------------------------

/// Client configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    /// The port to connect to on the server.
    pub port: u16,

    /// The directory received files are written to.
    pub output_dir: PathBuf,

    /// Whether to try opening a received page in a browser.
    pub open_browser: bool,

    /// The most verbose level that is logged.
    pub log_level: LevelFilter,

    /// Where log output goes.
    pub log_target: LogTarget,
}

impl ClientConfig {
    /// Adds the client arguments to a clap command.
    pub fn config_args(app: Command) -> Command {
        ClientArgs::augment_args(app)
    }

    /// Creates a configuration from command line matches.
    pub fn from_arg_matches(
        matches: &ArgMatches,
        cur_dir: &Path,
    ) -> Result<Self, Failed> {
        let args = ClientArgs::from_arg_matches(
            matches
        ).expect("bug in command line arguments parser");
        let mut res = Self::default();
        if let Some(port) = args.port {
            res.port = port
        }
        if let Some(dir) = args.output_dir {
            res.output_dir = cur_dir.join(dir)
        }
        if args.no_browser {
            res.open_browser = false
        }
        res.log_level = args.verbosity.apply(res.log_level);
        Ok(res)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            port: DEFAULT_PORT,
            output_dir: PathBuf::from("."),
            open_browser: true,
            log_level: LevelFilter::Warn,
            log_target: LogTarget::Stderr,
        }
    }
}


//------------ LogTarget -----------------------------------------------------

/// Where log output goes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum LogTarget {
    /// Standard error.
    #[default]
    Stderr,

    /// A file that lines are appended to.
    File(PathBuf)
}


//------------ ServerArgs ----------------------------------------------------

/// The command line arguments of the server.
#[derive(Clone, Debug, Args)]
struct ServerArgs {
    /// Config file to start from
    #[arg(short, long, value_name="PATH")]
    config: Option<PathBuf>,

    /// Listen on this address for HTTP connections
    #[arg(short, long, value_name = "ADDR:PORT")]
    listen: Option<SocketAddr>,

    /// Seconds to wait for each chunk of a request
    #[arg(long, value_name = "SECONDS")]
    read_timeout: Option<u64>,

    /// Directory to serve the static files from
    #[arg(long, value_name = "PATH")]
    files_dir: Option<PathBuf>,

    /// File to append attendance records to
    #[arg(long, value_name = "PATH")]
    attendance_log: Option<PathBuf>,

    /// HTML file to serve as the index page
    #[arg(long, value_name = "PATH")]
    index_page: Option<PathBuf>,

    #[command(flatten)]
    verbosity: VerbosityArgs,

    /// Log to this file, '-' for stderr
    #[arg(long, value_name = "PATH")]
    logfile: Option<String>,
}


//------------ ClientArgs ----------------------------------------------------

/// The command line arguments of the client.
#[derive(Clone, Debug, Args)]
struct ClientArgs {
    /// Port of the server to connect to
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Directory to write received files to
    #[arg(short, long, value_name = "PATH")]
    output_dir: Option<PathBuf>,

    /// Don’t open a received page in a browser
    #[arg(long)]
    no_browser: bool,

    #[command(flatten)]
    verbosity: VerbosityArgs,
}


//------------ VerbosityArgs -------------------------------------------------

#[derive(Clone, Debug, Args)]
struct VerbosityArgs {
    /// Log more, repeat for even more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Log less, repeat for even less
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

impl VerbosityArgs {
    /// Moves `level` up or down according to the flags.
    fn apply(&self, level: LevelFilter) -> LevelFilter {
        const LEVELS: [LevelFilter; 6] = [
            LevelFilter::Off, LevelFilter::Error, LevelFilter::Warn,
            LevelFilter::Info, LevelFilter::Debug, LevelFilter::Trace,
        ];
        let current = level as usize;
        let index = if self.verbose > 0 {
            current.saturating_add(self.verbose.into())
        }
        else {
            current.saturating_sub(self.quiet.into())
        };
        LEVELS[index.min(LEVELS.len() - 1)]
    }
}


//------------ ConfigFile ----------------------------------------------------

/// A parsed config file.
///
/// Values are removed as they are taken so that leftover keys can be
/// reported as unknown.
#[derive(Clone, Debug)]
struct ConfigFile {
    content: toml::value::Table,

    /// Where the file lives, for error messages.
    path: PathBuf,

    /// The directory relative paths in the file are based on.
    dir: PathBuf,
}

impl ConfigFile {
    /// Reads and parses the file at `path`.
    ///
    /// A file that doesn’t exist results in `Ok(None)`.
    fn read(path: &Path) -> Result<Option<Self>, Failed> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(Failed::io(
                    format_args!("Cannot read config file {}", path.display()),
                    err
                ))
            }
        }
    }

    fn parse(content: &str, path: &Path) -> Result<Self, Failed> {
        let content = match toml::from_str(content) {
            Ok(toml::Value::Table(content)) => content,
            Ok(_) => {
                error!(
                    "Config file {} doesn’t contain a table.", path.display()
                );
                return Err(Failed)
            }
            Err(err) => {
                error!("Cannot parse config file {}: {}", path.display(), err);
                return Err(Failed)
            }
        };
        let path = if path.is_relative() {
            let cur_dir = std::env::current_dir().map_err(|err| {
                Failed::io("Cannot determine current directory", err)
            })?;
            cur_dir.join(path)
        }
        else {
            path.to_path_buf()
        };
        let dir = match path.parent() {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("/"),
        };
        Ok(ConfigFile { content, path, dir })
    }

    /// Logs a problem with the file and fails.
    fn complain<T>(&self, msg: fmt::Arguments) -> Result<T, Failed> {
        error!("Config file {}: {}.", self.path.display(), msg);
        Err(Failed)
    }

    /// Removes `key` and converts its value.
    ///
    /// `convert` returns `None` if the value has the wrong type in which
    /// case the key is reported as not being `expected`.
    fn take<T>(
        &mut self,
        key: &str,
        expected: &str,
        convert: impl FnOnce(toml::Value) -> Option<T>,
    ) -> Result<Option<T>, Failed> {
        match self.content.remove(key).map(convert) {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                self.complain(format_args!("'{}' must be {}", key, expected))
            }
            None => Ok(None),
        }
    }

    fn take_u64(&mut self, key: &str) -> Result<Option<u64>, Failed> {
        self.take(key, "a non-negative integer", |value| {
            value.as_integer().and_then(|value| u64::try_from(value).ok())
        })
    }

    fn take_string(&mut self, key: &str) -> Result<Option<String>, Failed> {
        self.take(key, "a string", |value| match value {
            toml::Value::String(value) => Some(value),
            _ => None
        })
    }

    /// Takes a string and parses it into a `T`.
    fn take_from_str<T>(&mut self, key: &str) -> Result<Option<T>, Failed>
    where T: FromStr, T::Err: fmt::Display {
        match self.take_string(key)? {
            Some(value) => match value.parse() {
                Ok(value) => Ok(Some(value)),
                Err(err) => {
                    self.complain(format_args!(
                        "invalid value for '{}': {}", key, err
                    ))
                }
            }
            None => Ok(None)
        }
    }

    /// Takes a path. Relative paths are based on the file’s directory.
    fn take_path(&mut self, key: &str) -> Result<Option<PathBuf>, Failed> {
        Ok(self.take_string(key)?.map(|path| self.dir.join(path)))
    }

    /// Fails if there are any keys left.
    fn check_exhausted(&self) -> Result<(), Failed> {
        if self.content.is_empty() {
            return Ok(())
        }
        let keys: Vec<_> = self.content.keys().map(String::as_str).collect();
        self.complain(format_args!("unknown settings {}", keys.join(", ")))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn process_server_args(args: &[&str]) -> Config {
        let mut config = Config::default();
        let matches = Config::config_args(
            Command::new("rollcall-server")
        ).get_matches_from(args);
        let args = ServerArgs::from_arg_matches(&matches).unwrap();
        config.apply_args(args, Path::new("/test"));
        config
    }

    fn process_client_args(args: &[&str]) -> ClientConfig {
        let matches = ClientConfig::config_args(
            Command::new("rollcall-client")
        ).get_matches_from(args);
        ClientConfig::from_arg_matches(&matches, Path::new("/test")).unwrap()
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.listen, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.read_timeout, Duration::from_secs(1));
        assert_eq!(config.files_dir, Path::new("."));
        assert_eq!(config.attendance_log, Path::new("data/attendance.csv"));
        assert_eq!(config.index_page, None);
        assert_eq!(config.log_target, LogTarget::Stderr);
    }

    #[test]
    fn server_args() {
        let config = process_server_args(&[
            "rollcall-server", "--listen", "127.0.0.1:9090",
            "--read-timeout", "3", "--files-dir", "static",
            "--attendance-log", "/var/lib/rollcall/log.csv",
            "--index-page", "index.html", "--logfile", "server.log", "-v",
        ]);
        assert_eq!(config.listen, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(config.read_timeout, Duration::from_secs(3));
        assert_eq!(config.files_dir, Path::new("/test/static"));
        assert_eq!(
            config.attendance_log, Path::new("/var/lib/rollcall/log.csv")
        );
        assert_eq!(
            config.index_page.as_deref(), Some(Path::new("/test/index.html"))
        );
        assert_eq!(
            config.log_target, LogTarget::File("/test/server.log".into())
        );
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn verbosity() {
        assert_eq!(
            process_server_args(&["rollcall-server", "-qq"]).log_level,
            LevelFilter::Error
        );
        assert_eq!(
            process_server_args(&["rollcall-server", "-vvvv"]).log_level,
            LevelFilter::Trace
        );
        assert_eq!(
            process_server_args(&["rollcall-server", "-qqqqq"]).log_level,
            LevelFilter::Off
        );
    }

    #[test]
    fn client_args() {
        let config = process_client_args(&["rollcall-client"]);
        assert_eq!(config, ClientConfig::default());

        let config = process_client_args(&[
            "rollcall-client", "--port", "8000", "--output-dir", "out",
            "--no-browser",
        ]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.output_dir, Path::new("/test/out"));
        assert!(!config.open_browser);
    }

    #[test]
    fn config_file() {
        let file = ConfigFile::parse(
            "listen = \"127.0.0.1:8181\"\n\
             read-timeout = 5\n\
             files-dir = \"public\"\n\
             attendance-log = \"/srv/attendance.csv\"\n\
             log-level = \"debug\"\n\
             log = \"file\"\n\
             log-file = \"rollcall.log\"\n",
            Path::new("/etc/rollcall/rollcall.conf")
        ).unwrap();
        let config = Config::from_config_file(file).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8181".parse().unwrap());
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert_eq!(config.files_dir, Path::new("/etc/rollcall/public"));
        assert_eq!(config.attendance_log, Path::new("/srv/attendance.csv"));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert_eq!(
            config.log_target,
            LogTarget::File("/etc/rollcall/rollcall.log".into())
        );
    }

    #[test]
    fn config_file_rejects_garbage() {
        let file = ConfigFile::parse(
            "listen = \"127.0.0.1:8181\"\nport = 8080\n",
            Path::new("/etc/rollcall.conf")
        ).unwrap();
        assert!(Config::from_config_file(file).is_err());

        let file = ConfigFile::parse(
            "read-timeout = -1\n", Path::new("/etc/rollcall.conf")
        ).unwrap();
        assert!(Config::from_config_file(file).is_err());

        let file = ConfigFile::parse(
            "log = \"file\"\n", Path::new("/etc/rollcall.conf")
        ).unwrap();
        assert!(Config::from_config_file(file).is_err());
    }
}
