//! The Rollcall server binary.

use std::env::current_dir;
use std::process::exit;
use clap::{Command, crate_authors, crate_version};
use rollcall::{Config, ExitError, Failed, Logger, Server};

// Everything worth saying has been logged by the time an error arrives here,
// so `main` only turns it into an exit status.
fn _main() -> Result<(), ExitError> {
    Logger::init()?;
    let cur_dir = current_dir().map_err(|err| {
        Failed::io("Fatal: cannot determine current directory", err)
    })?;
    let matches = Config::config_args(
        Command::new("rollcall-server")
            .version(crate_version!())
            .author(crate_authors!())
            .about("serves class material and records attendance")
    ).get_matches();
    let config = Config::from_arg_matches(&matches, &cur_dir)?;
    Logger::switch_logging(config.log_level, &config.log_target, true)?;
    Server::new(&config)?.run()
}

fn main() {
    if let Err(err) = _main() {
        exit(err.exit_code())
    }
}
