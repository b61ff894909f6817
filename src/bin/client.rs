//! The Rollcall client binary.

use std::env::current_dir;
use std::process::exit;
use clap::{Command, crate_authors, crate_version};
use rollcall::{Client, ClientConfig, ExitError, Failed, Logger};

fn _main() -> Result<(), ExitError> {
    Logger::init()?;
    let cur_dir = current_dir().map_err(|err| {
        Failed::io("Fatal: cannot determine current directory", err)
    })?;
    let matches = ClientConfig::config_args(
        Command::new("rollcall-client")
            .version(crate_version!())
            .author(crate_authors!())
            .about("sends a single HTTP request to a Rollcall server")
    ).get_matches();
    let config = ClientConfig::from_arg_matches(&matches, &cur_dir)?;
    Logger::switch_logging(config.log_level, &config.log_target, false)?;
    Client::new(config).run().map_err(Into::into)
}

fn main() {
    if let Err(err) = _main() {
        exit(err.exit_code())
    }
}
