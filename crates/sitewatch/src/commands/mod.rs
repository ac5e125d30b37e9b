//! Command handlers.

pub mod cert;
pub mod config_cmd;
pub mod discover;
pub mod probe;
pub mod scan;

use sitewatch_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command that needs a loaded config.
pub async fn dispatch(cmd: Command, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Scan(args) => scan::handle(config, &args, global).await,
        Command::Discover(args) => discover::handle(config, &args, global).await,
        Command::Probe(args) => probe::handle(config, &args, global).await,
        Command::Cert(args) => cert::handle(config, &args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
