//! Config subcommand handlers.

use std::path::PathBuf;

use sitewatch_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

fn target_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config(global.config.as_deref())?;
            // Surface validation problems here too, not just on scan.
            cfg.to_monitor_config()?;

            let format = output::resolve_format(global, &cfg);
            let out = if format == OutputFormat::Table {
                toml::to_string_pretty(&cfg).map_err(|e| CliError::Render {
                    format: "TOML",
                    reason: e.to_string(),
                })?
            } else {
                output::render_single(format, &cfg, |_| String::new(), |_| {
                    target_path(global).display().to_string()
                })?
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&target_path(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = target_path(global);
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists; pass --force to overwrite", path.display()),
                });
            }
            let written = config::save_config(&Config::default(), Some(&path))?;
            if !global.quiet {
                eprintln!("Wrote default config to {}", written.display());
            }
            Ok(())
        }
    }
}
