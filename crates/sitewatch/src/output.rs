//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output` (or the config
//! file's `output`). Table uses `tabled`, structured formats use serde,
//! plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use clap::ValueEnum;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use sitewatch_config::Config;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Format & color resolution ────────────────────────────────────────

/// `--output` if given, else the config file's `output`, else table.
pub fn resolve_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&config.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Days-remaining text, colored by urgency.
pub fn paint_days(days: Option<i64>, warn_within: i64, color: bool) -> String {
    let Some(days) = days else {
        return "-".into();
    };
    let text = days.to_string();
    if !color {
        return text;
    }
    if days < 0 {
        text.red().bold().to_string()
    } else if days <= warn_within {
        text.yellow().to_string()
    } else {
        text.green().to_string()
    }
}

/// Latency as a short human duration, e.g. `42ms` or `1s 250ms`.
pub fn format_latency(ms: Option<u64>) -> String {
    ms.map_or_else(
        || "-".into(),
        |ms| humantime::format_duration(Duration::from_millis(ms)).to_string(),
    )
}

pub fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use
/// the `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render {
        format: "JSON",
        reason: e.to_string(),
    })
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render {
        format: "YAML",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_without_color() {
        assert_eq!(paint_days(Some(30), 14, false), "30");
        assert_eq!(paint_days(Some(-2), 14, false), "-2");
        assert_eq!(paint_days(None, 14, true), "-");
    }

    #[test]
    fn days_with_color_keep_value() {
        let painted = paint_days(Some(3), 14, true);
        assert!(painted.contains('3'));
        assert_ne!(painted, "3");
    }

    #[test]
    fn config_output_names_resolve() {
        for name in sitewatch_config::OUTPUT_FORMATS {
            assert!(OutputFormat::from_str(name, true).is_ok(), "{name}");
        }
        let config = Config {
            output: "plain".into(),
            ..Config::default()
        };
        let global = GlobalOpts {
            config: None,
            output: None,
            color: ColorMode::Never,
            verbose: 0,
            log_format: crate::cli::LogFormat::Text,
            quiet: false,
        };
        assert_eq!(resolve_format(&global, &config), OutputFormat::Plain);
        let config = Config {
            output: "json-compact".into(),
            ..Config::default()
        };
        assert_eq!(resolve_format(&global, &config), OutputFormat::JsonCompact);
    }

    #[test]
    fn latency_is_humanized() {
        assert_eq!(format_latency(Some(42)), "42ms");
        assert_eq!(format_latency(Some(1250)), "1s 250ms");
        assert_eq!(format_latency(None), "-");
    }
}
