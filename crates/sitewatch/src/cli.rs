//! Clap derive structures for the `sitewatch` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sitewatch -- vhost discovery and certificate/reachability checks
#[derive(Debug, Parser)]
#[command(
    name = "sitewatch",
    version,
    about = "Discover web server vhosts and check their TLS certificates and reachability",
    long_about = "Finds every site defined on this host (standard sites-enabled/\n\
        sites-available layout plus hosting-panel generated configs), then\n\
        checks each one's certificate expiry and HTTP reachability in small,\n\
        throttled batches.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, short = 'C', env = "SITEWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output, Color & Log Enums ────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full cycle: discover, dedupe, check every site
    Scan(ScanArgs),

    /// List discovered sites without touching the network
    #[command(alias = "ls")]
    Discover(DiscoverArgs),

    /// Probe a single site's HTTP reachability
    Probe(ProbeArgs),

    /// Read a certificate's expiry from a file or a live handshake
    Cert(CertArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Command Arguments ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Sites checked concurrently per batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause between batches, in milliseconds
    #[arg(long)]
    pub pause_ms: Option<u64>,

    /// Exit non-zero if any certificate has expired
    #[arg(long)]
    pub fail_on_expired: bool,
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Show every parsed definition, before deduplication
    #[arg(long, short = 'a')]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Domain or address to probe
    pub domain: String,

    /// Port (defaults to 443 with --tls, 80 otherwise)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Use HTTPS
    #[arg(long)]
    pub tls: bool,

    /// Request timeout in seconds (overrides the config file)
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Args)]
pub struct CertArgs {
    /// Domain to handshake with, or a path to a PEM certificate file
    pub target: String,

    /// Port for the handshake
    #[arg(long, short = 'p', default_value = "443")]
    pub port: u16,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file populated with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
