//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Mail Dispatch - personalized bulk email with rotating SMTP credentials
#[derive(Parser, Debug)]
#[command(
    name = "mail-dispatch",
    author,
    version,
    about = "Personalized bulk email dispatch",
    long_about = "Sends one personalized email per recipient row of a sheet, rotating \n\
                  across the configured SMTP credentials, with pacing and \n\
                  pause / resume / stop control."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "MAIL_DISPATCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "MAIL_DISPATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP control API
    Serve(ServeArgs),

    /// Run one dispatch job in the foreground
    Send(SendArgs),

    /// Manage the credential document
    Credentials(CredentialsArgs),

    /// Check a sheet and credential document without sending
    Validate(ValidateArgs),
}

impl Commands {
    /// Prometheus port requested by the command, if any
    pub fn metrics_port(&self) -> Option<u16> {
        let port = match self {
            Commands::Serve(args) => args.delivery.metrics_port,
            Commands::Send(args) => args.delivery.metrics_port,
            Commands::Credentials(_) | Commands::Validate(_) => 0,
        };
        (port != 0).then_some(port)
    }
}

/// Delivery options shared by `serve` and `send`
#[derive(Args, Debug, Clone)]
pub struct DeliveryArgs {
    /// Path to the credential document (JSON or TOML)
    #[arg(
        short,
        long,
        default_value = "configurations.json",
        env = "MAIL_DISPATCH_CREDENTIALS"
    )]
    pub credentials: PathBuf,

    /// Log messages instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// SMTP session timeout in seconds
    #[arg(long, default_value = "30", env = "MAIL_DISPATCH_SMTP_TIMEOUT")]
    pub smtp_timeout: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "MAIL_DISPATCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `serve` command
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000", env = "MAIL_DISPATCH_BIND")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Recipient sheet (.csv, .xlsx, .xls, .ods)
    #[arg(short, long)]
    pub sheet: PathBuf,

    /// Seconds to wait after each successful delivery
    #[arg(long, default_value = "5")]
    pub delay: f64,

    /// First recipient row (1-based)
    #[arg(long, default_value = "10")]
    pub min: usize,

    /// Last recipient row (1-based, inclusive)
    #[arg(long, default_value = "100")]
    pub max: usize,

    /// Output the final report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

/// Arguments for the `credentials` command
#[derive(Parser, Debug)]
pub struct CredentialsArgs {
    /// Path to the credential document (JSON or TOML)
    #[arg(
        short,
        long,
        default_value = "configurations.json",
        env = "MAIL_DISPATCH_CREDENTIALS",
        global = true
    )]
    pub credentials: PathBuf,

    #[command(subcommand)]
    pub action: CredentialsAction,
}

/// Credential document actions
#[derive(Subcommand, Debug)]
pub enum CredentialsAction {
    /// Append one credential
    Add {
        /// Sender address
        #[arg(long)]
        email: String,

        /// SMTP relay host
        #[arg(long)]
        server: String,

        /// SMTP relay port
        #[arg(long, default_value = "587")]
        port: u16,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Login secret (omit for an unauthenticated relay)
        #[arg(long, env = "MAIL_DISPATCH_SMTP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// List stored credentials (secrets redacted)
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Recipient sheet to validate
    #[arg(short, long)]
    pub sheet: PathBuf,

    /// Credential document to validate
    #[arg(
        short,
        long,
        default_value = "configurations.json",
        env = "MAIL_DISPATCH_CREDENTIALS"
    )]
    pub credentials: PathBuf,

    /// First recipient row (1-based)
    #[arg(long, default_value = "10")]
    pub min: usize,

    /// Last recipient row (1-based, inclusive)
    #[arg(long, default_value = "100")]
    pub max: usize,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
