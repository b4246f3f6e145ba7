use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::scenarios::ScenarioKind;

#[derive(Parser)]
#[command(name = "migr8", version, about = "File upload vulnerability reconnaissance for authorized testing")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one upload test scenario against a target
    Scan(ScanArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ScanArgs {
    /// Upload endpoint URL (required for basic, aspx, htaccess and content-type)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Base URL used to look for uploaded files and directories
    #[arg(short, long)]
    pub base: String,

    /// Payload file to upload or search for
    #[arg(short, long)]
    pub payload: Option<PathBuf>,

    /// Test scenario
    #[arg(short, long, value_enum)]
    pub mode: ScenarioKind,

    /// Directory wordlist (defaults to the built-in list)
    #[arg(short, long)]
    pub wordlist: Option<PathBuf>,

    /// Request timeout in seconds [default: 30]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Concurrent discovery requests [default: 10]
    #[arg(long)]
    pub threads: Option<usize>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Delay between upload techniques in milliseconds [default: 500]
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Maximum recursion depth for recursive discovery [default: 2]
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Multipart field name (detected from the upload page when omitted)
    #[arg(long)]
    pub field: Option<String>,

    /// Also try PHP-family extension variants in basic mode
    #[arg(long)]
    pub extensions: bool,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Write a JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the startup banner
    #[arg(long)]
    pub no_banner: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: PathBuf,
}
