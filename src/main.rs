use clap::Parser;
use migr8::cli::{self, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let result = match cli.command {
        Commands::Scan(args) => cli::scan::handle_scan(args, cli.quiet).await,
        Commands::Validate(args) => cli::validate::handle_validate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
