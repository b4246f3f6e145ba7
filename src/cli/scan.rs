use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::banner::print_banner;
use crate::cli::commands::ScanArgs;
use crate::config::{self, Migr8Config};
use crate::discovery::engine::parse_base;
use crate::discovery::{DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH};
use crate::errors::Migr8Error;
use crate::http::{ClientOptions, DEFAULT_TIMEOUT_SECS};
use crate::reporting::formatter::{format_findings, format_summary};
use crate::reporting::{write_report, Reporter, ScanReport};
use crate::scenarios::{create_scenario, ProbeTarget, ScenarioConfig, ScenarioContext, DEFAULT_DELAY_MS};

pub async fn handle_scan(args: ScanArgs, quiet: bool) -> Result<(), Migr8Error> {
    // Everything is validated before the first request goes out
    validate_scan_args(&args)?;

    let file_config = match &args.config {
        Some(path) => config::parse_config(path).await?,
        None => Migr8Config::default(),
    };
    let scenario_config = build_scenario_config(&args, &file_config, quiet);

    if !quiet && !args.no_banner {
        print_banner();
    }

    info!(
        mode = %args.mode,
        target = args.target.as_deref().unwrap_or("-"),
        base = %args.base,
        concurrency = scenario_config.concurrency,
        "Starting upload reconnaissance"
    );

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing with partial results");
            watcher.cancel();
        }
    });

    let reporter = Reporter::new(quiet);
    let ctx = ScenarioContext::new(scenario_config, reporter, cancel)?;
    let scenario = create_scenario(args.mode);

    let started_at = Utc::now();
    let clock = Instant::now();
    let summary = scenario.run(&ctx).await?;
    let elapsed_ms = clock.elapsed().as_millis() as u64;

    reporter.block(&format_summary(&summary, elapsed_ms));
    reporter.block(&format_findings(&summary));

    info!(
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        executed = summary.executed,
        duration_ms = elapsed_ms,
        "Scan completed"
    );

    let interrupted = summary.interrupted;
    if let Some(output) = &args.output {
        let report = ScanReport::new(args.target.clone(), args.base.clone(), started_at, summary);
        write_report(output, &report).await?;
        reporter.success(format!("Report written to {}", output.display()));
    }

    if interrupted {
        return Err(Migr8Error::Cancelled("scan interrupted, results are partial".into()));
    }
    Ok(())
}

/// Reject bad operator input before any network activity.
pub fn validate_scan_args(args: &ScanArgs) -> Result<(), Migr8Error> {
    parse_base(&args.base)
        .map_err(|e| Migr8Error::InvalidTarget(format!("--base {}: {}", args.base, e)))?;

    match &args.target {
        Some(target) => {
            parse_base(target)
                .map_err(|e| Migr8Error::InvalidTarget(format!("--target {}: {}", target, e)))?;
        }
        None if args.mode.requires_upload_endpoint() => {
            return Err(Migr8Error::Config(format!(
                "--target is required for {} mode",
                args.mode
            )));
        }
        None => {}
    }

    if let Some(payload) = &args.payload {
        require_file(payload).map_err(Migr8Error::Payload)?;
    }
    if let Some(wordlist) = &args.wordlist {
        require_file(wordlist).map_err(Migr8Error::Wordlist)?;
    }

    if args.threads == Some(0) {
        return Err(Migr8Error::Config("--threads must be at least 1".into()));
    }
    if args.timeout == Some(0) {
        return Err(Migr8Error::Config("--timeout must be at least 1 second".into()));
    }
    if args.max_depth == Some(0) {
        return Err(Migr8Error::Config("--max-depth must be at least 1".into()));
    }

    Ok(())
}

fn require_file(path: &Path) -> Result<(), String> {
    if path.is_file() {
        Ok(())
    } else {
        Err(format!("File not found: {}", path.display()))
    }
}

/// Merge CLI flags over the config file over built-in defaults.
pub fn build_scenario_config(args: &ScanArgs, file_config: &Migr8Config, quiet: bool) -> ScenarioConfig {
    let http = file_config.http();
    let paths = file_config.paths();
    let discovery = file_config.discovery();

    let timeout_secs = args.timeout.or(http.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS);
    let delay_ms = args.delay_ms.or(http.delay_ms).unwrap_or(DEFAULT_DELAY_MS);

    ScenarioConfig {
        target: ProbeTarget {
            upload_url: args.target.clone(),
            base_url: args.base.clone(),
        },
        payload: args.payload.clone(),
        wordlist: args.wordlist.clone(),
        client: ClientOptions {
            timeout: Duration::from_secs(timeout_secs),
            user_agent: http.user_agent,
            accept_invalid_certs: args.insecure || http.accept_invalid_certs.unwrap_or(false),
        },
        concurrency: args.threads.or(http.concurrency).unwrap_or(DEFAULT_CONCURRENCY),
        delay: Duration::from_millis(delay_ms),
        max_depth: args.max_depth.or(discovery.max_depth).unwrap_or(DEFAULT_MAX_DEPTH),
        field_name: args.field.clone().or(paths.field_name),
        upload_dirs: paths.upload_dirs,
        rules: file_config.rules(),
        extension_variants: args.extensions,
        progress: !quiet,
    }
}
