// # rewrites-sync
//
// One-shot CLI that converges a NextDNS profile's rewrite set to a
// declarative YAML configuration.
//
// This is a THIN integration layer: all reconciliation logic lives in
// rewrites-core, all HTTP specifics in rewrites-provider-nextdns. The
// binary only wires configuration, credential, logging, and exit codes.
//
// ## Configuration
//
// - `--config <FILE>`: path to the YAML configuration (required)
// - `--log-level <LEVEL>` / `REWRITES_LOG_LEVEL`: trace|debug|info|warn|error
// - `NEXTDNS_API_KEY`: API key (environment variable, required)
//
// ## Example
//
// ```bash
// export NEXTDNS_API_KEY=your_key
// rewrites-sync --config rewrites.yaml
// ```
//
// Exit code 0 on full success; 1 on any configuration error, missing
// credential, missing profile, or API failure. A mid-run failure leaves
// earlier rewrites converged and later ones untouched.

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use rewrites_core::{SyncConfig, SyncEngine};
use rewrites_provider_nextdns::NextDnsClient;

/// Environment variable holding the NextDNS API key
const API_KEY_VAR: &str = "NEXTDNS_API_KEY";

/// Exit codes for the one-shot run
///
/// Every failure maps to 1: configuration, credential, profile lookup, and
/// API errors are all fatal and indistinguishable to the caller.
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// Full success
    Success = 0,
    /// Any failure (logged before exit)
    Failure = 1,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Reconcile NextDNS rewrites against a declarative configuration
#[derive(Debug, Parser)]
#[command(name = "rewrites-sync", version, about)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "REWRITES_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => {
            eprintln!("Invalid log level: {other}");
            return SyncExitCode::Failure.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return SyncExitCode::Failure.into();
    }

    // The flow is a strict sequence of awaits with a single writer, so a
    // current-thread runtime is enough.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::Failure.into();
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => SyncExitCode::Success.into(),
        Err(e) => {
            error!("{:#}", e);
            SyncExitCode::Failure.into()
        }
    }
}

/// Run the one-shot synchronization
async fn run(cli: Cli) -> Result<()> {
    let config = SyncConfig::from_yaml_file(&cli.config)?;
    info!("Profile name: {}", config.profile_name);
    info!("Configuration loaded: {} rewrite(s)", config.rewrites.len());

    let api_key = env::var(API_KEY_VAR)
        .ok()
        .filter(|key| !key.is_empty())
        .with_context(|| format!("{API_KEY_VAR} environment variable not set"))?;

    let client = NextDnsClient::new(api_key)?;

    // The event receiver is dropped: the CLI observes the run through
    // tracing output alone.
    let (engine, _events) = SyncEngine::new(Box::new(client), config)?;

    let summary = engine.run().await?;
    info!(
        "Synchronization complete: {} created, {} replaced",
        summary.created, summary.replaced
    );

    Ok(())
}
