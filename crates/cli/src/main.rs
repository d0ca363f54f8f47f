//! `cachecheck`: verify tag-based cache invalidation against a live service.
//!
//! Logs go to stderr, verdicts go to stdout as JSON lines. The exit status is
//! 1 when any verification failed.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cachecheck_client::{ClientConfig, HttpProbe, InvalidationClient};
use cachecheck_core::{AppConfig, TracingRecorder};
use cachecheck_engine::{EngineSettings, Suite, SuiteCase, VerificationEngine, lifecycle_cases, negative_cases};

mod output;

use output::JsonLinesRecorder;

#[derive(Parser)]
#[command(name = "cachecheck", version, about = "Cache invalidation verifier")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true, env = "CACHECHECK_LOG_JSON")]
    json: bool,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify every registry row, then the negative scenarios
    Run {
        /// Only verify rows of this domain
        #[arg(long)]
        domain: Option<String>,

        /// Skip the negative scenarios
        #[arg(long)]
        skip_negative: bool,
    },

    /// Run only the negative scenarios
    Negative,

    /// Print the effective tag registry as JSON
    Registry,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.json, cli.verbose);

    let config = AppConfig::load().context("loading configuration")?;
    let registry = config.load_registry().context("loading tag registry")?;

    let cases: Vec<SuiteCase> = match &cli.command {
        Command::Registry => {
            println!("{}", serde_json::to_string_pretty(&registry)?);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Run { domain, skip_negative } => {
            let mut cases = lifecycle_cases(&registry, domain.as_deref())?;
            if !skip_negative {
                cases.extend(negative_cases(&registry));
            }
            cases
        }
        Command::Negative => negative_cases(&registry),
    };

    tracing::info!(base_url = %config.base_url, cases = cases.len(), "starting verification");

    let client_config = ClientConfig::from_app_config(&config)?;
    let probe = HttpProbe::new(client_config.clone())?;
    let invalidator = InvalidationClient::new(&client_config, &config.invalidate_path)?;
    let engine = VerificationEngine::new(
        probe,
        invalidator,
        registry.spot_checks().to_vec(),
        EngineSettings::from_app_config(&config),
    );

    let recorder = (TracingRecorder, JsonLinesRecorder::new(std::io::stdout()));
    let mut suite = Suite::new(engine, recorder, config.run_ceiling());
    let summary = suite.run_all(&cases).await?;

    tracing::info!(
        total = summary.total,
        verified = summary.verified,
        failed = summary.failed,
        "verification complete"
    );

    Ok(if summary.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn init_tracing(json: bool, verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
