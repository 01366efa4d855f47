//! Bet Oracle Resolver - Entry Point
//!
//! Resolves at most one pending bet, prints the result and exits.
//! Repeated resolution is left to an external scheduler (cron, systemd
//! timer), which must not start overlapping runs.
//!
//! Wiring sequence:
//! 1. Load `.env`, then `config.toml` (path from `ORACLE_CONFIG`) + validate
//! 2. Init tracing (JSON structured logging by default)
//! 3. Create the RPC chain client (per-call timeouts)
//! 4. Bind the prediction market contract
//! 5. Pick the discovery implementation (unresolved pointer or NewBet logs)
//! 6. Create the fixed outcome source and the env-backed signer
//! 7. Run the pipeline once inside a `resolution_run` span
//! 8. Print the report and exit with the failure class's exit code

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use bet_oracle_resolver::adapters::chain::{
    BetContract, LocalKeySigner, NewBetEventDiscovery, RpcChainClient, UnresolvedPointerDiscovery,
};
use bet_oracle_resolver::adapters::outcome::FixedOutcomeSource;
use bet_oracle_resolver::config::{self, AppConfig, DiscoveryMode, LogFormat};
use bet_oracle_resolver::domain::error::ResolverError;
use bet_oracle_resolver::domain::run::RunOutcome;
use bet_oracle_resolver::ports::discovery::BetDiscovery;
use bet_oracle_resolver::usecases::{PipelineSettings, ResolutionPipeline, RunReport};

/// Environment variable selecting the config file.
const ENV_CONFIG_PATH: &str = "ORACLE_CONFIG";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // ── 1. Load .env and configuration ──────────────────────
    let _ = dotenvy::dotenv();

    let config_path =
        std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| "config.toml".to_string());
    let config = match config::loader::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            let err = ResolverError::Config(format!("{e:#}"));
            eprintln!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };

    // ── 2. Initialize structured logging ────────────────────
    init_tracing(&config);

    info!(
        name = %config.resolver.name,
        version = env!("CARGO_PKG_VERSION"),
        dry_run = config.resolver.dry_run,
        "=== Oracle Service Starting ==="
    );

    // ── 3..7. Wire and run ──────────────────────────────────
    let run_id = Uuid::new_v4();
    let result = run_once(&config)
        .instrument(info_span!("resolution_run", run_id = %run_id))
        .await;

    // ── 8. Report ───────────────────────────────────────────
    let report = RunReport::new(run_id, &result);
    match config.resolver.log_format {
        LogFormat::Json => match report.to_json() {
            Ok(line) => println!("{line}"),
            Err(e) => error!(error = %e, "Failed to serialize run report"),
        },
        LogFormat::Pretty => println!("{}", report.message),
    }

    ExitCode::from(report.exit_code)
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.resolver.log_level));

    // Logs go to stderr so stdout carries only the run report.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.resolver.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Build every collaborator from config and run the pipeline once.
async fn run_once(config: &AppConfig) -> Result<RunOutcome, ResolverError> {
    let pipeline = build_pipeline(config).await?;
    pipeline.run().await
}

async fn build_pipeline(
    config: &AppConfig,
) -> Result<ResolutionPipeline<RpcChainClient>, ResolverError> {
    let config_error = |e: anyhow::Error| ResolverError::Config(format!("{e:#}"));
    let settings = PipelineSettings::from_config(config).map_err(config_error)?;

    // ── 3. RPC chain client ─────────────────────────────────
    let chain = RpcChainClient::connect(&config.network)
        .await
        .context("Failed to create RPC client")
        .map_err(|e| ResolverError::Connection(format!("{e:#}")))?;
    let chain = Arc::new(chain);

    // ── 4. Contract binding ─────────────────────────────────
    let address = config.contract_address().map_err(config_error)?;
    let contract = BetContract::new(Arc::clone(&chain), address);

    // ── 5. Discovery ────────────────────────────────────────
    let discovery: Box<dyn BetDiscovery> = match config.discovery.mode {
        DiscoveryMode::UnresolvedPointer => {
            Box::new(UnresolvedPointerDiscovery::new(contract.clone()))
        }
        DiscoveryMode::NewBetEvents => Box::new(NewBetEventDiscovery::new(
            contract.clone(),
            config.from_block().map_err(config_error)?,
        )),
    };

    // ── 6. Outcome source + signer ──────────────────────────
    let outcomes = Box::new(FixedOutcomeSource::new(config.outcome.fixed_value));
    let signer = Box::new(LocalKeySigner::from_env(
        config.transaction.private_key_env.clone(),
    ));

    Ok(ResolutionPipeline::new(
        contract, discovery, outcomes, signer, settings,
    ))
}
