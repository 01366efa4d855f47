//! Configuration Loader - File Loading, Overrides and Validation
//!
//! Handles loading `config.toml`, applying `ORACLE_*` environment
//! overrides, validating all parameters, and converting the human-facing
//! values (addresses, gas price units, block tags) into chain types.

use std::path::Path;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::Address;
use alloy::transports::http::reqwest::Url;
use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::adapters::chain::gas::to_native_units;

/// Environment variable overriding `network.rpc_url`.
pub const ENV_RPC_URL: &str = "ORACLE_RPC_URL";
/// Environment variable overriding `contract.address`.
pub const ENV_CONTRACT_ADDRESS: &str = "ORACLE_CONTRACT_ADDRESS";
/// Environment variable overriding `resolver.log_level`.
pub const ENV_LOG_LEVEL: &str = "ORACLE_LOG_LEVEL";

/// Load and validate configuration from a TOML file.
///
/// A missing file is not an error: every field has a default that
/// targets the Sapphire testnet deployment.
///
/// # Errors
/// Returns detailed error if:
/// - The file exists but can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = if path.exists() {
    std::fs::read_to_string(path)
      .with_context(|| format!("Failed to read config file: {}", path.display()))?
  } else {
    String::new()
  };

  let config = load_config_str(&content, |key| std::env::var(key).ok())?;

  info!(
    config = %path.display(),
    rpc_url = %config.network.rpc_url,
    chain_id = config.network.chain_id,
    contract = %config.contract.address,
    dry_run = config.resolver.dry_run,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse TOML content, apply overrides from `lookup`, then validate.
pub fn load_config_str<F>(content: &str, lookup: F) -> Result<AppConfig>
where
  F: Fn(&str) -> Option<String>,
{
  let mut config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  apply_env_overrides(&mut config, lookup);
  validate_config(&config)?;

  Ok(config)
}

/// Overlay `ORACLE_*` environment values onto the parsed file.
fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(url) = lookup(ENV_RPC_URL).filter(|v| !v.is_empty()) {
    config.network.rpc_url = url;
  }
  if let Some(address) = lookup(ENV_CONTRACT_ADDRESS).filter(|v| !v.is_empty()) {
    config.contract.address = address;
  }
  if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
    config.resolver.log_level = level;
  }
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  // Network validation
  let url = config.network.rpc_url.trim();
  anyhow::ensure!(!url.is_empty(), "RPC URL must not be empty");
  let parsed: Url = url
    .parse()
    .with_context(|| format!("Invalid RPC URL: {url}"))?;
  anyhow::ensure!(
    matches!(parsed.scheme(), "http" | "https"),
    "RPC URL must use http or https, got {url}"
  );
  anyhow::ensure!(
    parsed.host_str().is_some_and(|host| !host.is_empty()),
    "RPC URL must name a host, got {url}"
  );
  anyhow::ensure!(config.network.chain_id > 0, "chain_id must be positive");
  anyhow::ensure!(
    config.network.timeout_seconds > 0,
    "timeout_seconds must be positive"
  );

  // Contract validation
  config.contract_address()?;

  // Transaction validation
  anyhow::ensure!(
    config.transaction.gas_limit >= 21_000,
    "gas_limit must be at least 21000, got {}",
    config.transaction.gas_limit
  );
  let gas_price = config.gas_price_wei()?;
  anyhow::ensure!(gas_price > 0, "gas_price must be positive");
  anyhow::ensure!(
    !config.transaction.private_key_env.trim().is_empty(),
    "private_key_env must name an environment variable"
  );

  // Discovery validation
  config.from_block()?;

  Ok(())
}

impl AppConfig {
  /// Parsed contract address.
  pub fn contract_address(&self) -> Result<Address> {
    self
      .contract
      .address
      .parse()
      .with_context(|| format!("Invalid contract address: {}", self.contract.address))
  }

  /// Fixed gas price converted to wei.
  pub fn gas_price_wei(&self) -> Result<u128> {
    to_native_units(&self.transaction.gas_price, &self.transaction.gas_price_unit)
  }

  /// First block for event discovery.
  pub fn from_block(&self) -> Result<BlockNumberOrTag> {
    parse_block_tag(&self.discovery.from_block)
  }
}

/// Parse `latest`, `earliest`, `pending`, `safe`, `finalized` or a decimal block number.
pub fn parse_block_tag(value: &str) -> Result<BlockNumberOrTag> {
  let value = value.trim();
  let tag = match value.to_ascii_lowercase().as_str() {
    "latest" => BlockNumberOrTag::Latest,
    "earliest" => BlockNumberOrTag::Earliest,
    "pending" => BlockNumberOrTag::Pending,
    "safe" => BlockNumberOrTag::Safe,
    "finalized" => BlockNumberOrTag::Finalized,
    _ => BlockNumberOrTag::Number(
      value
        .parse::<u64>()
        .with_context(|| format!("Invalid from_block: {value}"))?,
    ),
  };
  Ok(tag)
}
