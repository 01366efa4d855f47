//! Configuration Module - TOML-based Resolver Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides (a `.env` file is read first by the
//! binary). The signing key is never part of this struct: only the
//! name of the environment variable that holds it.

pub mod loader;

use serde::Deserialize;

/// Top-level resolver configuration.
///
/// Built once at startup and passed explicitly into the pipeline, so
/// several configurations (one per network) can coexist.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Resolver identity and run mode.
  #[serde(default)]
  pub resolver: ResolverConfig,
  /// RPC endpoint and expected network.
  #[serde(default)]
  pub network: NetworkConfig,
  /// Prediction market contract.
  #[serde(default)]
  pub contract: ContractConfig,
  /// Fixed envelope parameters for `resolveBet`.
  #[serde(default)]
  pub transaction: TransactionConfig,
  /// How pending bets are found.
  #[serde(default)]
  pub discovery: DiscoveryConfig,
  /// Outcome source settings.
  #[serde(default)]
  pub outcome: OutcomeConfig,
}

/// Resolver identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
  /// Human-readable resolver name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Build and sign, but never broadcast.
  #[serde(default)]
  pub dry_run: bool,
  /// Log and report format.
  #[serde(default)]
  pub log_format: LogFormat,
}

/// Output format for logs and the final run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
  #[default]
  Json,
  Pretty,
}

/// Network endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
  /// JSON-RPC endpoint (http or https).
  #[serde(default = "default_rpc_url")]
  pub rpc_url: String,
  /// Chain id the endpoint must report.
  #[serde(default = "default_chain_id")]
  pub chain_id: u64,
  /// Per-call RPC timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

/// Contract configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractConfig {
  /// Deployed prediction market address.
  #[serde(default = "default_contract_address")]
  pub address: String,
  /// Check for deployed bytecode before discovery.
  #[serde(default = "default_true")]
  pub verify_code: bool,
}

/// Transaction envelope configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionConfig {
  /// Gas limit for `resolveBet`.
  #[serde(default = "default_gas_limit")]
  pub gas_limit: u64,
  /// Gas price amount, in `gas_price_unit`.
  #[serde(default = "default_gas_price")]
  pub gas_price: String,
  /// Unit of `gas_price` (wei, gwei, ether).
  #[serde(default = "default_gas_price_unit")]
  pub gas_price_unit: String,
  /// Re-read the nonce and submit once more after a nonce conflict.
  #[serde(default)]
  pub retry_on_nonce_conflict: bool,
  /// Environment variable holding the hex private key.
  #[serde(default = "default_private_key_env")]
  pub private_key_env: String,
}

/// Which discovery implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
  /// `nextUnresolvedBetId()` read call.
  #[default]
  UnresolvedPointer,
  /// `NewBet` logs from `from_block` onward.
  NewBetEvents,
}

/// What a failed discovery read means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFailurePolicy {
  /// End the run with a read error.
  #[default]
  Fail,
  /// Treat the failure like "nothing pending" (logged as a warning).
  TreatAsEmpty,
}

/// Discovery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
  #[serde(default)]
  pub mode: DiscoveryMode,
  /// First block for event discovery (`latest`, `earliest`, `pending` or a number).
  #[serde(default = "default_from_block")]
  pub from_block: String,
  #[serde(default)]
  pub read_failure: ReadFailurePolicy,
  /// Re-check that the bet is still pending right before broadcast.
  #[serde(default = "default_true")]
  pub recheck_before_submit: bool,
}

/// Outcome source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeConfig {
  /// Value returned by the fixed outcome source.
  #[serde(default = "default_true")]
  pub fixed_value: bool,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
      dry_run: false,
      log_format: LogFormat::default(),
    }
  }
}

impl Default for NetworkConfig {
  fn default() -> Self {
    Self {
      rpc_url: default_rpc_url(),
      chain_id: default_chain_id(),
      timeout_seconds: default_timeout(),
    }
  }
}

impl Default for ContractConfig {
  fn default() -> Self {
    Self {
      address: default_contract_address(),
      verify_code: true,
    }
  }
}

impl Default for TransactionConfig {
  fn default() -> Self {
    Self {
      gas_limit: default_gas_limit(),
      gas_price: default_gas_price(),
      gas_price_unit: default_gas_price_unit(),
      retry_on_nonce_conflict: false,
      private_key_env: default_private_key_env(),
    }
  }
}

impl Default for DiscoveryConfig {
  fn default() -> Self {
    Self {
      mode: DiscoveryMode::default(),
      from_block: default_from_block(),
      read_failure: ReadFailurePolicy::default(),
      recheck_before_submit: true,
    }
  }
}

impl Default for OutcomeConfig {
  fn default() -> Self {
    Self { fixed_value: true }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "bet-oracle-resolver".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_rpc_url() -> String {
  "https://testnet.sapphire.oasis.io".to_string()
}

fn default_chain_id() -> u64 {
  23295 // Sapphire testnet
}

fn default_timeout() -> u64 {
  30
}

fn default_contract_address() -> String {
  "0xAe599d6C9C53599E70342E7293b1ce8359Eb8a68".to_string()
}

fn default_gas_limit() -> u64 {
  200_000
}

fn default_gas_price() -> String {
  "100".to_string()
}

fn default_gas_price_unit() -> String {
  "gwei".to_string()
}

fn default_private_key_env() -> String {
  "ORACLE_PRIVATE_KEY".to_string()
}

fn default_from_block() -> String {
  "latest".to_string()
}
