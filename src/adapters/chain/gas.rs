//! Gas Pricing - Fixed Legacy Gas Price for Resolution Transactions
//!
//! Resolution transactions use a fixed gas price from config (100 gwei by
//! default) rather than an oracle-derived fee. The network price is still
//! read before signing so an underpriced configuration shows up in the
//! logs before the node rejects the transaction.

use alloy::primitives::utils::{ParseUnits, parse_units};
use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, instrument, warn};

use crate::ports::chain_client::ChainClient;

/// Wei per gwei.
const WEI_PER_GWEI: f64 = 1_000_000_000.0;

/// Convert a human gas price (`"100"`, `"gwei"`) into wei.
///
/// # Errors
/// Fails on negative amounts, unknown units, malformed decimals and
/// values that do not fit in `u128`.
pub fn to_native_units(value: &str, unit: &str) -> Result<u128> {
    let value = value.trim();
    if value.starts_with('-') {
        bail!("Gas price must not be negative, got {value}");
    }

    let parsed: ParseUnits = parse_units(value, unit.trim())
        .with_context(|| format!("Invalid gas price: {value} {unit}"))?;
    let wei = parsed.get_absolute();

    u128::try_from(wei).map_err(|_| anyhow!("Gas price {value} {unit} overflows u128 wei"))
}

/// Wei to gwei, for logging only.
#[allow(clippy::cast_precision_loss)]
pub fn wei_to_gwei(wei: u128) -> f64 {
    wei as f64 / WEI_PER_GWEI
}

/// Compare the configured fixed gas price against the network's.
///
/// Never fails: a failed read is logged and the run continues with the
/// fixed price.
#[instrument(skip(chain))]
pub async fn check_fixed_gas_price<C: ChainClient + ?Sized>(chain: &C, fixed_gas_price: u128) {
    match chain.gas_price().await {
        Ok(network) if fixed_gas_price < network => warn!(
            fixed_gwei = wei_to_gwei(fixed_gas_price),
            network_gwei = wei_to_gwei(network),
            "Configured gas price is below the network gas price"
        ),
        Ok(network) => debug!(
            fixed_gwei = wei_to_gwei(fixed_gas_price),
            network_gwei = wei_to_gwei(network),
            "Gas price check passed"
        ),
        Err(e) => warn!(error = %format!("{e:#}"), "Failed to query network gas price"),
    }
}
