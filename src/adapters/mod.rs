//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies. Each sub-module groups adapters by
//! infrastructure concern.
//!
//! Adapter categories:
//! - `chain`: Sapphire JSON-RPC, contract binding, signing via alloy-rs
//! - `outcome`: outcome sources (fixed placeholder)

pub mod chain;
pub mod outcome;
