//! Outcome Adapters - Implementations of the `OutcomeSource` port
//!
//! - `fixed`: placeholder source answering the same outcome for every
//!   event, until a real data feed is wired in.

pub mod fixed;

pub use fixed::FixedOutcomeSource;
