//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates the chain adapters and ports into the resolver's single
//! workflow.
//!
//! Use cases:
//! - `ResolutionPipeline`: connect, verify, discover, resolve, sign, submit
//! - `RunReport`: flattened result of one run

pub mod report;
pub mod resolution;

pub use report::RunReport;
pub use resolution::{PipelineSettings, ResolutionPipeline};
