//! Scriptorium Task
//!
//! This crate contains the serializable pipeline declaration types for
//! Scriptorium. A pipeline is declared as a flat list of tasks with explicit
//! prerequisite ids, a list of workers the tasks reference, and a report
//! section naming the artifacts that make up the final document.
//!
//! Declarations can come from:
//! - JSON files (via CLI with a pipeline file argument)
//! - Code (callers populate the structs directly)
//!
//! The engine takes these declarations, validates cross-references, builds a
//! dependency graph, and executes the tasks in topological order.

mod inputs;
mod pipeline;
mod task;
mod worker;

pub use inputs::RunInputs;
pub use pipeline::{PipelineDef, PipelineError, ReportDef};
pub use task::TaskSpec;
pub use worker::{CapabilityConfig, WorkerSpec};
