//! Scriptorium Pipeline
//!
//! This crate provides the [`PipelineExecutor`] which handles:
//! - Sequential task execution in the graph's topological order
//! - Description template resolution via minijinja
//! - Context aggregation from prerequisite artifacts
//! - Artifact persistence and per-task result tracking
//!
//! Execution is strictly one task at a time: the reference workflows model
//! an editorial pipeline where every stage's output is presumed available to
//! the next. A worker failure aborts the run — a story with missing sections
//! is not meaningful output, so there is no partial continuation.

mod context;
mod error;
mod executor;
mod result;
mod template;

pub use context::{ContextError, aggregate};
pub use error::ExecutionError;
pub use executor::PipelineExecutor;
pub use result::{RunResult, RunStatus, TaskResult, TaskStatus};
pub use template::{render, render_description};
