//! Error types for pipeline execution.
//!
//! A worker's generative failure is not an [`ExecutionError`]: it is
//! recorded in the run result and the run aborts with status Failed. These
//! errors cover everything else — infrastructure faults and sequencing
//! invariant violations that make the run result itself meaningless.

use thiserror::Error;

use crate::context::ContextError;

#[derive(Debug, Error)]
pub enum ExecutionError {
  /// A task description template failed to render.
  #[error("description template failed for task '{task_id}': {message}")]
  Template { task_id: String, message: String },

  /// A prerequisite artifact was absent when a task started. Given the
  /// execution order this indicates a sequencing bug, not a user error.
  #[error(transparent)]
  Context(#[from] ContextError),

  /// Writing a task's artifact failed.
  #[error("failed to store artifact '{artifact_name}' for task '{task_id}': {source}")]
  Store {
    task_id: String,
    artifact_name: String,
    #[source]
    source: scriptorium_artifact::Error,
  },

  /// A task references a worker that was not supplied to the executor.
  #[error("task '{task_id}' references unknown worker '{worker_ref}'")]
  UnknownWorker { task_id: String, worker_ref: String },

  /// The replay start task does not exist in the graph.
  #[error("replay start task '{0}' not found in pipeline")]
  UnknownTask(String),

  /// A replayed-over task has no persisted artifact to reuse.
  #[error("cannot replay: task '{task_id}' has no persisted artifact '{artifact_name}'")]
  ReplayArtifactMissing {
    task_id: String,
    artifact_name: String,
  },
}
