//! Scriptorium Worker
//!
//! The worker invocation boundary. The pipeline hands a worker declaration,
//! a resolved task description, and the aggregated upstream context to an
//! [`Invoker`] and gets generated text back. Everything behind that call —
//! prompting, model calls, retries — is the backend's business; the engine
//! never retries a generative failure itself.
//!
//! Two backends are provided:
//! - [`ChatInvoker`] calls an OpenAI-compatible chat completions endpoint.
//! - [`ScriptedInvoker`] returns canned outputs in-process, for tests and
//!   offline demo runs.

mod chat;
mod scripted;

pub use chat::ChatInvoker;
pub use scripted::ScriptedInvoker;

use async_trait::async_trait;
use scriptorium_task::WorkerSpec;

/// Error type for worker invocations.
///
/// Any of these aborts the run that triggered the invocation.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
  /// The invoker does not support the worker's declared capability.
  #[error("worker '{worker_id}' capability is not supported by this invoker")]
  UnsupportedCapability { worker_id: String },

  /// The backend call failed (transport, status, or decode).
  #[error("worker '{worker_id}' invocation failed: {message}")]
  Invocation { worker_id: String, message: String },

  /// The backend answered but produced no usable text.
  #[error("worker '{worker_id}' returned an empty response")]
  EmptyResponse { worker_id: String },
}

/// The sole call from the pipeline into generative workers.
///
/// Implementations are treated as opaque, potentially slow, potentially
/// failing remote calls.
#[async_trait]
pub trait Invoker: Send + Sync {
  /// Perform one task's generative work.
  ///
  /// `description` is the task description with run inputs already
  /// substituted; `context` is the concatenated output of the task's
  /// prerequisites (empty when it has none).
  async fn execute(
    &self,
    worker: &WorkerSpec,
    description: &str,
    context: &str,
  ) -> Result<String, WorkerError>;
}
