//! Per-task and per-run execution results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a single task within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  /// Not started. Terminal only when the run aborted or was cancelled
  /// before this task's turn.
  Pending,
  Running,
  Succeeded,
  Failed,
  /// Not re-executed during a replay; its artifact from an earlier run was
  /// reused.
  Skipped,
}

/// Outcome of one task in one run.
///
/// Terminal once Succeeded, Failed, or Skipped; a task is never re-executed
/// within the same run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
  pub task_id: String,
  pub status: TaskStatus,
  /// Generated text. Present iff the task succeeded.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub output: Option<String>,
  /// Worker error. Present iff the task failed.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub started_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub finished_at: Option<DateTime<Utc>>,
}

impl TaskResult {
  pub(crate) fn pending(task_id: &str) -> Self {
    Self {
      task_id: task_id.to_string(),
      status: TaskStatus::Pending,
      output: None,
      error: None,
      started_at: None,
      finished_at: None,
    }
  }
}

/// Overall status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
  /// Every task succeeded (or was deliberately skipped during a replay).
  Succeeded,
  /// A worker failed; the run aborted at that task.
  Failed,
  /// Cancelled between tasks before completion.
  Cancelled,
}

/// Summary of one end-to-end pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
  pub run_id: String,
  pub status: RunStatus,
  /// Task results in execution order. Tasks after an abort stay Pending.
  pub task_results: Vec<TaskResult>,
  /// Id of the task whose worker failure aborted the run, if any.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub first_failed_task_id: Option<String>,
}

impl RunResult {
  /// Look up one task's result by id.
  pub fn get(&self, task_id: &str) -> Option<&TaskResult> {
    self.task_results.iter().find(|r| r.task_id == task_id)
  }
}
