use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::TaskSpec;
use crate::worker::WorkerSpec;

/// Errors found while validating a pipeline declaration.
///
/// These cover cross-references between tasks and workers. Dependency
/// validation (unknown prerequisites, cycles) happens when the graph is
/// built.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("duplicate worker id: {0}")]
  DuplicateWorkerId(String),

  #[error("task '{task_id}' references unknown worker '{worker_ref}'")]
  UnknownWorker { task_id: String, worker_ref: String },

  #[error("report references unknown artifact '{0}'")]
  UnknownReportArtifact(String),
}

/// The report section of a pipeline declaration.
///
/// Names the artifacts that are stitched into the final document, in order,
/// plus static metadata lines for the document header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDef {
  /// Document title, e.g. "Generated Story".
  pub title: String,

  /// Artifact names to include, in document order.
  pub artifact_names: Vec<String>,

  /// Metadata key/value pairs, rendered as header lines in this order.
  #[serde(default)]
  pub metadata: Vec<(String, String)>,
}

/// A complete pipeline declaration: workers, tasks, and the report section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDef {
  /// Pipeline name, e.g. "novelist".
  pub name: String,

  pub workers: Vec<WorkerSpec>,

  /// Tasks in declaration order. Declaration order breaks ties in the
  /// execution order, so it is meaningful.
  pub tasks: Vec<TaskSpec>,

  pub report: ReportDef,
}

impl PipelineDef {
  /// Validate cross-references within the declaration.
  ///
  /// Checks that worker ids are unique, every task's `worker_ref` resolves,
  /// and every artifact the report asks for is produced by some task.
  pub fn validate(&self) -> Result<(), PipelineError> {
    let mut worker_ids = std::collections::HashSet::new();
    for worker in &self.workers {
      if !worker_ids.insert(worker.id.as_str()) {
        return Err(PipelineError::DuplicateWorkerId(worker.id.clone()));
      }
    }

    for task in &self.tasks {
      if !worker_ids.contains(task.worker_ref.as_str()) {
        return Err(PipelineError::UnknownWorker {
          task_id: task.id.clone(),
          worker_ref: task.worker_ref.clone(),
        });
      }
    }

    for name in &self.report.artifact_names {
      if !self.tasks.iter().any(|t| &t.artifact_name == name) {
        return Err(PipelineError::UnknownReportArtifact(name.clone()));
      }
    }

    Ok(())
  }

  /// Look up a worker by id.
  pub fn get_worker(&self, worker_id: &str) -> Option<&WorkerSpec> {
    self.workers.iter().find(|w| w.id == worker_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::worker::CapabilityConfig;

  fn worker(id: &str) -> WorkerSpec {
    WorkerSpec {
      id: id.to_string(),
      role: "Writer".to_string(),
      goal: "Write things".to_string(),
      backstory: String::new(),
      capability: CapabilityConfig::Scripted,
    }
  }

  fn task(id: &str, worker_ref: &str, artifact: &str) -> TaskSpec {
    TaskSpec {
      id: id.to_string(),
      description: "do it".to_string(),
      worker_ref: worker_ref.to_string(),
      prerequisite_ids: vec![],
      artifact_name: artifact.to_string(),
    }
  }

  fn pipeline() -> PipelineDef {
    PipelineDef {
      name: "test".to_string(),
      workers: vec![worker("w1")],
      tasks: vec![task("a", "w1", "a_out")],
      report: ReportDef {
        title: "Report".to_string(),
        artifact_names: vec!["a_out".to_string()],
        metadata: vec![],
      },
    }
  }

  #[test]
  fn test_valid_pipeline() {
    assert!(pipeline().validate().is_ok());
  }

  #[test]
  fn test_duplicate_worker_id() {
    let mut def = pipeline();
    def.workers.push(worker("w1"));

    let err = def.validate().unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateWorkerId(id) if id == "w1"));
  }

  #[test]
  fn test_unknown_worker_ref() {
    let mut def = pipeline();
    def.tasks.push(task("b", "nope", "b_out"));

    let err = def.validate().unwrap_err();
    assert!(matches!(
      err,
      PipelineError::UnknownWorker { task_id, worker_ref }
        if task_id == "b" && worker_ref == "nope"
    ));
  }

  #[test]
  fn test_unknown_report_artifact() {
    let mut def = pipeline();
    def.report.artifact_names.push("missing".to_string());

    let err = def.validate().unwrap_err();
    assert!(matches!(err, PipelineError::UnknownReportArtifact(name) if name == "missing"));
  }
}
