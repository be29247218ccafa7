use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
  #[error("duplicate task id: {0}")]
  DuplicateTaskId(String),

  #[error("task '{task_id}' depends on unknown task '{missing_id}'")]
  UnknownDependency { task_id: String, missing_id: String },

  #[error("cyclic dependency: {}", cycle.join(" -> "))]
  CyclicDependency { cycle: Vec<String> },
}
