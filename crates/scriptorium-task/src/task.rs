use serde::{Deserialize, Serialize};

/// Static declaration of a single pipeline task.
///
/// The description is a minijinja template rendered against the run inputs
/// before the task's worker is invoked. Prerequisites are ordered: the
/// context handed to the worker concatenates their artifacts in exactly the
/// order declared here, not in graph order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
  /// Unique task id within the pipeline, e.g. "design_structure".
  pub id: String,

  /// Description template, e.g. "Outline a {{ genre }} story about {{ theme }}."
  pub description: String,

  /// Id of the worker that performs this task.
  pub worker_ref: String,

  /// Ids of tasks whose artifacts feed this task's context, in the order
  /// they should appear in the context payload.
  #[serde(default)]
  pub prerequisite_ids: Vec<String>,

  /// Key under which this task's output is persisted,
  /// e.g. "02_story_structure".
  pub artifact_name: String,
}
