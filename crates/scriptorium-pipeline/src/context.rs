//! Context aggregation.
//!
//! The context handed to a task's worker is the concatenation of its
//! prerequisites' persisted artifacts, in the order the prerequisites were
//! declared — not topological order. Sibling prerequisites often carry a
//! meaningful narrative order (structure before characters before world),
//! and the declaration is where that order lives.

use scriptorium_artifact::Store;
use scriptorium_graph::TaskGraph;
use scriptorium_task::TaskSpec;
use thiserror::Error;

/// Boundary between prerequisite sections in the context payload.
const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Error)]
pub enum ContextError {
  /// A prerequisite's artifact is absent. The executor only starts a task
  /// after all prerequisites succeeded, so this is an internal sequencing
  /// violation rather than a user error.
  #[error("task '{task_id}' is missing the artifact of prerequisite '{prerequisite_id}'")]
  MissingArtifact {
    task_id: String,
    prerequisite_id: String,
  },

  /// The store failed for a reason other than a missing artifact.
  #[error("artifact store error: {0}")]
  Store(#[from] scriptorium_artifact::Error),
}

/// Build the context payload for `task` from its prerequisites' artifacts.
///
/// An empty prerequisite list yields an empty payload; the task then works
/// from the run inputs alone.
pub async fn aggregate(
  task: &TaskSpec,
  graph: &TaskGraph,
  store: &dyn Store,
) -> Result<String, ContextError> {
  let mut sections = Vec::with_capacity(task.prerequisite_ids.len());

  for prereq_id in &task.prerequisite_ids {
    let prereq = graph
      .get_task(prereq_id)
      .ok_or_else(|| ContextError::MissingArtifact {
        task_id: task.id.clone(),
        prerequisite_id: prereq_id.clone(),
      })?;

    let content = store.get(&prereq.artifact_name).await.map_err(|e| match e {
      scriptorium_artifact::Error::NotFound(_) => ContextError::MissingArtifact {
        task_id: task.id.clone(),
        prerequisite_id: prereq_id.clone(),
      },
      other => ContextError::Store(other),
    })?;

    sections.push(content);
  }

  Ok(sections.join(CONTEXT_SEPARATOR))
}

#[cfg(test)]
mod tests {
  use super::*;
  use scriptorium_artifact::MemStore;

  fn task(id: &str, prereqs: &[&str]) -> TaskSpec {
    TaskSpec {
      id: id.to_string(),
      description: String::new(),
      worker_ref: "writer".to_string(),
      prerequisite_ids: prereqs.iter().map(|s| s.to_string()).collect(),
      artifact_name: format!("{id}_out"),
    }
  }

  fn graph() -> TaskGraph {
    TaskGraph::build(vec![
      task("a", &[]),
      task("b", &["a"]),
      task("c", &["a"]),
      task("d", &["b", "c"]),
    ])
    .unwrap()
  }

  #[tokio::test]
  async fn test_concatenates_in_declared_order() {
    let store = MemStore::new();
    store.put("b_out", "from b").await.unwrap();
    store.put("c_out", "from c").await.unwrap();

    let graph = graph();
    let payload = aggregate(graph.get_task("d").unwrap(), &graph, &store)
      .await
      .unwrap();

    assert_eq!(payload, "from b\n\nfrom c");
  }

  #[tokio::test]
  async fn test_declared_order_wins_over_topological_position() {
    // Same graph, but d declares c before b.
    let graph = TaskGraph::build(vec![
      task("a", &[]),
      task("b", &["a"]),
      task("c", &["a"]),
      task("d", &["c", "b"]),
    ])
    .unwrap();

    let store = MemStore::new();
    store.put("b_out", "from b").await.unwrap();
    store.put("c_out", "from c").await.unwrap();

    let payload = aggregate(graph.get_task("d").unwrap(), &graph, &store)
      .await
      .unwrap();

    assert_eq!(payload, "from c\n\nfrom b");
  }

  #[tokio::test]
  async fn test_empty_prerequisites_yield_empty_payload() {
    let store = MemStore::new();
    let graph = graph();

    let payload = aggregate(graph.get_task("a").unwrap(), &graph, &store)
      .await
      .unwrap();

    assert_eq!(payload, "");
  }

  #[tokio::test]
  async fn test_absent_artifact_is_an_invariant_violation() {
    let store = MemStore::new();
    store.put("b_out", "from b").await.unwrap();
    // c_out never stored.

    let graph = graph();
    let err = aggregate(graph.get_task("d").unwrap(), &graph, &store)
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      ContextError::MissingArtifact { task_id, prerequisite_id }
        if task_id == "d" && prerequisite_id == "c"
    ));
  }
}
