use std::collections::HashMap;

use scriptorium_task::TaskSpec;

use crate::error::GraphError;

/// A validated task dependency graph with a fixed execution order.
///
/// Built fresh per run from the task declarations and never mutated after
/// validation. Nodes are the tasks; an edge runs from each prerequisite to
/// its dependent.
#[derive(Debug, Clone)]
pub struct TaskGraph {
  /// Tasks in declaration order.
  tasks: Vec<TaskSpec>,
  /// Task id -> index into `tasks`.
  index: HashMap<String, usize>,
  /// Topological order as indices into `tasks`.
  order: Vec<usize>,
}

/// DFS marking for cycle detection.
#[derive(Clone, Copy, PartialEq)]
enum Mark {
  Unvisited,
  InProgress,
  Done,
}

impl TaskGraph {
  /// Build and validate a graph from task declarations.
  ///
  /// Fails with [`GraphError::DuplicateTaskId`] on repeated ids,
  /// [`GraphError::UnknownDependency`] when a prerequisite does not resolve,
  /// and [`GraphError::CyclicDependency`] when the declarations contain a
  /// cycle. On success the graph exposes a topological execution order where
  /// ties between unrelated tasks follow declaration order.
  pub fn build(tasks: Vec<TaskSpec>) -> Result<Self, GraphError> {
    let mut index = HashMap::with_capacity(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
      if index.insert(task.id.clone(), i).is_some() {
        return Err(GraphError::DuplicateTaskId(task.id.clone()));
      }
    }

    for task in &tasks {
      for prereq in &task.prerequisite_ids {
        if !index.contains_key(prereq) {
          return Err(GraphError::UnknownDependency {
            task_id: task.id.clone(),
            missing_id: prereq.clone(),
          });
        }
      }
    }

    detect_cycles(&tasks, &index)?;
    let order = topological_order(&tasks, &index);

    Ok(Self {
      tasks,
      index,
      order,
    })
  }

  /// Tasks in execution (topological) order.
  pub fn execution_order(&self) -> impl Iterator<Item = &TaskSpec> {
    self.order.iter().map(|&i| &self.tasks[i])
  }

  /// Tasks in declaration order.
  pub fn tasks(&self) -> &[TaskSpec] {
    &self.tasks
  }

  /// Look up a task by id.
  pub fn get_task(&self, task_id: &str) -> Option<&TaskSpec> {
    self.index.get(task_id).map(|&i| &self.tasks[i])
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }
}

/// Three-color depth-first cycle detection.
///
/// Follows prerequisite edges from each task. Hitting an in-progress node
/// means the declarations contain a cycle; the path from that node back to
/// itself is reported.
fn detect_cycles(tasks: &[TaskSpec], index: &HashMap<String, usize>) -> Result<(), GraphError> {
  let mut marks = vec![Mark::Unvisited; tasks.len()];
  let mut path = Vec::new();

  for start in 0..tasks.len() {
    if marks[start] == Mark::Unvisited {
      visit(start, tasks, index, &mut marks, &mut path)?;
    }
  }

  Ok(())
}

fn visit(
  node: usize,
  tasks: &[TaskSpec],
  index: &HashMap<String, usize>,
  marks: &mut [Mark],
  path: &mut Vec<usize>,
) -> Result<(), GraphError> {
  marks[node] = Mark::InProgress;
  path.push(node);

  for prereq in &tasks[node].prerequisite_ids {
    let next = index[prereq.as_str()];
    match marks[next] {
      Mark::Unvisited => visit(next, tasks, index, marks, path)?,
      Mark::InProgress => {
        let pos = path.iter().position(|&n| n == next).unwrap_or(0);
        let mut cycle: Vec<String> = path[pos..].iter().map(|&n| tasks[n].id.clone()).collect();
        cycle.push(tasks[next].id.clone());
        return Err(GraphError::CyclicDependency { cycle });
      }
      Mark::Done => {}
    }
  }

  path.pop();
  marks[node] = Mark::Done;
  Ok(())
}

/// Deterministic topological order.
///
/// Repeatedly emits the first task in declaration order whose prerequisites
/// have all been emitted. Quadratic in the task count, which is fine for the
/// pipeline sizes this engine runs (a handful to a few dozen tasks).
fn topological_order(tasks: &[TaskSpec], index: &HashMap<String, usize>) -> Vec<usize> {
  let mut order = Vec::with_capacity(tasks.len());
  let mut emitted = vec![false; tasks.len()];

  while order.len() < tasks.len() {
    for i in 0..tasks.len() {
      if emitted[i] {
        continue;
      }
      let ready = tasks[i]
        .prerequisite_ids
        .iter()
        .all(|p| emitted[index[p.as_str()]]);
      if ready {
        emitted[i] = true;
        order.push(i);
        break;
      }
    }
  }

  order
}

#[cfg(test)]
mod tests {
  use super::*;

  fn task(id: &str, prereqs: &[&str]) -> TaskSpec {
    TaskSpec {
      id: id.to_string(),
      description: format!("run {id}"),
      worker_ref: "writer".to_string(),
      prerequisite_ids: prereqs.iter().map(|s| s.to_string()).collect(),
      artifact_name: format!("{id}_out"),
    }
  }

  fn ids(graph: &TaskGraph) -> Vec<&str> {
    graph.execution_order().map(|t| t.id.as_str()).collect()
  }

  #[test]
  fn test_order_respects_prerequisites() {
    let graph = TaskGraph::build(vec![
      task("c", &["b"]),
      task("b", &["a"]),
      task("a", &[]),
    ])
    .unwrap();

    assert_eq!(ids(&graph), vec!["a", "b", "c"]);
  }

  #[test]
  fn test_diamond_keeps_declaration_order_for_siblings() {
    // a -> {b, c} -> d; b and c are unrelated, so they keep their
    // declaration order.
    let graph = TaskGraph::build(vec![
      task("a", &[]),
      task("b", &["a"]),
      task("c", &["a"]),
      task("d", &["b", "c"]),
    ])
    .unwrap();

    assert_eq!(ids(&graph), vec!["a", "b", "c", "d"]);

    let graph = TaskGraph::build(vec![
      task("a", &[]),
      task("c", &["a"]),
      task("b", &["a"]),
      task("d", &["b", "c"]),
    ])
    .unwrap();

    assert_eq!(ids(&graph), vec!["a", "c", "b", "d"]);
  }

  #[test]
  fn test_independent_tasks_run_in_declaration_order() {
    let graph = TaskGraph::build(vec![task("z", &[]), task("m", &[]), task("a", &[])]).unwrap();
    assert_eq!(ids(&graph), vec!["z", "m", "a"]);
  }

  #[test]
  fn test_order_is_deterministic() {
    let tasks = vec![
      task("parse", &[]),
      task("structure", &["parse"]),
      task("characters", &["parse", "structure"]),
      task("world", &["parse", "structure", "characters"]),
      task("scenes", &["structure", "characters", "world"]),
    ];

    let first = TaskGraph::build(tasks.clone()).unwrap();
    let second = TaskGraph::build(tasks).unwrap();

    assert_eq!(ids(&first), ids(&second));
  }

  #[test]
  fn test_duplicate_task_id() {
    let err = TaskGraph::build(vec![task("a", &[]), task("a", &[])]).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateTaskId(id) if id == "a"));
  }

  #[test]
  fn test_unknown_dependency() {
    let err = TaskGraph::build(vec![task("a", &["ghost"])]).unwrap_err();
    assert!(matches!(
      err,
      GraphError::UnknownDependency { task_id, missing_id }
        if task_id == "a" && missing_id == "ghost"
    ));
  }

  #[test]
  fn test_self_dependency_is_a_cycle() {
    let err = TaskGraph::build(vec![task("a", &["a"])]).unwrap_err();
    assert!(matches!(err, GraphError::CyclicDependency { .. }));
  }

  #[test]
  fn test_cycle_reports_path() {
    let err = TaskGraph::build(vec![
      task("a", &["c"]),
      task("b", &["a"]),
      task("c", &["b"]),
    ])
    .unwrap_err();

    match err {
      GraphError::CyclicDependency { cycle } => {
        // Closed path: first and last entries match.
        assert!(cycle.len() >= 3);
        assert_eq!(cycle.first(), cycle.last());
        for id in ["a", "b", "c"] {
          assert!(cycle.iter().any(|c| c == id), "cycle missing {id}: {cycle:?}");
        }
      }
      other => panic!("expected CyclicDependency, got {other:?}"),
    }
  }

  #[test]
  fn test_lookup_by_id() {
    let graph = TaskGraph::build(vec![task("a", &[]), task("b", &["a"])]).unwrap();
    assert_eq!(graph.get_task("b").unwrap().prerequisite_ids, vec!["a"]);
    assert!(graph.get_task("missing").is_none());
    assert_eq!(graph.len(), 2);
  }
}
