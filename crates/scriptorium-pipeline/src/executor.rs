//! Pipeline executor implementation.

use chrono::Utc;
use scriptorium_artifact::Store;
use scriptorium_graph::TaskGraph;
use scriptorium_task::{RunInputs, TaskSpec, WorkerSpec};
use scriptorium_worker::Invoker;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::context::aggregate;
use crate::error::ExecutionError;
use crate::result::{RunResult, RunStatus, TaskResult, TaskStatus};
use crate::template::render_description;

/// The pipeline executor.
///
/// Walks a validated [`TaskGraph`] strictly in its topological order, one
/// task at a time. Per task: the description template is rendered against
/// the run inputs, the prerequisite artifacts are aggregated into a context
/// payload, the assigned worker is invoked, and the result is persisted.
///
/// A worker failure aborts the run: the failing task is recorded and no
/// further task starts, whether or not it depends on the failed one.
/// Cancellation is observed between tasks.
///
/// The executor borrows the store for the run's namespace; a fresh graph and
/// a fresh store namespace are expected per run.
pub struct PipelineExecutor<'a> {
  invoker: &'a dyn Invoker,
  store: &'a dyn Store,
}

impl<'a> PipelineExecutor<'a> {
  pub fn new(invoker: &'a dyn Invoker, store: &'a dyn Store) -> Self {
    Self { invoker, store }
  }

  /// Execute every task in the graph.
  pub async fn run(
    &self,
    graph: &TaskGraph,
    workers: &[WorkerSpec],
    inputs: &RunInputs,
    cancel: CancellationToken,
  ) -> Result<RunResult, ExecutionError> {
    self.run_from(graph, workers, inputs, None, cancel).await
  }

  /// Execute the graph starting at `start_from`, when given.
  ///
  /// Tasks ordered before the start task are not re-executed; their
  /// artifacts must already exist in the store namespace (from an earlier
  /// run) and their results report status Skipped.
  #[instrument(
    name = "pipeline_run",
    skip_all,
    fields(run_id = tracing::field::Empty)
  )]
  pub async fn run_from(
    &self,
    graph: &TaskGraph,
    workers: &[WorkerSpec],
    inputs: &RunInputs,
    start_from: Option<&str>,
    cancel: CancellationToken,
  ) -> Result<RunResult, ExecutionError> {
    let run_id = uuid::Uuid::new_v4().to_string();
    tracing::Span::current().record("run_id", tracing::field::display(&run_id));

    let order: Vec<&TaskSpec> = graph.execution_order().collect();
    let skip_count = match start_from {
      Some(task_id) => self.check_replay_point(&order, task_id).await?,
      None => 0,
    };

    info!(
      run_id = %run_id,
      tasks = order.len(),
      skipped = skip_count,
      "run_started"
    );

    let mut results: Vec<TaskResult> = order.iter().map(|t| TaskResult::pending(&t.id)).collect();
    for result in results.iter_mut().take(skip_count) {
      result.status = TaskStatus::Skipped;
    }

    let mut status = RunStatus::Succeeded;
    let mut first_failed_task_id = None;

    for (i, task) in order.iter().enumerate().skip(skip_count) {
      if cancel.is_cancelled() {
        warn!(run_id = %run_id, next_task = %task.id, "run_cancelled");
        status = RunStatus::Cancelled;
        break;
      }

      let result = &mut results[i];
      result.status = TaskStatus::Running;
      result.started_at = Some(Utc::now());

      info!(run_id = %run_id, task_id = %task.id, "task_started");

      let worker = find_worker(workers, task)?;
      let description = render_description(&task.id, &task.description, inputs)?;
      let context = aggregate(task, graph, self.store).await?;

      match self.invoker.execute(worker, &description, &context).await {
        Ok(output) => {
          self
            .store
            .put(&task.artifact_name, &output)
            .await
            .map_err(|e| ExecutionError::Store {
              task_id: task.id.clone(),
              artifact_name: task.artifact_name.clone(),
              source: e,
            })?;

          result.status = TaskStatus::Succeeded;
          result.output = Some(output);
          result.finished_at = Some(Utc::now());

          info!(
            run_id = %run_id,
            task_id = %task.id,
            artifact = %task.artifact_name,
            "task_completed"
          );
        }
        Err(e) => {
          result.status = TaskStatus::Failed;
          result.error = Some(e.to_string());
          result.finished_at = Some(Utc::now());

          error!(run_id = %run_id, task_id = %task.id, error = %e, "task_failed");

          status = RunStatus::Failed;
          first_failed_task_id = Some(task.id.clone());
          break;
        }
      }
    }

    match status {
      RunStatus::Succeeded => info!(run_id = %run_id, "run_completed"),
      RunStatus::Failed => error!(
        run_id = %run_id,
        failed_task = first_failed_task_id.as_deref().unwrap_or(""),
        "run_failed"
      ),
      RunStatus::Cancelled => {}
    }

    Ok(RunResult {
      run_id,
      status,
      task_results: results,
      first_failed_task_id,
    })
  }

  /// Validate a replay start point.
  ///
  /// Returns how many leading tasks to skip, after checking that each
  /// skipped task's artifact survives from the earlier run.
  async fn check_replay_point(
    &self,
    order: &[&TaskSpec],
    start_task_id: &str,
  ) -> Result<usize, ExecutionError> {
    let position = order
      .iter()
      .position(|t| t.id == start_task_id)
      .ok_or_else(|| ExecutionError::UnknownTask(start_task_id.to_string()))?;

    for task in &order[..position] {
      if !self.store.exists(&task.artifact_name).await.map_err(|e| {
        ExecutionError::Store {
          task_id: task.id.clone(),
          artifact_name: task.artifact_name.clone(),
          source: e,
        }
      })? {
        return Err(ExecutionError::ReplayArtifactMissing {
          task_id: task.id.clone(),
          artifact_name: task.artifact_name.clone(),
        });
      }
    }

    Ok(position)
  }
}

fn find_worker<'w>(
  workers: &'w [WorkerSpec],
  task: &TaskSpec,
) -> Result<&'w WorkerSpec, ExecutionError> {
  workers
    .iter()
    .find(|w| w.id == task.worker_ref)
    .ok_or_else(|| ExecutionError::UnknownWorker {
      task_id: task.id.clone(),
      worker_ref: task.worker_ref.clone(),
    })
}
