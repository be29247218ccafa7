//! In-process scripted backend.

use std::collections::HashMap;
use std::sync::Mutex;

use scriptorium_task::WorkerSpec;

use crate::{Invoker, WorkerError};

enum Script {
  Output(String),
  Fail(String),
}

/// Invoker that returns pre-registered outputs keyed by worker id.
///
/// Unregistered workers get a deterministic placeholder derived from the
/// worker role and the description, so a pipeline can run end-to-end offline.
/// Failures can be injected per worker to exercise abort paths.
#[derive(Default)]
pub struct ScriptedInvoker {
  scripts: Mutex<HashMap<String, Script>>,
  invocations: Mutex<Vec<String>>,
}

impl ScriptedInvoker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register the output returned for a worker id.
  pub fn respond(self, worker_id: impl Into<String>, output: impl Into<String>) -> Self {
    self
      .scripts
      .lock()
      .unwrap()
      .insert(worker_id.into(), Script::Output(output.into()));
    self
  }

  /// Register a failure for a worker id.
  pub fn fail(self, worker_id: impl Into<String>, message: impl Into<String>) -> Self {
    self
      .scripts
      .lock()
      .unwrap()
      .insert(worker_id.into(), Script::Fail(message.into()));
    self
  }

  /// Worker ids in the order they were invoked.
  pub fn invocations(&self) -> Vec<String> {
    self.invocations.lock().unwrap().clone()
  }
}

#[async_trait::async_trait]
impl Invoker for ScriptedInvoker {
  async fn execute(
    &self,
    worker: &WorkerSpec,
    description: &str,
    _context: &str,
  ) -> Result<String, WorkerError> {
    self.invocations.lock().unwrap().push(worker.id.clone());

    match self.scripts.lock().unwrap().get(&worker.id) {
      Some(Script::Output(output)) => Ok(output.clone()),
      Some(Script::Fail(message)) => Err(WorkerError::Invocation {
        worker_id: worker.id.clone(),
        message: message.clone(),
      }),
      None => Ok(format!("[{}] {}", worker.role, description)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use scriptorium_task::CapabilityConfig;

  fn worker(id: &str) -> WorkerSpec {
    WorkerSpec {
      id: id.to_string(),
      role: "Novelist".to_string(),
      goal: "Write".to_string(),
      backstory: String::new(),
      capability: CapabilityConfig::Scripted,
    }
  }

  #[tokio::test]
  async fn test_registered_output() {
    let invoker = ScriptedInvoker::new().respond("architect", "three acts");

    let out = invoker
      .execute(&worker("architect"), "outline", "")
      .await
      .unwrap();
    assert_eq!(out, "three acts");
    assert_eq!(invoker.invocations(), vec!["architect"]);
  }

  #[tokio::test]
  async fn test_injected_failure() {
    let invoker = ScriptedInvoker::new().fail("architect", "model overloaded");

    let err = invoker
      .execute(&worker("architect"), "outline", "")
      .await
      .unwrap_err();
    assert!(matches!(
      err,
      WorkerError::Invocation { worker_id, message }
        if worker_id == "architect" && message == "model overloaded"
    ));
  }

  #[tokio::test]
  async fn test_unregistered_worker_gets_placeholder() {
    let invoker = ScriptedInvoker::new();

    let out = invoker
      .execute(&worker("anyone"), "describe the world", "")
      .await
      .unwrap();
    assert_eq!(out, "[Novelist] describe the world");
  }
}
