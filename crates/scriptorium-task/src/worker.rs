use serde::{Deserialize, Serialize};

/// Static declaration of a worker that tasks are assigned to.
///
/// Role, goal, and backstory describe the persona the generative backend is
/// prompted with. The pipeline holds no worker-side state between
/// invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSpec {
  /// Unique worker id within the pipeline, e.g. "story_architect".
  pub id: String,

  /// Short role title, e.g. "Story Structure Specialist".
  pub role: String,

  /// What the worker is trying to achieve.
  pub goal: String,

  /// Descriptive context that shapes the worker's voice.
  #[serde(default)]
  pub backstory: String,

  /// Which generative backend to use, and with what parameters.
  pub capability: CapabilityConfig,
}

/// Generative backend selection and parameters for a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum CapabilityConfig {
  /// An OpenAI-compatible chat completions endpoint.
  Chat {
    /// Model name, e.g. "gpt-4o-mini".
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Override for the API base URL. Defaults to the OpenAI endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
  },

  /// In-process scripted outputs, keyed by worker id. Used by tests and demos.
  Scripted,
}

impl CapabilityConfig {
  /// The model name this capability targets, if it has one.
  pub fn model(&self) -> Option<&str> {
    match self {
      CapabilityConfig::Chat { model, .. } => Some(model),
      CapabilityConfig::Scripted => None,
    }
  }

  /// Return a copy with the model name replaced, where applicable.
  ///
  /// Used by the `test` command to run every worker against one model.
  pub fn with_model(&self, model: &str) -> Self {
    match self {
      CapabilityConfig::Chat {
        temperature,
        base_url,
        ..
      } => CapabilityConfig::Chat {
        model: model.to_string(),
        temperature: *temperature,
        base_url: base_url.clone(),
      },
      CapabilityConfig::Scripted => CapabilityConfig::Scripted,
    }
  }
}
