//! OpenAI-compatible chat completions backend.

use reqwest::Client;
use scriptorium_task::{CapabilityConfig, WorkerSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Invoker, WorkerError};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Chat completions invoker. Works with OpenAI, Ollama, vLLM, OpenRouter,
/// and anything else speaking the `/chat/completions` shape.
pub struct ChatInvoker {
  http: Client,
  api_key: String,
}

impl ChatInvoker {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      http: Client::new(),
      api_key: api_key.into(),
    }
  }
}

#[derive(Serialize)]
struct ChatRequest {
  model: String,
  messages: Vec<ChatMessage>,
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage {
  role: &'static str,
  content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
  message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
  content: Option<String>,
}

/// System prompt from the worker's persona fields.
fn system_prompt(worker: &WorkerSpec) -> String {
  let mut prompt = format!("You are {}.\n{}", worker.role, worker.goal);
  if !worker.backstory.is_empty() {
    prompt.push('\n');
    prompt.push_str(&worker.backstory);
  }
  prompt
}

/// User message from the task description and upstream context.
fn user_message(description: &str, context: &str) -> String {
  if context.is_empty() {
    description.to_string()
  } else {
    format!("{description}\n\nThis is the context you are working with:\n\n{context}")
  }
}

#[async_trait::async_trait]
impl Invoker for ChatInvoker {
  async fn execute(
    &self,
    worker: &WorkerSpec,
    description: &str,
    context: &str,
  ) -> Result<String, WorkerError> {
    let CapabilityConfig::Chat {
      model,
      temperature,
      base_url,
    } = &worker.capability
    else {
      return Err(WorkerError::UnsupportedCapability {
        worker_id: worker.id.clone(),
      });
    };

    let url = format!(
      "{}/chat/completions",
      base_url.as_deref().unwrap_or(OPENAI_API_URL)
    );

    let request = ChatRequest {
      model: model.clone(),
      messages: vec![
        ChatMessage {
          role: "system",
          content: system_prompt(worker),
        },
        ChatMessage {
          role: "user",
          content: user_message(description, context),
        },
      ],
      temperature: *temperature,
    };

    debug!(worker_id = %worker.id, model = %model, "sending chat request");

    let response = self
      .http
      .post(&url)
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| WorkerError::Invocation {
        worker_id: worker.id.clone(),
        message: e.to_string(),
      })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(WorkerError::Invocation {
        worker_id: worker.id.clone(),
        message: format!("status {status}: {body}"),
      });
    }

    let parsed: ChatResponse = response.json().await.map_err(|e| WorkerError::Invocation {
      worker_id: worker.id.clone(),
      message: format!("invalid response body: {e}"),
    })?;

    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|text| !text.trim().is_empty())
      .ok_or_else(|| WorkerError::EmptyResponse {
        worker_id: worker.id.clone(),
      })
  }
}
