//! Description template resolution using minijinja.
//!
//! Task descriptions are minijinja templates rendered once per run against
//! the run inputs, before the task's worker is invoked:
//!
//! ```text
//! Outline a {{ genre }} story exploring {{ theme }}.
//! ```
//!
//! Inputs may hold structured values, so templates can reach into them
//! (`{{ characters[0].name }}`) or serialize them wholesale
//! (`{{ tokens | tojson }}`). Placeholders with no matching input render as
//! empty, matching minijinja's default undefined behavior.

use minijinja::Environment;
use scriptorium_task::RunInputs;

use crate::error::ExecutionError;

/// Render a template string against the run inputs.
///
/// Also used by callers outside the executor, e.g. for report metadata
/// values.
pub fn render(template: &str, inputs: &RunInputs) -> Result<String, minijinja::Error> {
  let env = Environment::new();
  env.render_str(template, inputs.as_object())
}

/// Render a task's description template against the run inputs.
pub fn render_description(
  task_id: &str,
  template: &str,
  inputs: &RunInputs,
) -> Result<String, ExecutionError> {
  render(template, inputs).map_err(|e| ExecutionError::Template {
    task_id: task_id.to_string(),
    message: e.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn inputs() -> RunInputs {
    let mut inputs = RunInputs::new();
    inputs.set("genre", "mystery");
    inputs.set("theme", "justice");
    inputs.set("characters", json!([{ "name": "Detective Chen" }]));
    inputs
  }

  #[test]
  fn test_substitutes_named_values() {
    let out =
      render_description("outline", "A {{ genre }} exploring {{ theme }}.", &inputs()).unwrap();
    assert_eq!(out, "A mystery exploring justice.");
  }

  #[test]
  fn test_reaches_into_structured_values() {
    let out = render_description("cast", "Lead: {{ characters[0].name }}", &inputs()).unwrap();
    assert_eq!(out, "Lead: Detective Chen");
  }

  #[test]
  fn test_literal_description_passes_through() {
    let out = render_description("plain", "Just write.", &inputs()).unwrap();
    assert_eq!(out, "Just write.");
  }

  #[test]
  fn test_unknown_placeholder_renders_empty() {
    let out = render_description("x", "Value: {{ nope }}.", &inputs()).unwrap();
    assert_eq!(out, "Value: .");
  }

  #[test]
  fn test_syntax_error_reports_task_id() {
    let err = render_description("broken", "{{ genre", &inputs()).unwrap_err();
    assert!(matches!(err, ExecutionError::Template { task_id, .. } if task_id == "broken"));
  }
}
