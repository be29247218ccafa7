//! Run-level inputs.
//!
//! Run inputs are a flat mapping of named values supplied once at pipeline
//! start, e.g. genre, theme, characters. They are immutable for the duration
//! of a run and are only used for template substitution into task
//! descriptions.

use serde::{Deserialize, Serialize};

/// Named values for one pipeline run.
///
/// Values are arbitrary JSON so callers can pass structured data (character
/// lists, settings) as well as plain strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunInputs {
  values: serde_json::Map<String, serde_json::Value>,
}

impl RunInputs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set a named input value.
  pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> &mut Self {
    self.values.insert(key.into(), value.into());
    self
  }

  /// Get a named input value.
  pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
    self.values.get(key)
  }

  /// View the inputs as a JSON object, for template rendering.
  pub fn as_object(&self) -> &serde_json::Map<String, serde_json::Value> {
    &self.values
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl From<serde_json::Map<String, serde_json::Value>> for RunInputs {
  fn from(values: serde_json::Map<String, serde_json::Value>) -> Self {
    Self { values }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_set_and_get() {
    let mut inputs = RunInputs::new();
    inputs.set("genre", "science_fiction");
    inputs.set("characters", json!([{ "name": "Alex" }]));

    assert_eq!(inputs.get("genre"), Some(&json!("science_fiction")));
    assert_eq!(inputs.get("characters"), Some(&json!([{ "name": "Alex" }])));
    assert_eq!(inputs.get("missing"), None);
  }

  #[test]
  fn test_transparent_serialization() {
    let mut inputs = RunInputs::new();
    inputs.set("theme", "redemption");

    let serialized = serde_json::to_value(&inputs).unwrap();
    assert_eq!(serialized, json!({ "theme": "redemption" }));

    let parsed: RunInputs = serde_json::from_value(serialized).unwrap();
    assert_eq!(parsed, inputs);
  }
}
