use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Error, Store};

/// In-memory artifact store.
///
/// Not durable; intended for tests and scripted demo runs.
#[derive(Default)]
pub struct MemStore {
  artifacts: Mutex<HashMap<String, String>>,
}

impl MemStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of stored artifacts.
  pub fn len(&self) -> usize {
    self.artifacts.lock().unwrap().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl Store for MemStore {
  async fn get(&self, name: &str) -> Result<String, Error> {
    self
      .artifacts
      .lock()
      .unwrap()
      .get(name)
      .cloned()
      .ok_or_else(|| Error::NotFound(name.to_string()))
  }

  async fn put(&self, name: &str, content: &str) -> Result<(), Error> {
    self
      .artifacts
      .lock()
      .unwrap()
      .insert(name.to_string(), content.to_string());
    Ok(())
  }

  async fn exists(&self, name: &str) -> Result<bool, Error> {
    Ok(self.artifacts.lock().unwrap().contains_key(name))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_put_get_exists() {
    let store = MemStore::new();

    store.put("notes", "content").await.unwrap();

    assert_eq!(store.get("notes").await.unwrap(), "content");
    assert!(store.exists("notes").await.unwrap());
    assert!(!store.exists("other").await.unwrap());
    assert_eq!(store.len(), 1);
  }

  #[tokio::test]
  async fn test_missing_is_not_found() {
    let store = MemStore::new();
    let err = store.get("nope").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(name) if name == "nope"));
  }
}
