use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::{Error, Store};

/// Filesystem-based artifact store.
///
/// Stores each artifact as a markdown file at `{base_path}/{name}.md`. The
/// base directory is created on first write. One base directory corresponds
/// to one run namespace.
pub struct FsStore {
  base_path: PathBuf,
}

impl FsStore {
  /// Create a new filesystem store rooted at the given base path.
  pub fn new(base_path: impl Into<PathBuf>) -> Self {
    Self {
      base_path: base_path.into(),
    }
  }

  fn name_to_path(&self, name: &str) -> PathBuf {
    self.base_path.join(format!("{name}.md"))
  }
}

#[async_trait]
impl Store for FsStore {
  async fn get(&self, name: &str) -> Result<String, Error> {
    let path = self.name_to_path(name);
    fs::read_to_string(&path).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound(name.to_string())
      } else {
        Error::Io(e)
      }
    })
  }

  async fn put(&self, name: &str, content: &str) -> Result<(), Error> {
    let path = self.name_to_path(name);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).await?;
    }
    fs::write(&path, content).await?;
    Ok(())
  }

  async fn exists(&self, name: &str) -> Result<bool, Error> {
    match fs::metadata(self.name_to_path(name)).await {
      Ok(_) => Ok(true),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
      Err(e) => Err(Error::Io(e)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_put_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());

    store.put("01_outline", "Act one...").await.unwrap();

    assert_eq!(store.get("01_outline").await.unwrap(), "Act one...");
    assert!(store.exists("01_outline").await.unwrap());
    assert!(dir.path().join("01_outline.md").exists());
  }

  #[tokio::test]
  async fn test_get_missing_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());

    let err = store.get("missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(name) if name == "missing"));
    assert!(!store.exists("missing").await.unwrap());
  }

  #[tokio::test]
  async fn test_put_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStore::new(dir.path());

    store.put("draft", "first").await.unwrap();
    store.put("draft", "second").await.unwrap();

    assert_eq!(store.get("draft").await.unwrap(), "second");
  }

  #[tokio::test]
  async fn test_content_survives_a_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();

    FsStore::new(dir.path()).put("kept", "still here").await.unwrap();

    let reopened = FsStore::new(dir.path());
    assert_eq!(reopened.get("kept").await.unwrap(), "still here");
  }
}
