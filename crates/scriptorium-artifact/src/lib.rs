//! Scriptorium Artifact
//!
//! This crate provides the artifact storage trait and implementations for
//! Scriptorium. An artifact is the persisted text output of one successfully
//! completed task, keyed by its artifact name.
//!
//! The [`Store`] trait defines the backend layer. [`FsStore`] persists one
//! file per artifact under a base directory, so artifacts survive process
//! restarts and a report can be assembled later without re-running the
//! pipeline. [`MemStore`] keeps artifacts in memory and backs unit tests.
//!
//! Each run must use its own store namespace (for [`FsStore`], its own base
//! directory) so concurrent runs never overwrite each other's artifacts.

mod fs;
mod mem;

pub use fs::FsStore;
pub use mem::MemStore;

use async_trait::async_trait;

/// Error type for artifact storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The requested artifact was not found.
  #[error("artifact not found: {0}")]
  NotFound(String),

  /// An I/O error occurred.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Artifact storage trait.
///
/// `put` overwrites any existing content under the same name; the executor
/// guarantees it writes each name at most once per run.
#[async_trait]
pub trait Store: Send + Sync {
  /// Retrieve an artifact by name.
  async fn get(&self, name: &str) -> Result<String, Error>;

  /// Store an artifact.
  async fn put(&self, name: &str, content: &str) -> Result<(), Error>;

  /// Check whether an artifact exists.
  async fn exists(&self, name: &str) -> Result<bool, Error>;
}
