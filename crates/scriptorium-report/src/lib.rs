//! Scriptorium Report
//!
//! Assembles a subset of persisted artifacts into one final document: a
//! title, a metadata header, then each requested artifact in order,
//! separated by a section boundary.
//!
//! Assembly is all-or-nothing. If any requested artifact is absent — for
//! example after an aborted run — assembly fails with
//! [`AssemblyError::MissingArtifact`] instead of silently producing a
//! partial document.

use scriptorium_artifact::Store;
use scriptorium_task::ReportDef;
use thiserror::Error;
use tracing::info;

/// Boundary inserted between artifact sections.
const SECTION_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Error)]
pub enum AssemblyError {
  /// A requested artifact was never produced.
  #[error("missing artifact: {0}")]
  MissingArtifact(String),

  /// The store failed for a reason other than a missing artifact.
  #[error("artifact store error: {0}")]
  Store(#[from] scriptorium_artifact::Error),
}

/// Assemble the final document described by `report` from `store`.
///
/// Metadata lines appear in the order supplied; artifact sections appear in
/// the order named.
pub async fn assemble(report: &ReportDef, store: &dyn Store) -> Result<String, AssemblyError> {
  let mut sections = Vec::with_capacity(report.artifact_names.len());
  for name in &report.artifact_names {
    let content = store.get(name).await.map_err(|e| match e {
      scriptorium_artifact::Error::NotFound(name) => AssemblyError::MissingArtifact(name),
      other => AssemblyError::Store(other),
    })?;
    sections.push(content);
  }

  let mut document = format!("# {}\n", report.title);

  if !report.metadata.is_empty() {
    document.push_str("\n## Metadata\n");
    for (key, value) in &report.metadata {
      document.push_str(&format!("{key}: {value}\n"));
    }
  }

  document.push('\n');
  document.push_str(&sections.join(SECTION_SEPARATOR));
  document.push('\n');

  info!(
    title = %report.title,
    sections = report.artifact_names.len(),
    "report_assembled"
  );

  Ok(document)
}
