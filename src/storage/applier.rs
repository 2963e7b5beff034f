//! Applying delta files to specification files.
//!
//! The [`Applier`] wraps the pure merge functions in
//! [`crate::domain::merge`] with reading and writing. Its public methods never
//! fail: every error is folded into the returned [`ApplyOutcome`] or
//! [`Applicability`].

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::instrument;

use crate::{
    domain::{Applicability, MergeError, apply_delta_text, check_applicability},
    storage::{FileStore, TextSink, TextSource},
};

/// The result of [`Applier::apply_delta`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyOutcome {
    /// Whether the merged specification was written.
    pub success: bool,
    /// A human-readable description of what happened.
    pub message: String,
}

impl ApplyOutcome {
    fn success(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

/// Errors that can occur while applying a delta file.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// The delta file could not be read.
    #[error("failed to read delta {}: {source}", path.display())]
    ReadDelta {
        /// The delta path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The baseline exists but could not be read.
    #[error("failed to read baseline {}: {source}", path.display())]
    ReadBaseline {
        /// The baseline path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The merged specification is structurally invalid.
    #[error(transparent)]
    Merge(#[from] MergeError),
    /// The merged specification could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The output path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// Applies delta documents to baseline specifications.
#[derive(Debug, Clone, Default)]
pub struct Applier<S = FileStore> {
    store: S,
}

impl Applier<FileStore> {
    /// Creates an applier over the local filesystem.
    #[must_use]
    pub const fn new() -> Self {
        Self { store: FileStore }
    }
}

impl<S> Applier<S>
where
    S: TextSource + TextSink,
{
    /// Creates an applier that reads and writes through `store`.
    #[must_use]
    pub const fn with_store(store: S) -> Self {
        Self { store }
    }

    /// Merges the delta at `delta` into the baseline at `baseline` and writes
    /// the result to `output`.
    ///
    /// A missing baseline is treated as an empty specification. Nothing is
    /// written unless the merged specification is structurally valid.
    #[instrument(level = "debug", skip(self))]
    pub fn apply_delta(&self, baseline: &Path, delta: &Path, output: &Path) -> ApplyOutcome {
        match self.try_apply_delta(baseline, delta, output) {
            Ok(()) => {
                tracing::info!("Applied {} to {}", delta.display(), output.display());
                ApplyOutcome::success(format!("Delta applied successfully to {}", output.display()))
            }
            Err(e) => {
                tracing::warn!("Failed to apply {}: {e}", delta.display());
                ApplyOutcome::failure(format!("Failed to apply delta: {e}"))
            }
        }
    }

    /// Like [`Applier::apply_delta`], but returns the error.
    ///
    /// # Errors
    ///
    /// Returns an error if either input cannot be read, if the merged
    /// specification fails validation, or if the output cannot be written.
    pub fn try_apply_delta(
        &self,
        baseline: &Path,
        delta: &Path,
        output: &Path,
    ) -> Result<(), ApplyError> {
        let merged = self.merge(baseline, delta)?;
        self.store
            .write(output, &merged)
            .map_err(|source| ApplyError::Write {
                path: output.to_path_buf(),
                source,
            })
    }

    /// Merges the delta into the baseline without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if either input cannot be read or if the merged
    /// specification fails validation.
    pub fn merge(&self, baseline: &Path, delta: &Path) -> Result<String, ApplyError> {
        let (baseline_text, delta_text) = self.read(baseline, delta)?;
        Ok(apply_delta_text(baseline_text.as_deref(), &delta_text)?)
    }

    /// Checks, without merging or writing, that every operation in the delta
    /// targets a requirement that exists in the baseline.
    #[instrument(level = "debug", skip(self))]
    pub fn validate_delta_application(&self, baseline: &Path, delta: &Path) -> Applicability {
        match self.read(baseline, delta) {
            Ok((baseline_text, delta_text)) => {
                check_applicability(baseline_text.as_deref(), &delta_text)
            }
            Err(e) => {
                tracing::warn!("Failed to check {}: {e}", delta.display());
                Applicability::from_issues(vec![format!(
                    "Failed to validate delta application: {e}"
                )])
            }
        }
    }

    fn read(&self, baseline: &Path, delta: &Path) -> Result<(Option<String>, String), ApplyError> {
        let delta_text = self
            .store
            .read_delta(delta)
            .map_err(|source| ApplyError::ReadDelta {
                path: delta.to_path_buf(),
                source,
            })?;
        let baseline_text =
            self.store
                .read_baseline(baseline)
                .map_err(|source| ApplyError::ReadBaseline {
                    path: baseline.to_path_buf(),
                    source,
                })?;
        Ok((baseline_text, delta_text))
    }
}
