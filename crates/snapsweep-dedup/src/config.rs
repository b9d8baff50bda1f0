//! Deduplication configuration types.

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::DedupError;

/// What to do with a file once it is known to be a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeleteMode {
    /// Delete permanently, immediately.
    #[default]
    Remove,
    /// Move to the platform trash.
    Trash,
    /// Report only; leave the file in place.
    DryRun,
}

impl DeleteMode {
    /// Check if this mode touches the filesystem.
    pub fn is_destructive(self) -> bool {
        !matches!(self, Self::DryRun)
    }
}

/// What to do when a file cannot be read or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Stop the run with the error.
    #[default]
    Abort,
    /// Record a warning and carry on.
    Skip,
}

/// Configuration for a deduplication run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct DedupConfig {
    /// How duplicates are disposed of.
    #[builder(default)]
    #[serde(default)]
    pub delete_mode: DeleteMode,

    /// How unreadable files and failed deletions are handled.
    #[builder(default)]
    #[serde(default)]
    pub on_error: ErrorPolicy,

    /// Glob patterns for files to leave out (matched against the file name
    /// and the path relative to the root).
    #[builder(default)]
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Include hidden files and directories (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Follow symbolic links.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            delete_mode: DeleteMode::Remove,
            on_error: ErrorPolicy::Abort,
            exclude_patterns: Vec::new(),
            include_hidden: true,
            follow_symlinks: false,
        }
    }
}

impl DedupConfig {
    /// Create a new config builder.
    pub fn builder() -> DedupConfigBuilder {
        DedupConfigBuilder::default()
    }

    /// Compile the exclude patterns.
    pub fn exclude_set(&self) -> Result<GlobSet, DedupError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude_patterns {
            let glob = Glob::new(pattern).map_err(|e| DedupError::InvalidConfig {
                message: format!("bad exclude pattern {pattern:?}: {e}"),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| DedupError::InvalidConfig {
            message: e.to_string(),
        })
    }
}
