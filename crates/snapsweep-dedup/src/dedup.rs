//! First-seen-wins duplicate removal.
//!
//! Every file under the root is hashed in traversal order. The first path
//! seen for a hash is kept; every later path with the same hash is disposed
//! of immediately according to [`DeleteMode`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{DedupConfig, DeleteMode, ErrorPolicy};
use crate::error::{DedupError, DedupWarning, WarningKind};
use crate::hash::{ContentHash, hash_file};
use crate::walker::SortedWalk;

/// A duplicate that was removed (or would be, in a dry run).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedDuplicate {
    /// The duplicate.
    pub path: PathBuf,
    /// The earlier file with the same content that was kept.
    pub original: PathBuf,
    /// Shared content hash.
    pub hash: ContentHash,
    /// Size in bytes.
    pub size: u64,
}

/// Results from a deduplication run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupReport {
    /// Root that was walked.
    pub root: PathBuf,
    /// How duplicates were disposed of.
    pub delete_mode: DeleteMode,
    /// Files hashed.
    pub files_scanned: u64,
    /// Files kept as the first of their hash.
    pub files_kept: u64,
    /// Duplicates in the order they were handled.
    pub duplicates: Vec<RemovedDuplicate>,
    /// Bytes freed by the disposed duplicates.
    pub bytes_reclaimed: u64,
    /// Problems skipped under [`ErrorPolicy::Skip`].
    pub warnings: Vec<DedupWarning>,
}

impl DedupReport {
    fn new(root: &Path, delete_mode: DeleteMode) -> Self {
        Self {
            root: root.to_path_buf(),
            delete_mode,
            files_scanned: 0,
            files_kept: 0,
            duplicates: Vec::new(),
            bytes_reclaimed: 0,
            warnings: Vec::new(),
        }
    }

    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Number of duplicates handled.
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }
}

/// Notifications emitted while a run progresses.
#[derive(Debug)]
pub enum DedupEvent<'a> {
    /// First file seen with this hash; kept.
    Kept { path: &'a Path, hash: ContentHash },
    /// A duplicate was disposed of.
    Removed(&'a RemovedDuplicate),
    /// A file was skipped because of an error.
    Skipped(&'a DedupWarning),
}

/// Removes files whose content was already seen earlier in the walk.
///
/// Holds one table entry per distinct content hash for the whole run, so
/// memory grows with the number of unique files under the root.
pub struct Deduplicator {
    config: DedupConfig,
}

impl Deduplicator {
    /// Create a deduplicator with default config (permanent deletion, abort
    /// on error).
    pub fn new() -> Self {
        Self {
            config: DedupConfig::default(),
        }
    }

    /// Create a deduplicator with custom config.
    pub fn with_config(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Get the active configuration.
    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Walk `root` and dispose of every repeated file.
    pub fn deduplicate(&self, root: &Path) -> Result<DedupReport, DedupError> {
        self.deduplicate_with(root, |_| {})
    }

    /// Like [`deduplicate`](Self::deduplicate), reporting each step to
    /// `on_event` as it happens.
    pub fn deduplicate_with<F>(
        &self,
        root: &Path,
        mut on_event: F,
    ) -> Result<DedupReport, DedupError>
    where
        F: FnMut(DedupEvent<'_>),
    {
        let walk = SortedWalk::new(root, &self.config)?;
        let mut report = DedupReport::new(root, self.config.delete_mode);
        let mut seen: HashMap<ContentHash, PathBuf> = HashMap::new();

        for item in walk {
            let path = match item {
                Ok(p) => p,
                Err(err) => {
                    self.handle_error(err, WarningKind::ReadError, &mut report, &mut on_event)?;
                    continue;
                }
            };

            let (hash, size) = match hash_file(&path) {
                Ok(h) => h,
                Err(err) => {
                    self.handle_error(err, WarningKind::ReadError, &mut report, &mut on_event)?;
                    continue;
                }
            };
            report.files_scanned += 1;
            tracing::debug!(path = %path.display(), %hash, size, "hashed");

            match seen.entry(hash) {
                Entry::Vacant(slot) => {
                    report.files_kept += 1;
                    on_event(DedupEvent::Kept { path: &path, hash });
                    slot.insert(path);
                }
                Entry::Occupied(slot) => {
                    if let Err(err) = self.dispose(&path) {
                        self.handle_error(
                            err,
                            WarningKind::DeleteError,
                            &mut report,
                            &mut on_event,
                        )?;
                        continue;
                    }
                    tracing::info!(
                        path = %path.display(),
                        original = %slot.get().display(),
                        mode = ?self.config.delete_mode,
                        "duplicate removed"
                    );
                    let duplicate = RemovedDuplicate {
                        path,
                        original: slot.get().clone(),
                        hash,
                        size,
                    };
                    report.bytes_reclaimed += size;
                    on_event(DedupEvent::Removed(&duplicate));
                    report.duplicates.push(duplicate);
                }
            }
        }

        Ok(report)
    }

    fn dispose(&self, path: &Path) -> Result<(), DedupError> {
        match self.config.delete_mode {
            DeleteMode::Remove => std::fs::remove_file(path).map_err(|e| DedupError::io(path, e)),
            DeleteMode::Trash => trash::delete(path).map_err(|e| DedupError::Trash {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            DeleteMode::DryRun => Ok(()),
        }
    }

    fn handle_error<F>(
        &self,
        err: DedupError,
        kind: WarningKind,
        report: &mut DedupReport,
        on_event: &mut F,
    ) -> Result<(), DedupError>
    where
        F: FnMut(DedupEvent<'_>),
    {
        match self.config.on_error {
            ErrorPolicy::Abort => Err(err),
            ErrorPolicy::Skip => {
                tracing::warn!(error = %err, "skipping");
                let warning = DedupWarning::from_error(&err, kind);
                on_event(DedupEvent::Skipped(&warning));
                report.warnings.push(warning);
                Ok(())
            }
        }
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk `root` with default settings and delete every repeated file.
pub fn deduplicate(root: &Path) -> Result<DedupReport, DedupError> {
    Deduplicator::new().deduplicate(root)
}
