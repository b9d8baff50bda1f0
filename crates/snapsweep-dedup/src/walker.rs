//! Deterministic directory traversal.

use std::path::{Path, PathBuf};

use globset::GlobSet;
use jwalk::{DirEntry, Parallelism, WalkDir};

use crate::config::DedupConfig;
use crate::error::DedupError;

/// Serial, sorted walk over every regular file under a root.
///
/// Directories are visited depth-first and the entries of each directory in
/// file-name order, so the same tree always yields the same sequence.
pub struct SortedWalk {
    root: PathBuf,
    excludes: GlobSet,
    inner: Box<dyn Iterator<Item = Result<DirEntry<((), ())>, jwalk::Error>>>,
}

impl SortedWalk {
    /// Start a walk at `root` using the traversal options in `config`.
    pub fn new(root: &Path, config: &DedupConfig) -> Result<Self, DedupError> {
        let metadata = std::fs::metadata(root).map_err(|e| DedupError::io(root, e))?;
        if !metadata.is_dir() {
            return Err(DedupError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        let inner = WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(!config.include_hidden)
            .follow_links(config.follow_symlinks);

        Ok(Self {
            root: root.to_path_buf(),
            excludes: config.exclude_set()?,
            inner: Box::new(inner.into_iter()),
        })
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.excludes.is_empty() {
            return false;
        }
        let by_name = path
            .file_name()
            .is_some_and(|name| self.excludes.is_match(name));
        let by_relative = path
            .strip_prefix(&self.root)
            .is_ok_and(|rel| self.excludes.is_match(rel));
        by_name || by_relative
    }
}

impl Iterator for SortedWalk {
    type Item = Result<PathBuf, DedupError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Err(DedupError::Walk {
                        path,
                        message: err.to_string(),
                    }));
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if self.is_excluded(&path) {
                tracing::debug!(path = %path.display(), "excluded");
                continue;
            }
            return Some(Ok(path));
        }
    }
}
