//! Folder mode: compress every accepted image in a directory.

use std::path::{Path, PathBuf};

use crate::compressor::{CompressOutcome, Compressor};
use crate::encoder::JpegEncode;
use crate::error::CompressError;

/// A file that could not be compressed.
#[derive(Debug)]
pub struct BatchFailure {
    /// Source file.
    pub input_path: PathBuf,
    /// What went wrong.
    pub error: CompressError,
}

impl BatchFailure {
    /// File name of the source, for display.
    pub fn file_name(&self) -> String {
        file_name_lossy(&self.input_path)
    }
}

/// Per-file notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// About to process this file.
    Started { input_path: &'a Path },
    /// File written successfully.
    Compressed(&'a CompressOutcome),
    /// File failed; the batch continues.
    Failed(&'a BatchFailure),
}

/// Results of a folder run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Directory outputs were written to.
    pub output_dir: PathBuf,
    /// Files that were compressed (possibly over budget).
    pub succeeded: Vec<CompressOutcome>,
    /// Files that failed.
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of candidate files processed.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Check if every file compressed.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    /// Outputs that could not be brought under budget.
    pub fn over_budget(&self) -> impl Iterator<Item = &CompressOutcome> {
        self.succeeded.iter().filter(|o| !o.within_budget)
    }
}

impl<E: JpegEncode> Compressor<E> {
    /// Compress every accepted image directly inside `folder`.
    ///
    /// Outputs are named `<stem>.jpg` inside `output_dir` (default
    /// `<folder>/compressed`), which is created if missing. Files are visited
    /// in file-name order. Only listing the folder or creating the output
    /// directory can fail the whole call; per-file errors land in
    /// [`BatchReport::failed`].
    pub fn compress_folder(
        &self,
        folder: &Path,
        output_dir: Option<&Path>,
    ) -> Result<BatchReport, CompressError> {
        self.compress_folder_with(folder, output_dir, |_| {})
    }

    /// Like [`compress_folder`](Self::compress_folder), reporting each step to
    /// `on_event` as it happens.
    pub fn compress_folder_with<F>(
        &self,
        folder: &Path,
        output_dir: Option<&Path>,
        mut on_event: F,
    ) -> Result<BatchReport, CompressError>
    where
        F: FnMut(BatchEvent<'_>),
    {
        if !folder.is_dir() {
            return Err(CompressError::NotADirectory {
                path: folder.to_path_buf(),
            });
        }

        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => folder.join(&self.config().batch_dir),
        };
        std::fs::create_dir_all(&output_dir).map_err(|e| CompressError::io(&output_dir, e))?;

        let inputs = self.collect_inputs(folder)?;
        tracing::debug!(folder = %folder.display(), count = inputs.len(), "batch inputs");

        let mut report = BatchReport {
            output_dir: output_dir.clone(),
            ..Default::default()
        };

        for input in inputs {
            on_event(BatchEvent::Started { input_path: &input });

            let output = output_dir.join(jpg_name(&input));
            match self.compress(&input, Some(&output)) {
                Ok(outcome) => {
                    on_event(BatchEvent::Compressed(&outcome));
                    report.succeeded.push(outcome);
                }
                Err(error) => {
                    tracing::warn!(input = %input.display(), %error, "compression failed");
                    let failure = BatchFailure {
                        input_path: input,
                        error,
                    };
                    on_event(BatchEvent::Failed(&failure));
                    report.failed.push(failure);
                }
            }
        }

        Ok(report)
    }

    /// List files in `folder` with an accepted extension, sorted by name.
    fn collect_inputs(&self, folder: &Path) -> Result<Vec<PathBuf>, CompressError> {
        let entries = std::fs::read_dir(folder).map_err(|e| CompressError::io(folder, e))?;

        let mut inputs = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(folder = %folder.display(), %err, "skipping unreadable entry");
                    continue;
                }
            };

            let path = entry.path();
            let accepted = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.config().accepts_extension(ext));
            if accepted && !path.is_dir() {
                inputs.push(path);
            }
        }

        inputs.sort();
        Ok(inputs)
    }
}

/// `<stem>.jpg` for an input path.
fn jpg_name(input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".jpg");
    PathBuf::from(name)
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
