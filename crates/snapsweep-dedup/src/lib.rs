//! Content-hash duplicate removal for snapsweep.
//!
//! Walks a directory tree in a fixed order (depth-first, each directory's
//! entries sorted by name), hashes every file with BLAKE3, and removes every
//! file whose content was already seen. The first file reached is the one
//! that survives.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use snapsweep_dedup::{DedupConfig, DeleteMode, Deduplicator};
//!
//! let config = DedupConfig::builder()
//!     .delete_mode(DeleteMode::DryRun)
//!     .build()
//!     .unwrap();
//!
//! let report = Deduplicator::with_config(config)
//!     .deduplicate(Path::new("/path/to/photos"))
//!     .unwrap();
//!
//! for dup in &report.duplicates {
//!     println!("{} duplicates {}", dup.path.display(), dup.original.display());
//! }
//! ```
//!
//! Deletion is immediate and permanent under the default [`DeleteMode::Remove`].
//! Use [`DeleteMode::Trash`] or [`DeleteMode::DryRun`] for something gentler.

mod config;
mod dedup;
mod error;
mod hash;
mod walker;

pub use config::{DedupConfig, DedupConfigBuilder, DeleteMode, ErrorPolicy};
pub use dedup::{DedupEvent, DedupReport, Deduplicator, RemovedDuplicate, deduplicate};
pub use error::{DedupError, DedupWarning, WarningKind};
pub use hash::{ContentHash, hash_bytes, hash_file};
pub use walker::SortedWalk;
