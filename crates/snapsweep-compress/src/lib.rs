//! JPEG size-budget compression for snapsweep.
//!
//! Given an image and a byte budget, [`Compressor`] finds the highest JPEG
//! quality in `[10, 95]` whose encoded size fits:
//!
//! 1. Decode and normalize to opaque RGB (alpha is flattened onto white)
//! 2. Encode at quality 95; stop if that already fits
//! 3. Otherwise binary-search the quality range
//! 4. Write the file once at the best quality found (10 if nothing fits)
//!
//! ```rust,no_run
//! use std::path::Path;
//! use snapsweep_compress::{CompressConfig, Compressor, MIB};
//!
//! let compressor = Compressor::with_config(CompressConfig::new(5 * MIB));
//! let outcome = compressor.compress(Path::new("photo.png"), None).unwrap();
//! println!("quality {} -> {} bytes", outcome.quality, outcome.size_bytes);
//! ```
//!
//! Folder mode applies the same search to every accepted image in a
//! directory and keeps going past per-file failures:
//!
//! ```rust,no_run
//! use std::path::Path;
//! use snapsweep_compress::Compressor;
//!
//! let report = Compressor::new().compress_folder(Path::new("photos"), None).unwrap();
//! println!("{} ok, {} failed", report.succeeded.len(), report.failed.len());
//! ```

mod batch;
mod compressor;
mod config;
mod encoder;
mod error;
mod normalize;
mod search;

pub use batch::{BatchEvent, BatchFailure, BatchReport};
pub use compressor::{CompressOutcome, Compressor, compress, decode, derive_output_path};
pub use config::{
    ACCEPTED_EXTENSIONS, CompressConfig, CompressConfigBuilder, DEFAULT_BATCH_DIR,
    DEFAULT_MAX_SIZE_BYTES, DEFAULT_OUTPUT_SUFFIX, MIB,
};
pub use encoder::{JfifEncoder, JpegEncode};
pub use error::CompressError;
pub use normalize::{BACKGROUND, composite_over, to_opaque_rgb};
pub use search::{Probe, Quality, SearchOutcome, search_quality};
