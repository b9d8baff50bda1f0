//! Compression configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// One mebibyte, the unit budgets are usually expressed in.
pub const MIB: u64 = 1024 * 1024;

/// Default byte budget (10 MiB).
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * MIB;

/// Extensions picked up by folder mode (compared case-insensitively).
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

/// Suffix inserted before the extension when no output path is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_compressed";

/// Subdirectory used by folder mode when no destination is given.
pub const DEFAULT_BATCH_DIR: &str = "compressed";

/// Configuration for compression runs.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CompressConfig {
    /// Largest acceptable output size in bytes.
    #[builder(default = "DEFAULT_MAX_SIZE_BYTES")]
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    /// Extensions accepted in folder mode, lowercase and without the dot.
    #[builder(default = "default_extensions()")]
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Suffix for derived single-file output names.
    #[builder(default = "DEFAULT_OUTPUT_SUFFIX.to_string()")]
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Destination subdirectory name for folder mode.
    #[builder(default = "DEFAULT_BATCH_DIR.to_string()")]
    #[serde(default = "default_batch_dir")]
    pub batch_dir: String,
}

fn default_max_size_bytes() -> u64 {
    DEFAULT_MAX_SIZE_BYTES
}

fn default_extensions() -> Vec<String> {
    ACCEPTED_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_output_suffix() -> String {
    DEFAULT_OUTPUT_SUFFIX.to_string()
}

fn default_batch_dir() -> String {
    DEFAULT_BATCH_DIR.to_string()
}

impl CompressConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_size_bytes == Some(0) {
            return Err("Size budget must be greater than zero".to_string());
        }
        if let Some(ref suffix) = self.output_suffix {
            if suffix.is_empty() {
                return Err("Output suffix cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl CompressConfig {
    /// Create a new config builder.
    pub fn builder() -> CompressConfigBuilder {
        CompressConfigBuilder::default()
    }

    /// Create a config with the given budget and defaults elsewhere.
    pub fn new(max_size_bytes: u64) -> Self {
        Self {
            max_size_bytes,
            ..Self::default()
        }
    }

    /// Check whether folder mode should pick up a file with this extension.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(ext))
    }
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            extensions: default_extensions(),
            output_suffix: default_output_suffix(),
            batch_dir: default_batch_dir(),
        }
    }
}
