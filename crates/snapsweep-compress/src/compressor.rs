//! Single-image compression to a byte budget.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader, RgbImage};
use serde::{Deserialize, Serialize};

use crate::config::CompressConfig;
use crate::encoder::{JfifEncoder, JpegEncode};
use crate::error::CompressError;
use crate::normalize::to_opaque_rgb;
use crate::search::{Probe, Quality, search_quality};

/// Outcome of compressing one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressOutcome {
    /// Source image.
    pub input_path: PathBuf,
    /// Where the JPEG was written.
    pub output_path: PathBuf,
    /// Quality the file was written at.
    pub quality: Quality,
    /// Size of the written file in bytes.
    pub size_bytes: u64,
    /// Budget the search ran against.
    pub budget_bytes: u64,
    /// False when even `Quality::MIN` was over budget. Still a success.
    pub within_budget: bool,
    /// True when no search was needed.
    pub fast_path: bool,
    /// Probes taken, in order.
    pub probes: Vec<Probe>,
}

impl CompressOutcome {
    /// Size of the written file in MiB.
    pub fn size_mib(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Compresses images to fit under a byte budget.
pub struct Compressor<E = JfifEncoder> {
    config: CompressConfig,
    encoder: E,
}

impl Compressor<JfifEncoder> {
    /// Create a compressor with default config (10 MiB budget).
    pub fn new() -> Self {
        Self::with_config(CompressConfig::default())
    }

    /// Create a compressor with custom config.
    pub fn with_config(config: CompressConfig) -> Self {
        Self {
            config,
            encoder: JfifEncoder::optimized(),
        }
    }
}

impl Default for Compressor<JfifEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: JpegEncode> Compressor<E> {
    /// Create a compressor with a custom encoder backend.
    pub fn with_encoder(config: CompressConfig, encoder: E) -> Self {
        Self { config, encoder }
    }

    /// Get the active configuration.
    pub fn config(&self) -> &CompressConfig {
        &self.config
    }

    /// Compress `input` to JPEG, writing to `output` or a derived
    /// `<stem>_compressed.<ext>` path next to the input.
    ///
    /// Succeeds with `within_budget == false` when the budget cannot be met
    /// even at the lowest quality.
    pub fn compress(
        &self,
        input: &Path,
        output: Option<&Path>,
    ) -> Result<CompressOutcome, CompressError> {
        let budget = self.config.max_size_bytes;
        if budget == 0 {
            return Err(CompressError::InvalidBudget {
                max_size_bytes: budget,
            });
        }

        let output_path = match output {
            Some(path) => path.to_path_buf(),
            None => derive_output_path(input, &self.config.output_suffix),
        };

        let rgb = to_opaque_rgb(decode(input)?);

        // Keep the most recent encoding so the final write can reuse it.
        let mut last: Option<(Quality, Vec<u8>)> = None;
        let search = search_quality(budget, |quality| -> Result<u64, CompressError> {
            let bytes = self.encode_at(&rgb, quality, input)?;
            let len = bytes.len() as u64;
            last = Some((quality, bytes));
            Ok(len)
        })?;

        let bytes = match last {
            Some((quality, bytes)) if quality == search.quality => bytes,
            _ => self.encode_at(&rgb, search.quality, input)?,
        };
        let size_bytes = bytes.len() as u64;

        std::fs::write(&output_path, &bytes).map_err(|e| CompressError::io(&output_path, e))?;

        let within_budget = size_bytes <= budget;
        if within_budget {
            tracing::info!(
                input = %input.display(),
                output = %output_path.display(),
                quality = search.quality.get(),
                size_bytes,
                "compressed"
            );
        } else {
            tracing::warn!(
                input = %input.display(),
                size_bytes,
                budget,
                "still over budget at lowest quality"
            );
        }

        Ok(CompressOutcome {
            input_path: input.to_path_buf(),
            output_path,
            quality: search.quality,
            size_bytes,
            budget_bytes: budget,
            within_budget,
            fast_path: search.fast_path,
            probes: search.probes,
        })
    }

    fn encode_at(
        &self,
        rgb: &RgbImage,
        quality: Quality,
        input: &Path,
    ) -> Result<Vec<u8>, CompressError> {
        self.encoder
            .encode(rgb, quality)
            .map_err(|source| CompressError::Encode {
                path: input.to_path_buf(),
                quality: quality.get(),
                source,
            })
    }
}

/// Compress one image with the default encoder and return the output path.
pub fn compress(
    input: &Path,
    output: Option<&Path>,
    max_size_bytes: u64,
) -> Result<PathBuf, CompressError> {
    if max_size_bytes == 0 {
        return Err(CompressError::InvalidBudget { max_size_bytes });
    }
    let compressor = Compressor::with_config(CompressConfig::new(max_size_bytes));
    compressor.compress(input, output).map(|o| o.output_path)
}

/// Decode an image, sniffing the format from its contents.
pub fn decode(path: &Path) -> Result<DynamicImage, CompressError> {
    let reader = ImageReader::open(path)
        .map_err(|e| CompressError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| CompressError::io(path, e))?;
    reader.decode().map_err(|e| CompressError::decode(path, e))
}

/// Insert `suffix` between a path's stem and extension.
///
/// `photos/cat.png` with `_compressed` becomes `photos/cat_compressed.png`.
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = input.file_stem().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}
