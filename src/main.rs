//! snapsweep - shrink photos under a size budget and sweep duplicate files.
//!
//! Usage:
//!   snapsweep compress <INPUT>            Fit one image under a size budget
//!   snapsweep compress-folder <FOLDER>    Compress every image in a folder
//!   snapsweep dedup [PATH]                Delete files with repeated content
//!   snapsweep --help                      Show help

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use snapsweep_compress::{BatchEvent, CompressConfig, CompressOutcome, Compressor};
use snapsweep_dedup::{DedupConfig, DedupEvent, DedupReport, DeleteMode, Deduplicator, ErrorPolicy};

#[derive(Parser)]
#[command(
    name = "snapsweep",
    version,
    about = "Shrink photos under a size budget and sweep duplicate files",
    long_about = "snapsweep has two independent tools.\n\n\
                  `compress` and `compress-folder` search for the highest JPEG quality \
                  that keeps each image under a byte budget.\n\
                  `dedup` walks a directory tree and deletes every file whose contents \
                  were already seen earlier in the walk."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress one image to fit under a size budget
    Compress {
        /// Image to compress
        input: PathBuf,

        /// Output path (defaults to <name>_compressed.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum output size (e.g., "10MB", "512KB")
        #[arg(short, long, default_value = "10MB")]
        max_size: String,
    },

    /// Compress every jpg/jpeg/png/bmp/webp image in a folder
    CompressFolder {
        /// Folder containing images
        folder: PathBuf,

        /// Output folder (defaults to <folder>/compressed)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum output size per image (e.g., "10MB", "512KB")
        #[arg(short, long, default_value = "10MB")]
        max_size: String,
    },

    /// Delete files whose contents duplicate an earlier file
    Dedup {
        /// Root to scan (prompted for when omitted)
        path: Option<PathBuf>,

        /// Move duplicates to the trash instead of deleting them
        #[arg(long, conflicts_with = "dry_run")]
        trash: bool,

        /// Only report what would be deleted
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Skip unreadable files instead of stopping
        #[arg(long)]
        skip_errors: bool,

        /// Glob patterns to leave alone (repeatable)
        #[arg(short, long = "exclude")]
        exclude: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Compress {
            input,
            output,
            max_size,
        } => {
            run_compress(&input, output.as_deref(), &max_size)?;
        }
        Command::CompressFolder {
            folder,
            output,
            max_size,
        } => {
            run_compress_folder(&folder, output.as_deref(), &max_size)?;
        }
        Command::Dedup {
            path,
            trash,
            dry_run,
            skip_errors,
            exclude,
            format,
        } => {
            let mode = if dry_run {
                DeleteMode::DryRun
            } else if trash {
                DeleteMode::Trash
            } else {
                DeleteMode::Remove
            };
            let on_error = if skip_errors {
                ErrorPolicy::Skip
            } else {
                ErrorPolicy::Abort
            };
            let config = DedupConfig::builder()
                .delete_mode(mode)
                .on_error(on_error)
                .exclude_patterns(exclude)
                .build()?;
            let root = match path {
                Some(p) => p,
                None => prompt_path("Please enter the path to find duplicates : ")?,
            };
            run_dedup(&root, config, format)?;
        }
    }

    Ok(())
}

/// Install a stderr subscriber; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Compress a single image.
fn run_compress(input: &Path, output: Option<&Path>, max_size: &str) -> Result<()> {
    let config = compress_config(max_size)?;
    let compressor = Compressor::with_config(config);

    let outcome = compressor
        .compress(input, output)
        .with_context(|| format!("Failed to compress {}", input.display()))?;

    print_outcome(&outcome);
    Ok(())
}

/// Compress every accepted image in a folder.
fn run_compress_folder(folder: &Path, output: Option<&Path>, max_size: &str) -> Result<()> {
    let config = compress_config(max_size)?;
    let compressor = Compressor::with_config(config);

    let report = compressor
        .compress_folder_with(folder, output, |event| match event {
            BatchEvent::Started { input_path } => {
                println!();
                println!("Processing: {}", file_name(input_path));
            }
            BatchEvent::Compressed(outcome) => print_outcome(outcome),
            BatchEvent::Failed(failure) => {
                println!("✗ Error processing {}: {}", failure.file_name(), failure.error);
            }
        })
        .with_context(|| format!("Failed to compress folder {}", folder.display()))?;

    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} compressed, {} failed -> {}",
        report.succeeded.len(),
        report.failed.len(),
        report.output_dir.display()
    );
    let over = report.over_budget().count();
    if over > 0 {
        println!(" {over} file(s) still over budget at the lowest quality");
    }
    println!("{}", "─".repeat(60));

    Ok(())
}

/// Remove duplicate files under a root.
fn run_dedup(root: &Path, config: DedupConfig, format: OutputFormat) -> Result<()> {
    let root = root.canonicalize().context("Invalid path")?;
    let destructive = config.delete_mode.is_destructive();
    let text = matches!(format, OutputFormat::Text);

    eprintln!("Scanning {}...", root.display());

    let deduplicator = Deduplicator::with_config(config);
    let report = deduplicator
        .deduplicate_with(&root, |event| {
            if !text {
                return;
            }
            match event {
                DedupEvent::Removed(dup) if destructive => {
                    println!("{} has been deleted", dup.path.display());
                }
                DedupEvent::Removed(dup) => println!("{} would be deleted", dup.path.display()),
                DedupEvent::Skipped(warning) => eprintln!("skipped: {}", warning.message),
                DedupEvent::Kept { .. } => {}
            }
        })
        .context("Deduplication failed")?;

    match format {
        OutputFormat::Text => print_dedup_summary(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn print_outcome(outcome: &CompressOutcome) {
    if outcome.within_budget {
        println!(
            "✓ Compressed to {:.2}MB with quality={}",
            outcome.size_mib(),
            outcome.quality
        );
    } else {
        println!(
            "✓ Compressed to {:.2}MB with quality={} (still over the {} budget)",
            outcome.size_mib(),
            outcome.quality,
            format_size(outcome.budget_bytes)
        );
    }
}

fn print_dedup_summary(report: &DedupReport) {
    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} files scanned, {} kept, {} duplicates",
        report.files_scanned,
        report.files_kept,
        report.duplicate_count()
    );
    let verb = if report.delete_mode.is_destructive() {
        "Reclaimed"
    } else {
        "Reclaimable"
    };
    println!(" {verb}: {}", format_size(report.bytes_reclaimed));
    if !report.warnings.is_empty() {
        println!(" {} file(s) skipped", report.warnings.len());
    }
    println!("{}", "─".repeat(60));
}

fn compress_config(max_size: &str) -> Result<CompressConfig> {
    let max_size_bytes = parse_size(max_size)?;
    if max_size_bytes == 0 {
        bail!("Maximum size must be greater than zero");
    }
    Ok(CompressConfig::builder().max_size_bytes(max_size_bytes).build()?)
}

/// Read a single path from stdin after printing `prompt`.
fn prompt_path(prompt: &str) -> Result<PathBuf> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        bail!("No path given");
    }
    Ok(PathBuf::from(trimmed))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a size string (e.g., "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let digits = |s: &str| -> Result<f64> {
        let num = s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');
        num.parse::<f64>().with_context(|| format!("Invalid size: {s}"))
    };

    let multiplier: u64 = if s.ends_with("GB") || s.ends_with('G') {
        1024 * 1024 * 1024
    } else if s.ends_with("MB") || s.ends_with('M') {
        1024 * 1024
    } else if s.ends_with("KB") || s.ends_with('K') {
        1024
    } else {
        1
    };
    let num = digits(&s)?;

    if num < 0.0 {
        bail!("Invalid size: {s}");
    }
    Ok((num * multiplier as f64) as u64)
}
