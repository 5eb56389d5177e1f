//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docdelta_core::{CompareMode, Comparator};
use docdelta_model::{ChangeStatistics, DocumentModel};
use docdelta_ooxml::extract::SUPPORTED_EXTENSIONS;
use docdelta_ooxml::Extractor;
use glob::{glob, Pattern};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::report::ComparisonReport;
use crate::settings::{load_settings, Settings};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for tools and exporters
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "docdelta")]
#[command(author, version, about = "Structural diff for Word documents", long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare two DOCX files
    Compare {
        /// Earlier version
        before: PathBuf,

        /// Later version
        after: PathBuf,

        /// Comparison mode (positional or content)
        #[arg(short, long)]
        mode: Option<CompareMode>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Include unchanged blocks in the text report
        #[arg(long)]
        all: bool,

        /// Similarity threshold for pairing modified blocks
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Compare every DOCX or DOCM file in one directory with its namesake in another
    Batch {
        /// Directory with the earlier versions
        before_dir: PathBuf,

        /// Directory with the later versions
        after_dir: PathBuf,

        /// Comparison mode (positional or content)
        #[arg(short, long)]
        mode: Option<CompareMode>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Similarity threshold for pairing modified blocks
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Print the extracted document model as JSON
    Inspect {
        /// Input DOCX file
        input: PathBuf,

        /// Write the model to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI application
///
/// Parses the process arguments, installs logging and dispatches to the
/// appropriate command.
pub fn run_cli() -> Result<()> {
    run_cli_from(std::env::args_os())
}

/// [`run_cli`] over an explicit argument list
///
/// Argument errors and `--help` print the clap message and exit.
pub fn run_cli_from<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| e.exit());
    init_tracing(cli.verbose);
    run(cli)
}

/// Dispatch already parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compare {
            before,
            after,
            mode,
            format,
            output,
            config,
            all,
            threshold,
        } => {
            let settings = resolve_settings(config.as_deref(), mode, threshold)?;
            compare_command(&before, &after, &settings, format, output.as_deref(), all)?;
        }
        Commands::Batch {
            before_dir,
            after_dir,
            mode,
            format,
            config,
            threshold,
        } => {
            let settings = resolve_settings(config.as_deref(), mode, threshold)?;
            batch_command(&before_dir, &after_dir, &settings, format)?;
        }
        Commands::Inspect {
            input,
            output,
            config,
        } => {
            let settings = load_settings(config.as_deref())?;
            inspect_command(&input, &settings, output.as_deref())?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` selects targets; `verbose` raises the default level to debug.
pub fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Settings file overlaid with command-line overrides
fn resolve_settings(
    config: Option<&Path>,
    mode: Option<CompareMode>,
    threshold: Option<f64>,
) -> Result<Settings> {
    let mut settings = load_settings(config)?;
    if let Some(mode) = mode {
        settings.compare.mode = mode;
    }
    if let Some(threshold) = threshold {
        settings.compare.similarity_threshold = threshold;
    }
    settings
        .compare
        .validate()
        .context("Invalid comparison options")?;
    Ok(settings)
}

fn extract(extractor: &Extractor, path: &Path) -> Result<DocumentModel> {
    extractor
        .extract_file(path)
        .with_context(|| format!("Failed to extract document: {}", path.display()))
}

/// Execute the compare command
pub fn compare_command(
    before_path: &Path,
    after_path: &Path,
    settings: &Settings,
    format: OutputFormat,
    output: Option<&Path>,
    show_all: bool,
) -> Result<()> {
    let extractor = Extractor::new(settings.extract.clone());
    let before = extract(&extractor, before_path)?;
    let after = extract(&extractor, after_path)?;

    let comparator = Comparator::new(settings.compare.clone())?;
    let changes = comparator.compare(&before, &after).with_context(|| {
        format!(
            "Failed to compare {} with {}",
            before_path.display(),
            after_path.display()
        )
    })?;

    let before_name = before_path.display().to_string();
    let after_name = after_path.display().to_string();
    let report = ComparisonReport {
        before_name: &before_name,
        after_name: &after_name,
        mode: settings.compare.mode,
        before: &before,
        after: &after,
        changes: &changes,
    };

    let rendered = match format {
        OutputFormat::Text => report.to_text(show_all),
        OutputFormat::Json => report
            .to_json()
            .context("Failed to serialize report to JSON")?,
    };
    emit(&rendered, output)
}

/// Outcome of one document pair in a batch
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ChangeStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Matched and unmatched file names of a batch
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchPlan {
    /// Name, before path, after path
    pub pairs: Vec<(String, PathBuf, PathBuf)>,
    /// Present only in the before directory
    pub missing_after: Vec<String>,
    /// Present only in the after directory
    pub missing_before: Vec<String>,
}

/// Pair `*.docx` and `*.docm` files of two directories by file name
pub fn plan_batch(before_dir: &Path, after_dir: &Path) -> Result<BatchPlan> {
    let before = document_files(before_dir)?;
    let mut after = document_files(after_dir)?;

    let mut plan = BatchPlan::default();
    for (name, before_path) in before {
        match after.remove(&name) {
            Some(after_path) => plan.pairs.push((name, before_path, after_path)),
            None => plan.missing_after.push(name),
        }
    }
    plan.missing_before = after.into_keys().collect();
    Ok(plan)
}

fn document_files(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Directory not found: {}", dir.display());
    }

    let root = Pattern::escape(&dir.display().to_string());
    let mut files = BTreeMap::new();
    for extension in SUPPORTED_EXTENSIONS {
        let pattern = format!("{}/*.{}", root, extension);
        for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))? {
            match entry {
                Ok(path) => {
                    let name = path.file_name().and_then(|n| n.to_str()).map(str::to_string);
                    if let Some(name) = name {
                        files.insert(name, path);
                    }
                }
                Err(e) => warn!("Could not read {}", e),
            }
        }
    }
    Ok(files)
}

/// Execute the batch command
pub fn batch_command(
    before_dir: &Path,
    after_dir: &Path,
    settings: &Settings,
    format: OutputFormat,
) -> Result<()> {
    let plan = plan_batch(before_dir, after_dir)?;
    let entries = run_batch(&plan, settings)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&entries)
                .context("Failed to serialize batch results to JSON")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            println!(
                "Comparing {} -> {}",
                before_dir.display(),
                after_dir.display()
            );
            println!();
            for entry in &entries {
                println!("{}", batch_line(entry));
            }
            for name in &plan.missing_after {
                println!("{}: missing in {}", name, after_dir.display());
            }
            for name in &plan.missing_before {
                println!("{}: missing in {}", name, before_dir.display());
            }
        }
    }

    let failed = entries.iter().filter(|e| e.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!(
            "{} of {} document pairs could not be compared",
            failed,
            entries.len()
        );
    }
    Ok(())
}

/// Extract and compare every planned pair in parallel
pub fn run_batch(plan: &BatchPlan, settings: &Settings) -> Result<Vec<BatchEntry>> {
    let comparator = Comparator::new(settings.compare.clone())?;
    let extractor = Extractor::new(settings.extract.clone());

    let extracted: Vec<Result<(DocumentModel, DocumentModel)>> = plan
        .pairs
        .par_iter()
        .map(|(_, before, after)| -> Result<(DocumentModel, DocumentModel)> {
            Ok((extract(&extractor, before)?, extract(&extractor, after)?))
        })
        .collect();

    let mut models = Vec::new();
    let mut extraction_errors = Vec::new();
    for result in extracted {
        match result {
            Ok(pair) => {
                models.push(pair);
                extraction_errors.push(None);
            }
            Err(e) => extraction_errors.push(Some(format!("{:#}", e))),
        }
    }

    let mut compared = comparator.compare_many(&models).into_iter();
    let entries: Vec<BatchEntry> = plan
        .pairs
        .iter()
        .zip(extraction_errors)
        .map(|((name, _, _), error)| match error {
            Some(error) => BatchEntry {
                name: name.clone(),
                statistics: None,
                error: Some(error),
            },
            None => match compared.next() {
                Some(Ok(changes)) => BatchEntry {
                    name: name.clone(),
                    statistics: Some(changes.statistics()),
                    error: None,
                },
                Some(Err(e)) => BatchEntry {
                    name: name.clone(),
                    statistics: None,
                    error: Some(e.to_string()),
                },
                None => BatchEntry {
                    name: name.clone(),
                    statistics: None,
                    error: Some("comparison result missing".to_string()),
                },
            },
        })
        .collect();

    info!(pairs = entries.len(), "batch comparison complete");
    Ok(entries)
}

fn batch_line(entry: &BatchEntry) -> String {
    match (&entry.statistics, &entry.error) {
        (_, Some(error)) => format!("{}: failed: {}", entry.name, error),
        (Some(stats), None) if stats.counts.changed() == 0 => {
            format!("{}: no differences", entry.name)
        }
        (Some(stats), None) => format!(
            "{}: {} changes ({} inserted, {} deleted, {} modified, {} moved)",
            entry.name,
            stats.counts.changed(),
            stats.counts.inserted,
            stats.counts.deleted,
            stats.counts.modified,
            stats.counts.moved
        ),
        (None, None) => format!("{}: no result", entry.name),
    }
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, settings: &Settings, output: Option<&Path>) -> Result<()> {
    let extractor = Extractor::new(settings.extract.clone());
    let model = extract(&extractor, input)?;
    let json = serde_json::to_string_pretty(&model).context("Failed to serialize model to JSON")?;
    emit(&json, output)
}

/// Print to stdout or write to a file
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_compare() {
        let args = vec![
            "docdelta",
            "compare",
            "v1.docx",
            "v2.docx",
            "--mode",
            "content",
            "--format",
            "json",
            "--threshold",
            "0.7",
            "--all",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Compare {
                before,
                after,
                mode,
                format,
                all,
                threshold,
                ..
            } => {
                assert_eq!(before, PathBuf::from("v1.docx"));
                assert_eq!(after, PathBuf::from("v2.docx"));
                assert_eq!(mode, Some(CompareMode::ContentBased));
                assert_eq!(format, OutputFormat::Json);
                assert!(all);
                assert_eq!(threshold, Some(0.7));
            }
            _ => panic!("Expected Compare command"),
        }
    }

    #[test]
    fn test_cli_parse_compare_defaults() {
        let cli = Cli::try_parse_from(["docdelta", "compare", "a.docx", "b.docx"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Commands::Compare {
                mode, format, all, ..
            } => {
                assert_eq!(mode, None);
                assert_eq!(format, OutputFormat::Text);
                assert!(!all);
            }
            _ => panic!("Expected Compare command"),
        }
    }

    #[test]
    fn test_cli_parse_unknown_mode() {
        assert!(
            Cli::try_parse_from(["docdelta", "compare", "a.docx", "b.docx", "-m", "fuzzy"])
                .is_err()
        );
    }

    #[test]
    fn test_cli_parse_batch() {
        let cli =
            Cli::try_parse_from(["docdelta", "batch", "old", "new", "--verbose"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Batch {
                before_dir,
                after_dir,
                ..
            } => {
                assert_eq!(before_dir, PathBuf::from("old"));
                assert_eq!(after_dir, PathBuf::from("new"));
            }
            _ => panic!("Expected Batch command"),
        }
    }

    #[test]
    fn test_cli_parse_inspect() {
        let cli = Cli::try_parse_from(["docdelta", "inspect", "a.docx", "-o", "a.json"]).unwrap();
        match cli.command {
            Commands::Inspect { input, output, .. } => {
                assert_eq!(input, PathBuf::from("a.docx"));
                assert_eq!(output, Some(PathBuf::from("a.json")));
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_threshold_override_validated() {
        let err = resolve_settings(None, None, Some(3.0)).unwrap_err();
        assert!(err.to_string().contains("Invalid comparison options"));
    }

    #[test]
    fn test_batch_line() {
        let entry = BatchEntry {
            name: "a.docx".to_string(),
            statistics: None,
            error: Some("broken".to_string()),
        };
        assert_eq!(batch_line(&entry), "a.docx: failed: broken");
    }
}
