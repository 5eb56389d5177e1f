//! docdelta CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docdelta, including:
//! - Compare: Structural diff of two DOCX files as a text or JSON report
//! - Batch: Compare two directories of DOCX files pair by pair
//! - Inspect: Dump the extracted document model as JSON
//!
//! # Library Usage
//!
//! ```ignore
//! use docdelta_cli::{compare_command, load_settings, OutputFormat};
//!
//! let settings = load_settings(None)?;
//! compare_command(&before, &after, &settings, OutputFormat::Json, None, false)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Compare two revisions
//! docdelta compare v1.docx v2.docx
//!
//! # Ignore block order, write JSON
//! docdelta compare v1.docx v2.docx --mode content --format json --output diff.json
//!
//! # Compare two release folders
//! docdelta batch release-1/ release-2/
//! ```

pub mod app;
pub mod report;
pub mod settings;

// Re-export main entry point and types
pub use app::{
    batch_command, compare_command, init_tracing, inspect_command, plan_batch, run, run_batch,
};
pub use app::{run_cli, run_cli_from, BatchEntry, BatchPlan, Cli, OutputFormat};
pub use report::ComparisonReport;
pub use settings::{load_settings, Settings};
