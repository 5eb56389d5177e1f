//! Error types for document extraction

use thiserror::Error;

/// Errors that can occur while turning a DOCX container into a document model
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Error reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt or unreadable ZIP container
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Corrupt XML part
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required part not found in the container
    #[error("Required part not found: {0}")]
    MissingPart(String),

    /// Embedded part referenced by the document but not readable
    #[error("Unreadable embedded part {part}: {reason}")]
    UnreadablePart { part: String, reason: String },

    /// Not a supported document format
    #[error("Unsupported document: {0}")]
    Unsupported(String),

    /// Input file exceeds the configured size limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    /// Document exceeds a configured element count limit
    #[error("Too many {what}: {count} (limit {limit})")]
    LimitExceeded {
        what: &'static str,
        count: usize,
        limit: usize,
    },
}

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractionError>;
