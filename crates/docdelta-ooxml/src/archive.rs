//! Archive handling for DOCX files
//!
//! DOCX files are ZIP archives containing XML parts and media resources.
//! The whole archive is unpacked into memory once; extraction then works on
//! byte slices.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use zip::read::ZipArchive;

use crate::error::{ExtractionError, Result};

/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Style definitions part
pub const STYLES_PART: &str = "word/styles.xml";
/// Relationships of the main document part
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// An unpacked OOXML container
#[derive(Debug)]
pub struct OoxmlArchive {
    /// All files in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Open and unpack a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack an in-memory DOCX file
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get a file's contents as a string
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Get the main document content (word/document.xml)
    ///
    /// A container without this part is not a word-processing document.
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.get(DOCUMENT_PART)
            .ok_or_else(|| ExtractionError::MissingPart(DOCUMENT_PART.to_string()))
    }

    /// Get the styles definition (word/styles.xml), which is optional
    pub fn styles_xml(&self) -> Option<&[u8]> {
        self.get(STYLES_PART)
    }

    /// Get the document relationships (word/_rels/document.xml.rels)
    pub fn document_rels_xml(&self) -> Option<&[u8]> {
        self.get(DOCUMENT_RELS_PART)
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all files in the archive, sorted by path
    pub fn file_list(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.files.keys().map(|s| s.as_str()).collect();
        paths.sort_unstable();
        paths
    }

    /// Number of files in the archive
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the archive holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
