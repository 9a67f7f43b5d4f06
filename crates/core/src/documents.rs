//! Course document store.
//!
//! A read-only directory of course materials, scanned recursively. Entries
//! are sorted by file name so every scan of an unchanged directory yields
//! the same order.
//!
//! Supported formats:
//! - `txt`, `md`, `csv` — read as UTF-8 text
//! - `pdf` — represented by a placeholder, no text extraction

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::DocumentError;

/// Directory depth limit for the recursive scan.
const MAX_SCAN_DEPTH: usize = 16;

/// How a document's content is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Text,
    Pdf,
}

impl DocumentKind {
    /// Map a file extension (any case) to a supported kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "md" | "csv" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// A supported file found by a scan. Content is not read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    /// File name, used for chapter matching and as the prompt subheading
    pub name: String,
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// A loaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub content: String,
}

/// Recognises chapter documents by a name prefix followed by a digit.
#[derive(Debug, Clone)]
pub struct ChapterConvention {
    prefix: String,
}

impl ChapterConvention {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_lowercase(),
        }
    }

    /// `Ch06_Polymers.txt` is a chapter document; `syllabus.txt` is not.
    pub fn is_chapter(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        lower
            .strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit())
    }
}

impl Default for ChapterConvention {
    fn default() -> Self {
        Self::new("Ch")
    }
}

/// The knowledge-base directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// List supported documents without reading them.
    ///
    /// A missing directory is an empty store. Symlinks are followed. Hidden
    /// files, unsupported extensions and non UTF-8 names are skipped.
    pub fn entries(&self) -> Vec<DocumentEntry> {
        if !self.exists() {
            debug!(dir = %self.root.display(), "Knowledge base directory not found");
            return Vec::new();
        }

        WalkDir::new(&self.root)
            .max_depth(MAX_SCAN_DEPTH)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable knowledge base entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let Some(name) = e.file_name().to_str().map(str::to_string) else {
                    warn!(path = %e.path().display(), "Skipping document with a non UTF-8 name");
                    return None;
                };
                if name.starts_with('.') {
                    return None;
                }
                let kind = e
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(DocumentKind::from_extension)?;
                Some(DocumentEntry {
                    name,
                    path: e.into_path(),
                    kind,
                })
            })
            .collect()
    }

    /// Read one document's content.
    pub fn load(&self, entry: &DocumentEntry) -> Result<Document, DocumentError> {
        let content = match entry.kind {
            DocumentKind::Pdf => format!("[PDF file: {}]", entry.name),
            DocumentKind::Text => {
                let bytes = std::fs::read(&entry.path).map_err(|e| DocumentError::Read {
                    path: entry.path.clone(),
                    reason: e.to_string(),
                })?;
                String::from_utf8(bytes).map_err(|_| DocumentError::Decode {
                    path: entry.path.clone(),
                })?
            }
        };

        Ok(Document {
            name: entry.name.clone(),
            content,
        })
    }
}
