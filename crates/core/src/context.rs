//! Context assembly: instructions plus the selected course documents.
//!
//! Output layout:
//!
//! ```text
//! {instructions}
//!
//! # Course Materials Available:
//!
//! ## {name}
//! {content}
//!
//! ...
//! ```
//!
//! Non-chapter documents are always included. Chapter documents are included
//! only when their name carries a selected chapter id, and unselected ones
//! are never read. Documents appear in store order, so identical inputs
//! always produce identical output.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::documents::{ChapterConvention, Document, DocumentStore};
use crate::topics::Selection;

/// Header placed above the first document.
pub const MATERIALS_HEADER: &str = "# Course Materials Available:";

/// Which documents make it into the context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// Non-chapter documents plus the selected chapters.
    #[default]
    Selective,
    /// Every supported document, regardless of selection.
    Full,
}

/// The system prompt for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    pub text: String,
    /// Names of documents included, in order
    pub included: Vec<String>,
    /// Names of documents that failed to load
    pub skipped: Vec<String>,
}

impl AssembledContext {
    /// Rough token estimate (4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.text.len() / 4
    }
}

/// Builds the context string from a document store snapshot.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    convention: ChapterConvention,
    mode: ContextMode,
}

impl ContextAssembler {
    pub fn new(convention: ChapterConvention, mode: ContextMode) -> Self {
        Self { convention, mode }
    }

    pub fn mode(&self) -> ContextMode {
        self.mode
    }

    /// Whether a document with this name belongs in the context.
    pub fn includes(&self, name: &str, selection: &Selection) -> bool {
        match self.mode {
            ContextMode::Full => true,
            ContextMode::Selective => {
                !self.convention.is_chapter(name) || selection.matches_name(name)
            }
        }
    }

    /// Assemble instructions and the relevant documents from `store`.
    ///
    /// A document that cannot be read is logged and skipped.
    pub fn assemble(
        &self,
        instructions: &str,
        selection: &Selection,
        store: &DocumentStore,
    ) -> AssembledContext {
        let mut documents: Vec<Document> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();

        for entry in store.entries() {
            if !self.includes(&entry.name, selection) {
                continue;
            }
            match store.load(&entry) {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    warn!(document = %entry.name, error = %e, "Skipping unreadable course document");
                    skipped.push(entry.name);
                }
            }
        }

        debug!(
            selected = %selection,
            included = documents.len(),
            skipped = skipped.len(),
            "Assembled course context"
        );

        AssembledContext {
            text: render(instructions, &documents),
            included: documents.into_iter().map(|d| d.name).collect(),
            skipped,
        }
    }
}

/// Concatenate instructions and documents into the prompt layout.
pub fn render(instructions: &str, documents: &[Document]) -> String {
    let body_len: usize = documents
        .iter()
        .map(|d| d.name.len() + d.content.len() + 6)
        .sum();
    let mut out = String::with_capacity(instructions.len() + MATERIALS_HEADER.len() + body_len + 8);

    out.push_str(instructions);
    out.push_str("\n\n");

    if documents.is_empty() {
        return out;
    }

    out.push_str(MATERIALS_HEADER);
    out.push_str("\n\n");
    for doc in documents {
        out.push_str("## ");
        out.push_str(&doc.name);
        out.push('\n');
        out.push_str(&doc.content);
        out.push_str("\n\n");
    }

    out
}
