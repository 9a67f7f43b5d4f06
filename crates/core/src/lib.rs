//! # Coursebot Core
//!
//! Domain types, traits, and error definitions for the Coursebot course
//! assistant. This crate has **no HTTP or runtime dependencies**; it holds
//! the selective context-loading logic that every other crate builds on:
//!
//! - [`topics`] — keyword index and chapter selection
//! - [`documents`] — the read-only course document store
//! - [`instructions`] — the static system-prompt text
//! - [`context`] — assembling instructions and documents into one prompt
//! - [`provider`] — the completion-service trait

pub mod context;
pub mod documents;
pub mod error;
pub mod instructions;
pub mod message;
pub mod provider;
pub mod topics;

// Re-export key types at crate root for ergonomics
pub use context::{AssembledContext, ContextAssembler, ContextMode};
pub use documents::{ChapterConvention, Document, DocumentEntry, DocumentKind, DocumentStore};
pub use error::{ChatError, DocumentError, ProviderError, Result};
pub use instructions::{DEFAULT_INSTRUCTIONS, InstructionSource};
pub use message::{ChatMessage, Role};
pub use provider::{ContentSegment, Provider, ProviderRequest, ProviderResponse, Usage};
pub use topics::{KeywordIndex, KeywordIndexError, MAX_SELECTED_TOPICS, Selection, Topic};
