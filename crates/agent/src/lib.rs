//! Chat orchestration for Coursebot.
//!
//! Turns a student's question and conversation history into a single
//! completion call:
//!
//! 1. **Select** the relevant chapters from the question text
//! 2. **Assemble** instructions + course documents into the system context
//! 3. **Send** context, history, and the new message to the provider
//! 4. **Relay** the joined reply text with usage metadata
//!
//! Failures are reduced to [`coursebot_core::ChatError`] so the HTTP layer
//! can map them to status codes.

pub mod orchestrator;

pub use orchestrator::{ChatOrchestrator, ChatReply, ContextBuilder};
