//! Completion service implementations for Coursebot.
//!
//! All providers implement the `coursebot_core::Provider` trait.

pub mod anthropic;

pub use anthropic::AnthropicProvider;
