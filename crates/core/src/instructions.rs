//! Instruction loading: the static part of the system prompt.
//!
//! The instructions file is optional. When it is missing or unreadable the
//! built-in default sentence is used. The file is read fresh on every call
//! so edits take effect without a restart.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Fallback used when no instructions file is available.
pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a helpful teaching assistant for a dental materials course.";

/// Where the instructions come from.
#[derive(Debug, Clone, Default)]
pub struct InstructionSource {
    path: Option<PathBuf>,
}

impl InstructionSource {
    /// Read instructions from `path`, falling back to the default.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Always use the default instructions.
    pub fn builtin() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Return the instruction text, verbatim.
    pub fn load(&self) -> String {
        let Some(path) = &self.path else {
            return DEFAULT_INSTRUCTIONS.to_string();
        };

        if !path.is_file() {
            debug!(file = %path.display(), "No instructions file, using default instructions");
            return DEFAULT_INSTRUCTIONS.to_string();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(file = %path.display(), len = content.len(), "Loaded instructions");
                content
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to read instructions, using default");
                DEFAULT_INSTRUCTIONS.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn builtin_returns_default() {
        assert_eq!(InstructionSource::builtin().load(), DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn missing_file_returns_default() {
        let source = InstructionSource::file("/nonexistent/instructions.txt");
        assert_eq!(source.load(), DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn existing_file_is_returned_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("instructions.txt");
        let text = "  Answer like a professor.\n\nCite chapters.\n";
        fs::write(&path, text).unwrap();

        assert_eq!(InstructionSource::file(&path).load(), text);
    }

    #[test]
    fn directory_in_place_of_file_returns_default() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(InstructionSource::file(tmp.path()).load(), DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn file_is_reread_on_every_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("instructions.txt");
        let source = InstructionSource::file(&path);

        fs::write(&path, "first").unwrap();
        assert_eq!(source.load(), "first");
        fs::write(&path, "second").unwrap();
        assert_eq!(source.load(), "second");
    }
}
