//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single macro invocation. Every variant leaves the document untouched.
#[derive(Debug, Error)]
pub enum MacroError {
    #[error("{context}:  No selection.\n{hint}")]
    NoSelection {
        context: &'static str,
        hint: &'static str,
    },
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("no macro named '{0}'")]
    UnknownMacro(String),
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// A selected file name could not be turned into an existing filesystem entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("File does not exist:\n{}", path.display())]
    DoesNotExist { path: PathBuf },
    #[error("Cannot resolve '{name}':\nthe document has not been saved, so relative names have no anchor.")]
    Unanchored { name: String },
}

impl MacroError {
    /// True for the errors that stem from the user's selection rather than the host.
    pub fn is_user_error(&self) -> bool {
        matches!(self, MacroError::NoSelection { .. } | MacroError::Resolution(_))
    }
}
