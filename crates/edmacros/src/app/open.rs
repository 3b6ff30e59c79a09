//! Turning a selected name into an opened file, a browsed URL, or a chosen directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::registry::{Macro, MacroInfo};
use crate::domain::errors::{MacroError, ResolutionError};
use crate::domain::host::{Application, Document};
use crate::domain::model::{Dispatch, FileReference};

/// Options controlling how selections are classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// Prefixes marking a selection as a URL. Matched case-sensitively.
    pub url_prefixes: Vec<String>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            url_prefixes: vec!["http://".into(), "https://".into()],
        }
    }
}

/// Classify a selected string. URL detection runs before any path handling.
pub fn classify(selection: &str, options: &OpenOptions) -> FileReference {
    if options
        .url_prefixes
        .iter()
        .any(|prefix| selection.starts_with(prefix.as_str()))
    {
        return FileReference::Url(selection.to_owned());
    }

    let path = PathBuf::from(selection);
    if path.is_absolute() {
        FileReference::AbsolutePath(path)
    } else {
        FileReference::RelativePath(path)
    }
}

/// Resolve a selected name to an absolute path. Relative names are anchored at the directory
/// containing `document_path`.
pub fn resolve_path(
    name: &Path,
    document_path: Option<&Path>,
) -> Result<PathBuf, ResolutionError> {
    let candidate = if name.is_absolute() {
        name.to_path_buf()
    } else {
        let parent = document_path
            .and_then(Path::parent)
            .ok_or_else(|| ResolutionError::Unanchored {
                name: name.display().to_string(),
            })?;
        parent.join(name)
    };
    Ok(std::path::absolute(&candidate).unwrap_or(candidate))
}

/// Decide which host action a selection leads to, probing the filesystem for paths.
pub fn plan(
    selection: &str,
    document_path: Option<&Path>,
    options: &OpenOptions,
) -> Result<Dispatch, ResolutionError> {
    let path = match classify(selection, options) {
        FileReference::Url(url) => return Ok(Dispatch::Browse(url)),
        FileReference::AbsolutePath(path) | FileReference::RelativePath(path) => {
            resolve_path(&path, document_path)?
        }
    };
    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => Ok(Dispatch::OpenFile(path)),
        Ok(meta) if meta.is_dir() => Ok(Dispatch::ChooseFrom(path)),
        _ => Err(ResolutionError::DoesNotExist { path }),
    }
}

/// Macro opening the file, directory, or URL named by the selection.
#[derive(Debug, Clone)]
pub struct OpenFile {
    info: MacroInfo,
    options: OpenOptions,
}

impl OpenFile {
    pub const ID: &'static str = "open-file";

    pub fn new(options: OpenOptions) -> Self {
        Self {
            info: MacroInfo::new(
                Self::ID,
                "Open File",
                "Opens the file, directory, or URL named by the selection.",
            ),
            options,
        }
    }
}

impl Macro for OpenFile {
    fn info(&self) -> &MacroInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut MacroInfo {
        &mut self.info
    }

    fn run(&self, doc: &mut dyn Document, app: &mut dyn Application) -> Result<(), MacroError> {
        let selection = doc
            .selected_text()
            .filter(|text| !text.is_empty())
            .ok_or(MacroError::NoSelection {
                context: "Couldn't open file",
                hint: "A file name must be selected in the active editor to open a file.",
            })?;

        let dispatch = plan(&selection, doc.file_path().as_deref(), &self.options)?;
        tracing::debug!(?dispatch, "resolved selection");
        dispatch.perform(app)?;
        Ok(())
    }
}
