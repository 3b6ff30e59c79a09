//! Domain models for selections, edits, and file references.

use std::ops::Range;
use std::path::PathBuf;

use crate::domain::host::{Application, Document};

/// Byte range of a selection within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for SelectionRange {
    fn from(value: Range<usize>) -> Self {
        Self::new(value.start, value.end)
    }
}

/// A fully computed document mutation.
///
/// Macros build the complete replacement text before touching the document, so an edit is
/// either applied whole or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace the current selection and then select `selection`.
    ReplaceSelection {
        text: String,
        selection: SelectionRange,
    },
    /// Replace the entire document text.
    ReplaceAll { text: String },
}

impl Edit {
    /// Replacement of the selection starting at `start`, reselecting the inserted text.
    pub fn replace_selection(start: usize, text: String) -> Self {
        let selection = SelectionRange::new(start, start + text.len());
        Edit::ReplaceSelection { text, selection }
    }

    pub fn text(&self) -> &str {
        match self {
            Edit::ReplaceSelection { text, .. } | Edit::ReplaceAll { text } => text,
        }
    }

    pub fn apply(&self, doc: &mut dyn Document) {
        match self {
            Edit::ReplaceSelection { text, selection } => {
                doc.replace_selection(text);
                doc.set_selection_start(selection.start);
                doc.set_selection_end(selection.end);
            }
            Edit::ReplaceAll { text } => doc.set_full_text(text),
        }
    }
}

/// Classification of a selected string naming something to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReference {
    Url(String),
    AbsolutePath(PathBuf),
    RelativePath(PathBuf),
}

/// Host action chosen for a resolved [`FileReference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Hand the URL to the external browser.
    Browse(String),
    /// Open an existing regular file as a new editor document.
    OpenFile(PathBuf),
    /// Point the file chooser at a directory and show the open dialog.
    ChooseFrom(PathBuf),
}

impl Dispatch {
    pub fn perform(&self, app: &mut dyn Application) -> anyhow::Result<()> {
        match self {
            Dispatch::Browse(url) => app.launch_external_browser(url),
            Dispatch::OpenFile(path) => app.open_file_in_editor(path),
            Dispatch::ChooseFrom(dir) => {
                app.set_file_chooser_directory(dir)?;
                app.invoke_open_file_action()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::infra::buffer::FileBuffer;
    use crate::infra::host::{HeadlessApp, HostAction};

    #[test]
    fn selection_range_normalizes_order() {
        let range = SelectionRange::new(9, 4);
        assert_eq!(range.as_range(), 4..9);
        assert_eq!(range.len(), 5);
    }

    #[test]
    fn replace_selection_edit_reselects_inserted_text() {
        let mut buffer = FileBuffer::from_text("say <hi> now")
            .with_selection(4..8)
            .unwrap();
        let edit = Edit::replace_selection(4, "&lt;hi&gt;".to_owned());
        edit.apply(&mut buffer);

        assert_eq!(buffer.text(), "say &lt;hi&gt; now");
        assert_eq!(buffer.selected_text().as_deref(), Some("&lt;hi&gt;"));
    }

    #[test]
    fn choose_from_sets_directory_then_opens_dialog() {
        let mut app = HeadlessApp::new();
        Dispatch::ChooseFrom(PathBuf::from("/srv/data"))
            .perform(&mut app)
            .unwrap();
        assert_eq!(
            app.actions(),
            &[
                HostAction::ChooseDirectory(PathBuf::from("/srv/data")),
                HostAction::InvokeOpenAction,
            ]
        );
    }
}
