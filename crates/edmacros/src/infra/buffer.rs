//! Headless document buffer backed by an optional file.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::domain::host::Document;
use crate::domain::model::SelectionRange;

/// In-memory text buffer implementing [`Document`] outside of a real editor.
#[derive(Debug, Clone, Default)]
pub struct FileBuffer {
    path: Option<PathBuf>,
    text: String,
    selection: SelectionRange,
    atomic_depth: usize,
    group_dirty: bool,
    undo_groups: usize,
    dirty: bool,
}

impl FileBuffer {
    /// Unsaved buffer holding `text`, with an empty selection at the start.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Load `path` into a buffer. The stored path is made absolute.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read document: {}", path.display()))?;
        let absolute = std::path::absolute(path)
            .with_context(|| format!("failed to resolve document path: {}", path.display()))?;
        Ok(Self {
            path: Some(absolute),
            ..Self::from_text(text)
        })
    }

    /// Select `range`, rejecting offsets past the end or inside a UTF-8 sequence.
    pub fn with_selection(mut self, range: Range<usize>) -> Result<Self> {
        let selection = SelectionRange::from(range);
        for offset in [selection.start, selection.end] {
            if offset > self.text.len() {
                bail!(
                    "selection offset {offset} is past the end of the document ({} bytes)",
                    self.text.len()
                );
            }
            if !self.text.is_char_boundary(offset) {
                bail!("selection offset {offset} is not on a character boundary");
            }
        }
        self.selection = selection;
        Ok(self)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn selection(&self) -> SelectionRange {
        self.selection
    }

    /// Whether the text changed since the buffer was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of open atomic-edit brackets.
    pub fn atomic_depth(&self) -> usize {
        self.atomic_depth
    }

    /// Number of undoable steps recorded so far.
    pub fn undo_groups(&self) -> usize {
        self.undo_groups
    }

    /// Write the text back to the backing file.
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            bail!("document has no file path to save to");
        };
        fs::write(path, &self.text)
            .with_context(|| format!("failed to write document: {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }

    fn clamp(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    fn record_change(&mut self) {
        self.dirty = true;
        if self.atomic_depth == 0 {
            self.undo_groups += 1;
        } else {
            self.group_dirty = true;
        }
    }
}

impl Document for FileBuffer {
    fn selected_text(&self) -> Option<String> {
        if self.selection.is_empty() {
            return None;
        }
        Some(self.text[self.selection.as_range()].to_owned())
    }

    fn selection_start(&self) -> usize {
        self.selection.start
    }

    fn selection_end(&self) -> usize {
        self.selection.end
    }

    fn replace_selection(&mut self, text: &str) {
        let range = self.selection.as_range();
        let caret = range.start + text.len();
        self.text.replace_range(range, text);
        self.selection = SelectionRange::new(caret, caret);
        self.record_change();
    }

    fn set_selection_start(&mut self, offset: usize) {
        let start = self.clamp(offset);
        self.selection = SelectionRange::new(start, self.selection.end.max(start));
    }

    fn set_selection_end(&mut self, offset: usize) {
        let end = self.clamp(offset);
        self.selection = SelectionRange::new(self.selection.start.min(end), end);
    }

    fn full_text(&self) -> String {
        self.text.clone()
    }

    fn set_full_text(&mut self, text: &str) {
        self.text = text.to_owned();
        self.selection = SelectionRange::new(0, 0);
        self.record_change();
    }

    fn file_path(&self) -> Option<PathBuf> {
        self.path.clone()
    }

    fn begin_atomic_edit(&mut self) {
        self.atomic_depth += 1;
    }

    fn end_atomic_edit(&mut self) {
        if self.atomic_depth == 0 {
            tracing::warn!("unbalanced end of atomic edit");
            return;
        }
        self.atomic_depth -= 1;
        if self.atomic_depth == 0 && self.group_dirty {
            self.undo_groups += 1;
            self.group_dirty = false;
        }
    }
}
