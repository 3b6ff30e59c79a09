//! Capability interfaces the host editor exposes to macros.
//!
//! Macros never see a concrete editor. They borrow a [`Document`] for the active buffer and an
//! [`Application`] for dialogs and host actions, for the duration of one invocation.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Access to the active text buffer. Offsets are byte offsets into [`Document::full_text`].
pub trait Document {
    /// Selected text, or `None` when nothing is selected.
    fn selected_text(&self) -> Option<String>;
    fn selection_start(&self) -> usize;
    fn selection_end(&self) -> usize;
    /// Replace the selection with `text`, leaving the caret after the insertion.
    fn replace_selection(&mut self, text: &str);
    fn set_selection_start(&mut self, offset: usize);
    fn set_selection_end(&mut self, offset: usize);

    fn full_text(&self) -> String;
    fn set_full_text(&mut self, text: &str);

    /// Absolute path backing the buffer, `None` for unsaved buffers.
    fn file_path(&self) -> Option<PathBuf>;

    fn begin_atomic_edit(&mut self);
    fn end_atomic_edit(&mut self);
}

/// Host application actions available to macros.
pub trait Application {
    /// Blocking, user-facing error report.
    fn show_error_dialog(&mut self, message: &str);
    fn open_file_in_editor(&mut self, path: &Path) -> Result<()>;
    fn set_file_chooser_directory(&mut self, dir: &Path) -> Result<()>;
    fn invoke_open_file_action(&mut self) -> Result<()>;
    fn launch_external_browser(&mut self, url: &str) -> Result<()>;
}

/// Scoped undo-coalescing bracket.
///
/// Calls [`Document::begin_atomic_edit`] on construction and [`Document::end_atomic_edit`] on
/// drop, so the bracket is closed on every exit path including early returns and unwinding.
pub struct AtomicEdit<'a, D: Document + ?Sized> {
    doc: &'a mut D,
}

impl<'a, D: Document + ?Sized> AtomicEdit<'a, D> {
    pub fn begin(doc: &'a mut D) -> Self {
        doc.begin_atomic_edit();
        Self { doc }
    }
}

impl<D: Document + ?Sized> Deref for AtomicEdit<'_, D> {
    type Target = D;

    fn deref(&self) -> &Self::Target {
        self.doc
    }
}

impl<D: Document + ?Sized> DerefMut for AtomicEdit<'_, D> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.doc
    }
}

impl<D: Document + ?Sized> Drop for AtomicEdit<'_, D> {
    fn drop(&mut self) {
        self.doc.end_atomic_edit();
    }
}
