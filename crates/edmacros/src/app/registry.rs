//! Macro metadata, lookup, and the single entry point hosts use to run a macro.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::app::escape::EscapeHtml;
use crate::app::open::OpenFile;
use crate::app::sort::SortLines;
use crate::domain::errors::MacroError;
use crate::domain::host::{Application, AtomicEdit, Document};
use crate::infra::config::Config;

/// Descriptive metadata for a macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroInfo {
    /// Stable kebab-case identifier.
    pub id: String,
    /// Display name shown in menus.
    pub name: String,
    pub description: String,
    /// Keyboard shortcut, if one is bound.
    pub accelerator: Option<String>,
}

impl MacroInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            accelerator: None,
        }
    }

    /// Whether `query` names this macro by id or display name, ignoring case.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.id.eq_ignore_ascii_case(query) || self.name.eq_ignore_ascii_case(query)
    }

    fn cmp_by_name(&self, other: &Self) -> Ordering {
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for MacroInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A single stateless editor transformation.
pub trait Macro: Send + Sync {
    fn info(&self) -> &MacroInfo;
    fn info_mut(&mut self) -> &mut MacroInfo;

    /// Perform the macro against `doc`. Must not mutate `doc` when returning an error.
    fn run(&self, doc: &mut dyn Document, app: &mut dyn Application) -> Result<(), MacroError>;
}

/// Ordered collection of macros, sorted case-insensitively by display name.
#[derive(Default)]
pub struct MacroRegistry {
    macros: Vec<Box<dyn Macro>>,
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in macros configured from `config`.
    pub fn with_builtins(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register(EscapeHtml::new());
        registry.register(SortLines::new(config.sort.options()));
        registry.register(OpenFile::new(config.open.options()));

        for m in &mut registry.macros {
            let info = m.info_mut();
            if let Some(accelerator) = config.keybindings.get(&info.id) {
                info.accelerator = Some(accelerator.clone());
            }
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Add a macro, replacing any macro with the same name (ignoring case).
    pub fn register(&mut self, m: impl Macro + 'static) {
        let name = m.info().name.clone();
        self.macros
            .retain(|existing| !existing.info().name.eq_ignore_ascii_case(&name));
        self.macros.push(Box::new(m));
        self.macros.sort_by(|a, b| a.info().cmp_by_name(b.info()));
    }

    pub fn find(&self, query: &str) -> Option<&dyn Macro> {
        self.macros
            .iter()
            .find(|m| m.info().matches(query))
            .map(|m| m.as_ref())
    }

    pub fn infos(&self) -> impl Iterator<Item = &MacroInfo> {
        self.macros.iter().map(|m| m.info())
    }

    /// Run the macro named `query` inside one atomic edit.
    ///
    /// Errors are shown to the user through [`Application::show_error_dialog`] after the edit
    /// bracket is closed, and then returned.
    pub fn run(
        &self,
        query: &str,
        doc: &mut dyn Document,
        app: &mut dyn Application,
    ) -> Result<(), MacroError> {
        let result = match self.find(query) {
            Some(m) => {
                tracing::debug!(macro_id = %m.info().id, "running macro");
                let mut edit = AtomicEdit::begin(doc);
                m.run(&mut *edit, app)
            }
            None => Err(MacroError::UnknownMacro(query.to_owned())),
        };

        if let Err(err) = &result {
            if err.is_user_error() {
                tracing::info!(macro_id = query, error = %err, "macro rejected selection");
            } else {
                tracing::warn!(macro_id = query, error = %err, "macro failed");
            }
            app.show_error_dialog(&err.to_string());
        }
        result
    }
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.infos()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::infra::buffer::FileBuffer;
    use crate::infra::host::HeadlessApp;

    struct Upper(MacroInfo);

    impl Macro for Upper {
        fn info(&self) -> &MacroInfo {
            &self.0
        }

        fn info_mut(&mut self) -> &mut MacroInfo {
            &mut self.0
        }

        fn run(&self, doc: &mut dyn Document, _app: &mut dyn Application) -> Result<(), MacroError> {
            let text = doc.full_text().to_uppercase();
            doc.set_full_text(&text);
            Ok(())
        }
    }

    fn upper(name: &str) -> Upper {
        Upper(MacroInfo::new("upper", name, "Uppercases the document."))
    }

    #[test]
    fn builtins_are_sorted_by_name() {
        let registry = MacroRegistry::with_builtins(&Config::default());
        let names: Vec<&str> = registry.infos().map(|info| info.name.as_str()).collect();
        assert_eq!(names, ["Escape for HTML", "Open File", "Sort Lines"]);
    }

    #[test]
    fn find_matches_id_or_name_ignoring_case() {
        let registry = MacroRegistry::with_builtins(&Config::default());
        assert_eq!(registry.find("SORT-LINES").unwrap().info().name, "Sort Lines");
        assert_eq!(registry.find("open file").unwrap().info().id, "open-file");
        assert!(registry.find("nope").is_none());
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = MacroRegistry::new();
        registry.register(upper("Shout"));
        registry.register(upper("SHOUT"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.infos().next().unwrap().name, "SHOUT");
        assert!(registry.find("shout").is_some());
    }

    #[test]
    fn keybindings_become_accelerators() {
        let mut config = Config::default();
        config
            .keybindings
            .insert("escape-html".into(), "ctrl+shift+h".into());
        let registry = MacroRegistry::with_builtins(&config);
        let info = registry.find("escape-html").unwrap().info();
        assert_eq!(info.accelerator.as_deref(), Some("ctrl+shift+h"));
        assert_eq!(registry.find("sort-lines").unwrap().info().accelerator, None);
    }

    #[test]
    fn run_coalesces_edits_into_one_undo_group() {
        let mut registry = MacroRegistry::new();
        registry.register(upper("Shout"));
        let mut doc = FileBuffer::from_text("quiet");
        let mut app = HeadlessApp::new();

        registry.run("shout", &mut doc, &mut app).unwrap();

        assert_eq!(doc.text(), "QUIET");
        assert_eq!(doc.atomic_depth(), 0);
        assert_eq!(doc.undo_groups(), 1);
        assert!(app.dialogs().is_empty());
    }

    #[test]
    fn run_reports_errors_through_dialog() {
        let registry = MacroRegistry::with_builtins(&Config::default());
        let mut doc = FileBuffer::from_text("no selection here");
        let mut app = HeadlessApp::new();

        let err = registry.run("escape-html", &mut doc, &mut app).unwrap_err();

        assert!(matches!(err, MacroError::NoSelection { .. }));
        assert_eq!(app.dialogs(), &[err.to_string()]);
        assert_eq!(doc.atomic_depth(), 0);
        assert!(!doc.is_dirty());
    }

    struct Broken(MacroInfo);

    impl Macro for Broken {
        fn info(&self) -> &MacroInfo {
            &self.0
        }

        fn info_mut(&mut self) -> &mut MacroInfo {
            &mut self.0
        }

        fn run(&self, _doc: &mut dyn Document, _app: &mut dyn Application) -> Result<(), MacroError> {
            Err(anyhow::anyhow!("no browser launcher succeeded").into())
        }
    }

    #[test]
    fn host_failures_are_reported_like_user_errors() {
        let mut registry = MacroRegistry::new();
        registry.register(Broken(MacroInfo::new("broken", "Broken", "Always fails.")));
        let mut doc = FileBuffer::from_text("text");
        let mut app = HeadlessApp::new();

        let err = registry.run("broken", &mut doc, &mut app).unwrap_err();

        assert!(!err.is_user_error());
        assert_eq!(app.dialogs(), &["no browser launcher succeeded".to_string()]);
        assert_eq!(doc.atomic_depth(), 0);
    }

    #[test]
    fn unknown_macro_is_reported() {
        let registry = MacroRegistry::new();
        let mut doc = FileBuffer::from_text("");
        let mut app = HeadlessApp::new();

        let err = registry.run("missing", &mut doc, &mut app).unwrap_err();
        assert_eq!(err.to_string(), "no macro named 'missing'");
        assert_eq!(app.dialogs().len(), 1);
        assert_eq!(doc.atomic_depth(), 0);
    }
}
