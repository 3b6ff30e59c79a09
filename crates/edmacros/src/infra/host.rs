//! Headless [`Application`] that records host actions instead of driving a UI.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::domain::host::Application;
use crate::infra::browser;

/// A host action requested by a macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "target", rename_all = "kebab-case")]
pub enum HostAction {
    OpenFile(PathBuf),
    ChooseDirectory(PathBuf),
    InvokeOpenAction,
    Browse(String),
}

impl std::fmt::Display for HostAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostAction::OpenFile(path) => write!(f, "open {}", path.display()),
            HostAction::ChooseDirectory(dir) => write!(f, "choose-directory {}", dir.display()),
            HostAction::InvokeOpenAction => f.write_str("invoke-open-action"),
            HostAction::Browse(url) => write!(f, "browse {url}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct HeadlessApp {
    actions: Vec<HostAction>,
    dialogs: Vec<String>,
    launch_browser: bool,
}

impl HeadlessApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also hand URLs to the system browser instead of only recording them.
    pub fn with_browser_launch(mut self, enabled: bool) -> Self {
        self.launch_browser = enabled;
        self
    }

    pub fn actions(&self) -> &[HostAction] {
        &self.actions
    }

    /// Messages of every error dialog shown so far.
    pub fn dialogs(&self) -> &[String] {
        &self.dialogs
    }
}

impl Application for HeadlessApp {
    fn show_error_dialog(&mut self, message: &str) {
        tracing::debug!(message, "error dialog");
        self.dialogs.push(message.to_owned());
    }

    fn open_file_in_editor(&mut self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "open file in editor");
        self.actions.push(HostAction::OpenFile(path.to_path_buf()));
        Ok(())
    }

    fn set_file_chooser_directory(&mut self, dir: &Path) -> Result<()> {
        tracing::info!(dir = %dir.display(), "set file chooser directory");
        self.actions.push(HostAction::ChooseDirectory(dir.to_path_buf()));
        Ok(())
    }

    fn invoke_open_file_action(&mut self) -> Result<()> {
        self.actions.push(HostAction::InvokeOpenAction);
        Ok(())
    }

    fn launch_external_browser(&mut self, url: &str) -> Result<()> {
        if self.launch_browser {
            browser::launch(url)?;
        }
        self.actions.push(HostAction::Browse(url.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_actions_in_order() -> Result<()> {
        let mut app = HeadlessApp::new();
        app.launch_external_browser("https://example.com")?;
        app.open_file_in_editor(Path::new("/tmp/a.txt"))?;
        app.show_error_dialog("boom");

        assert_eq!(
            app.actions(),
            &[
                HostAction::Browse("https://example.com".into()),
                HostAction::OpenFile(PathBuf::from("/tmp/a.txt")),
            ]
        );
        assert_eq!(app.dialogs(), &["boom".to_string()]);
        Ok(())
    }

    #[test]
    fn actions_render_for_display_and_json() {
        let action = HostAction::OpenFile(PathBuf::from("/tmp/a.txt"));
        assert_eq!(action.to_string(), "open /tmp/a.txt");
        let json = serde_json::to_string(&HostAction::InvokeOpenAction).unwrap();
        assert_eq!(json, r#"{"action":"invoke-open-action"}"#);
    }
}
