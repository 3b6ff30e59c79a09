//! Configuration management utilities.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::open::OpenOptions;
use crate::app::sort::{FinalNewline, SortOptions};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".edmacros/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sort: Sort,
    #[serde(default)]
    pub open: Open,
    /// Accelerators keyed by macro id.
    #[serde(default)]
    pub keybindings: BTreeMap<String, String>,
}

/// `[sort]` section. Unset keys fall back to built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Sort {
    #[serde(default)]
    remove_duplicates: Option<bool>,
    #[serde(default)]
    final_newline: Option<FinalNewline>,
}

impl Sort {
    pub fn remove_duplicates(&self) -> bool {
        self.remove_duplicates
            .unwrap_or(SortOptions::default().remove_duplicates)
    }

    pub fn final_newline(&self) -> FinalNewline {
        self.final_newline.unwrap_or_default()
    }

    pub fn set_remove_duplicates(&mut self, value: bool) {
        self.remove_duplicates = Some(value);
    }

    pub fn set_final_newline(&mut self, value: FinalNewline) {
        self.final_newline = Some(value);
    }

    pub fn options(&self) -> SortOptions {
        SortOptions {
            remove_duplicates: self.remove_duplicates(),
            final_newline: self.final_newline(),
        }
    }
}

/// `[open]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Open {
    #[serde(default)]
    url_prefixes: Option<Vec<String>>,
}

impl Open {
    pub fn url_prefixes(&self) -> Vec<String> {
        self.url_prefixes
            .clone()
            .unwrap_or_else(|| OpenOptions::default().url_prefixes)
    }

    pub fn options(&self) -> OpenOptions {
        OpenOptions {
            url_prefixes: self.url_prefixes(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    remove_duplicates: Option<bool>,
    final_newline: Option<FinalNewline>,
}

impl EnvOverrides {
    fn from_env() -> Result<Self> {
        let remove_duplicates = env::var("EDMACROS_REMOVE_DUPLICATES")
            .ok()
            .map(|value| parse_bool(&value))
            .transpose()
            .context("invalid EDMACROS_REMOVE_DUPLICATES")?;
        let final_newline = env::var("EDMACROS_FINAL_NEWLINE")
            .ok()
            .map(|value| value.parse::<FinalNewline>())
            .transpose()
            .context("invalid EDMACROS_FINAL_NEWLINE")?;
        Ok(Self {
            remove_duplicates,
            final_newline,
        })
    }

    #[cfg(test)]
    fn for_tests(remove_duplicates: bool, final_newline: FinalNewline) -> Self {
        Self {
            remove_duplicates: Some(remove_duplicates),
            final_newline: Some(final_newline),
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got '{other}'"),
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env()?;
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading user config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        let mut keybindings = self.keybindings;
        keybindings.extend(other.keybindings);
        Self {
            sort: merge_sort(self.sort, other.sort),
            open: merge_open(self.open, other.open),
            keybindings,
        }
    }
}

fn merge_sort(mut base: Sort, overlay: Sort) -> Sort {
    if let Some(value) = overlay.remove_duplicates {
        base.remove_duplicates = Some(value);
    }
    if let Some(value) = overlay.final_newline {
        base.final_newline = Some(value);
    }
    base
}

fn merge_open(mut base: Open, overlay: Open) -> Open {
    if let Some(value) = overlay.url_prefixes {
        base.url_prefixes = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("edmacros/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(remove_duplicates) = env.remove_duplicates {
        config.sort.remove_duplicates = Some(remove_duplicates);
    }
    if let Some(final_newline) = env.final_newline {
        config.sort.final_newline = Some(final_newline);
    }
    config
}
