//! Whole-document line sorting.

use std::collections::BTreeSet;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::app::registry::{Macro, MacroInfo};
use crate::domain::errors::MacroError;
use crate::domain::host::{Application, Document};
use crate::domain::model::Edit;

/// How a document's final newline is treated when splitting and rejoining lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum FinalNewline {
    /// A trailing `\n` terminates the last line; every output line ends with `\n`.
    #[default]
    Terminate,
    /// Split literally on `\n` (a trailing newline yields an empty line) and join with `\n`.
    Literal,
}

impl FinalNewline {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalNewline::Terminate => "terminate",
            FinalNewline::Literal => "literal",
        }
    }
}

impl FromStr for FinalNewline {
    type Err = FinalNewlineParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "terminate" | "always" => Ok(FinalNewline::Terminate),
            "literal" | "split" => Ok(FinalNewline::Literal),
            other => Err(FinalNewlineParseError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum FinalNewlineParseError {
    #[error("unknown final newline policy '{0}'")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOptions {
    pub remove_duplicates: bool,
    pub final_newline: FinalNewline,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            remove_duplicates: true,
            final_newline: FinalNewline::default(),
        }
    }
}

/// Sort the lines of `text` in ordinal order, optionally dropping duplicates.
pub fn sort_lines(text: &str, options: &SortOptions) -> String {
    let lines = split_lines(text, options.final_newline);

    let sorted: Vec<&str> = if options.remove_duplicates {
        lines.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
    } else {
        let mut lines = lines;
        lines.sort_unstable();
        lines
    };

    join_lines(&sorted, options.final_newline)
}

fn split_lines(text: &str, policy: FinalNewline) -> Vec<&str> {
    match policy {
        FinalNewline::Literal => text.split('\n').collect(),
        FinalNewline::Terminate if text.is_empty() => Vec::new(),
        FinalNewline::Terminate => text.strip_suffix('\n').unwrap_or(text).split('\n').collect(),
    }
}

fn join_lines(lines: &[&str], policy: FinalNewline) -> String {
    match policy {
        FinalNewline::Literal => lines.join("\n"),
        FinalNewline::Terminate => {
            let mut out = String::with_capacity(lines.iter().map(|line| line.len() + 1).sum());
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out
        }
    }
}

/// Macro replacing the whole document with its sorted lines.
#[derive(Debug, Clone)]
pub struct SortLines {
    info: MacroInfo,
    options: SortOptions,
}

impl SortLines {
    pub const ID: &'static str = "sort-lines";

    pub fn new(options: SortOptions) -> Self {
        Self {
            info: MacroInfo::new(
                Self::ID,
                "Sort Lines",
                "Sorts all lines in the active editor, optionally removing duplicates.",
            ),
            options,
        }
    }
}

impl Macro for SortLines {
    fn info(&self) -> &MacroInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut MacroInfo {
        &mut self.info
    }

    fn run(&self, doc: &mut dyn Document, _app: &mut dyn Application) -> Result<(), MacroError> {
        let text = doc.full_text();
        let sorted = sort_lines(&text, &self.options);
        tracing::debug!(
            bytes = text.len(),
            remove_duplicates = self.options.remove_duplicates,
            final_newline = self.options.final_newline.as_str(),
            "sorted document lines"
        );
        Edit::ReplaceAll { text: sorted }.apply(doc);
        Ok(())
    }
}
