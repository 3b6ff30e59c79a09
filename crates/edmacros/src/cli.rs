//! Command line front end running macros against files.

use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::registry::MacroRegistry;
use crate::app::sort::FinalNewline;
use crate::infra::buffer::FileBuffer;
use crate::infra::config::Config;
use crate::infra::host::HeadlessApp;

const STDIN_PATH: &str = "-";

#[derive(Debug, Parser)]
#[command(name = "edmacros", author, version, about = "Run editor macros against text files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List available macros
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a macro against a document
    Run(RunArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, clap::Args)]
struct RunArgs {
    /// Macro id or name, e.g. `sort-lines` or "Sort Lines"
    #[arg(value_name = "MACRO")]
    name: String,
    /// Document to operate on. `-` reads the text of an unsaved buffer from stdin; omitted
    /// means an unsaved, empty buffer
    file: Option<PathBuf>,
    /// Byte range to select before running, as START..END
    #[arg(long, value_parser = parse_selection)]
    selection: Option<Range<usize>>,
    /// Save the result back to FILE instead of printing it
    #[arg(long, requires = "file")]
    write: bool,
    /// Keep duplicate lines when sorting
    #[arg(long, conflicts_with = "remove_duplicates")]
    keep_duplicates: bool,
    /// Remove duplicate lines when sorting
    #[arg(long)]
    remove_duplicates: bool,
    /// How the final newline is treated when sorting
    #[arg(long, value_enum)]
    final_newline: Option<FinalNewline>,
    /// Open URLs in the system browser instead of only reporting them
    #[arg(long)]
    launch_browser: bool,
}

fn parse_selection(value: &str) -> Result<Range<usize>, String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{value}'"))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|err| format!("invalid selection start '{start}': {err}"))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|err| format!("invalid selection end '{end}': {err}"))?;
    Ok(start..end)
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::List { json } => list(json),
            Commands::Run(args) => run_macro(args),
            Commands::Completions { shell } => {
                let mut command = Cli::command();
                clap_complete::generate(shell, &mut command, "edmacros", &mut io::stdout());
                Ok(())
            }
        }
    }
}

fn list(json: bool) -> Result<()> {
    let config = Config::load()?;
    let registry = MacroRegistry::with_builtins(&config);
    let mut stdout = io::stdout().lock();

    if json {
        let infos: Vec<_> = registry.infos().collect();
        serde_json::to_writer_pretty(&mut stdout, &infos).context("failed to write macro list")?;
        writeln!(stdout)?;
        return Ok(());
    }

    for info in registry.infos() {
        let accelerator = info.accelerator.as_deref().unwrap_or("-");
        writeln!(
            stdout,
            "{:<12} {:<16} {:<14} {}",
            info.id, info.name, accelerator, info.description
        )?;
    }
    Ok(())
}

fn run_macro(args: RunArgs) -> Result<()> {
    let mut config = Config::load()?;
    if args.keep_duplicates {
        config.sort.set_remove_duplicates(false);
    } else if args.remove_duplicates {
        config.sort.set_remove_duplicates(true);
    }
    if let Some(policy) = args.final_newline {
        config.sort.set_final_newline(policy);
    }
    let registry = MacroRegistry::with_builtins(&config);

    let mut doc = match args.file.as_deref() {
        Some(path) if path == Path::new(STDIN_PATH) => {
            let text = io::read_to_string(io::stdin())
                .context("failed to read document from stdin")?;
            FileBuffer::from_text(text)
        }
        Some(path) => FileBuffer::open(path)?,
        None => FileBuffer::from_text(String::new()),
    };
    if let Some(range) = args.selection {
        doc = doc.with_selection(range)?;
    }
    let mut app = HeadlessApp::new().with_browser_launch(args.launch_browser);

    let outcome = registry.run(&args.name, &mut doc, &mut app);

    let mut stdout = io::stdout().lock();
    for action in app.actions() {
        writeln!(stdout, "{action}")?;
    }

    if let Err(err) = outcome {
        return Err(anyhow!(err));
    }

    if doc.is_dirty() {
        if args.write {
            doc.save()?;
        } else {
            stdout.write_all(doc.text().as_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_selection_ranges() {
        assert_eq!(parse_selection("3..10"), Ok(3..10));
        assert_eq!(parse_selection(" 0 .. 4 "), Ok(0..4));
        assert!(parse_selection("3-10").is_err());
        assert!(parse_selection("a..b").is_err());
    }
}
