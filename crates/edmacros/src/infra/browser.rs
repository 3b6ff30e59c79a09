//! External browser integration.

use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

/// Open `url` in the user's default browser, trying each platform launcher in turn.
pub fn launch(url: &str) -> Result<()> {
    for command in launcher_commands() {
        match try_launch(command, url) {
            Ok(()) => {
                tracing::info!(url, launcher = command[0], "launched external browser");
                return Ok(());
            }
            Err(err) => tracing::debug!(launcher = command[0], error = %err, "launcher failed"),
        }
    }

    Err(anyhow!("failed to open {url}: no browser launcher succeeded"))
}

fn try_launch(command: &[&str], url: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("browser launcher missing program")?;

    let status = Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("failed to spawn browser launcher: {program}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("browser launcher exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn launcher_commands() -> Vec<&'static [&'static str]> {
    vec![&["open"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn launcher_commands() -> Vec<&'static [&'static str]> {
    vec![&["xdg-open"], &["gio", "open"]]
}

#[cfg(target_os = "windows")]
fn launcher_commands() -> Vec<&'static [&'static str]> {
    vec![&["cmd", "/C", "start", ""]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn launcher_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}
