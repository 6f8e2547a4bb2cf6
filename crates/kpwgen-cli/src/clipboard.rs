//! System clipboard backends
//!
//! The primary backend pipes text into the platform's clipboard command.
//! The fallback asks the terminal to set the clipboard with an OSC 52
//! escape sequence, which works over SSH but only if the terminal allows it.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::io::{IsTerminal, Write};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use kpwgen_core::{ClipboardBackend, ClipboardError};

#[cfg(target_os = "macos")]
const COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Copies through the first clipboard command that works
#[derive(Debug, Default)]
pub struct CommandClipboard;

impl CommandClipboard {
    pub fn new() -> Self {
        Self
    }

    async fn try_command(program: &str, args: &[&str], text: &str) -> std::io::Result<bool> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            // Closing stdin lets the command finish
            drop(stdin);
        }

        Ok(child.wait().await?.success())
    }
}

#[async_trait]
impl ClipboardBackend for CommandClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut last_error = String::from("no clipboard command available");

        for (program, args) in COMMANDS {
            match Self::try_command(program, args, text).await {
                Ok(true) => {
                    debug!("Copied with {}", program);
                    return Ok(());
                }
                Ok(false) => last_error = format!("{} exited with an error", program),
                Err(e) => last_error = format!("{}: {}", program, e),
            }
        }

        Err(ClipboardError::new(self.name(), last_error))
    }

    fn name(&self) -> &'static str {
        "system"
    }
}

/// Sets the clipboard through the terminal (OSC 52)
#[derive(Debug, Default)]
pub struct Osc52Clipboard;

#[async_trait]
impl ClipboardBackend for Osc52Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stderr = std::io::stderr();
        if !stderr.is_terminal() {
            return Err(ClipboardError::new(self.name(), "stderr is not a terminal"));
        }

        let sequence = format!("\x1b]52;c;{}\x07", STANDARD.encode(text));
        stderr
            .write_all(sequence.as_bytes())
            .and_then(|_| stderr.flush())
            .map_err(|e| ClipboardError::new(self.name(), e.to_string()))
    }

    fn name(&self) -> &'static str {
        "terminal"
    }
}
