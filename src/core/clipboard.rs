//! Clipboard access.
//!
//! The system clipboard is reached through the platform's copy helper
//! (`pbcopy`, `wl-copy`, `xclip`, `xsel`, `clip.exe`), or an explicit
//! command from the config. [`MemoryClipboard`] records writes instead
//! and backs the tests.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::error::ClipboardError;

/// Somewhere a revealed secret can be written.
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns `ClipboardError` if the platform refuses the write.
    fn write(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Known copy helpers, in preference order.
const HELPERS: &[&[&str]] = &[
    &["pbcopy"],
    &["wl-copy"],
    &["xclip", "-selection", "clipboard"],
    &["xsel", "--clipboard", "--input"],
    &["clip.exe"],
];

/// The OS clipboard, driven through a copy helper reading stdin.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    program: String,
    args: Vec<String>,
}

impl SystemClipboard {
    /// Use an explicit command, e.g. `["xclip", "-selection", "clipboard"]`.
    pub fn with_command(command: &[String]) -> Result<Self, ClipboardError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ClipboardError::Unavailable("empty clipboard command".to_string()))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Find the first copy helper available on `PATH`.
    pub fn detect() -> Result<Self, ClipboardError> {
        for helper in HELPERS {
            if which::which(helper[0]).is_ok() {
                debug!(program = helper[0], "clipboard helper found");
                return Ok(Self {
                    program: helper[0].to_string(),
                    args: helper[1..].iter().map(|a| a.to_string()).collect(),
                });
            }
        }
        Err(ClipboardError::Unavailable(
            "no clipboard helper found (install wl-clipboard, xclip, or xsel)".to_string(),
        ))
    }

    /// Explicit command if configured, detection otherwise.
    pub fn from_config(command: Option<&[String]>) -> Result<Self, ClipboardError> {
        match command {
            Some(command) => Self::with_command(command),
            None => Self::detect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Clipboard for SystemClipboard {
    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        let failed = |reason: String| ClipboardError::CommandFailed {
            command: self.program.clone(),
            reason,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipboardError::Unavailable(format!("{}: {}", self.program, e)))?;

        // Stdin is closed at the end of the match so the helper sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };

        // Reap the helper even when the write failed.
        let status = child.wait().map_err(|e| failed(e.to_string()))?;
        written.map_err(|e| failed(e.to_string()))?;
        if !status.success() {
            return Err(failed(format!("exited with {}", status)));
        }
        Ok(())
    }
}

/// In-memory clipboard recording every write.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents (the last write), if any.
    pub fn contents(&self) -> Option<String> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Every write so far, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write(&self, text: &str) -> Result<(), ClipboardError> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
        Ok(())
    }
}
