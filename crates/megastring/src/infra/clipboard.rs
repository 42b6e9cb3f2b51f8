//! Clipboard integration.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::domain::errors::ClipboardError;

/// Destination for a finished mega string.
pub trait ClipboardSink {
    /// Replace the clipboard's text contents with `text`.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Make the last published text survive this process exiting.
    fn persist(&mut self) -> Result<(), ClipboardError> {
        Ok(())
    }
}

/// System clipboard backed by `arboard`, with shell-command fallbacks for headless sessions.
///
/// The `arboard` handle is held for the lifetime of the value. On X11 and Wayland the
/// selection is served by this process, so dropping it early would clear the clipboard.
/// [`ClipboardSink::persist`] hands the last text to `xclip`/`wl-copy`, which keep
/// serving it after exit.
pub struct SystemClipboard {
    primary: Option<arboard::Clipboard>,
    command_fallback: bool,
    /// Last text owned by this process through `arboard`.
    served: Option<String>,
}

impl SystemClipboard {
    pub fn new(command_fallback: bool) -> Self {
        let primary = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                tracing::debug!(error = %err, "system clipboard unavailable");
                None
            }
        };
        Self {
            primary,
            command_fallback,
            served: None,
        }
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let primary_err = match self.primary.as_mut() {
            Some(primary) => match primary.set_text(text.to_owned()) {
                Ok(()) => {
                    self.served = Some(text.to_owned());
                    return Ok(());
                }
                Err(err) => Some(err.to_string()),
            },
            None => None,
        };

        self.served = None;
        if self.command_fallback {
            return copy_with_commands(text, &fallback_commands());
        }

        Err(match primary_err {
            Some(reason) => ClipboardError::Rejected(reason),
            None => ClipboardError::NoBackend,
        })
    }

    fn persist(&mut self) -> Result<(), ClipboardError> {
        if !SELECTION_SERVED_BY_OWNER {
            return Ok(());
        }
        let Some(text) = self.served.take() else {
            return Ok(());
        };
        if !self.command_fallback {
            tracing::warn!("clipboard command fallback disabled, contents end with this process");
            return Ok(());
        }
        copy_with_commands(&text, &fallback_commands())
    }
}

/// X11 and Wayland clear a selection when the owning process exits.
const SELECTION_SERVED_BY_OWNER: bool = cfg!(all(unix, not(target_os = "macos")));

/// Writes the text to stdout instead of a clipboard.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ClipboardSink for StdoutSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .map_err(|err| ClipboardError::Rejected(err.to_string()))?;
        stdout
            .flush()
            .map_err(|err| ClipboardError::Rejected(err.to_string()))
    }
}

/// Keeps every published string in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub history: Vec<String>,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<&str> {
        self.history.last().map(String::as_str)
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.history.push(text.to_owned());
        Ok(())
    }
}

fn copy_with_commands(text: &str, commands: &[&[&str]]) -> Result<(), ClipboardError> {
    for &command in commands {
        match try_command_copy(command, text) {
            Ok(()) => return Ok(()),
            Err(reason) => tracing::debug!(command = command[0], %reason, "clipboard fallback failed"),
        }
    }
    Err(ClipboardError::NoBackend)
}

fn try_command_copy(command: &[&str], text: &str) -> Result<(), String> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| "clipboard command missing program".to_owned())?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| format!("failed to spawn {program}: {err}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|err| format!("failed to write clipboard contents: {err}"))?;
    }

    let status = child
        .wait()
        .map_err(|err| format!("{program} did not exit cleanly: {err}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{program} exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["pbcopy"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["xclip", "-selection", "clipboard"], &["wl-copy"]]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["powershell.exe", "-NoProfile", "-Command", "Set-Clipboard"]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}
