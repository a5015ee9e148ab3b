//! Desktop note flow: open the platform text editor, type a note, save it to
//! a known path through the editor's own save dialog.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

use anyhow::anyhow;

use crate::desktop::input::{InputSimulator, KeyCode};
use crate::error::{AutomationError, Result};

/// Text typed into the editor when no override is given.
pub const DEFAULT_NOTE_TEXT: &str = "hi avi";

/// Default save target: `hi_avi.txt` on the desktop, falling back to the
/// home directory when the platform reports no desktop.
pub fn default_note_path() -> PathBuf {
    dirs::desktop_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hi_avi.txt")
}

/// Types a note through the platform text editor and saves it via the
/// editor's save dialog. Every keystroke lands in whichever window has
/// focus, so the flow leans on generous pauses between steps.
pub struct NoteTyper {
    input: InputSimulator,
}

impl NoteTyper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            input: InputSimulator::new()?,
        })
    }

    /// Drive the editor end to end and verify the file landed at `target`.
    pub fn write_via_editor(&mut self, text: &str, target: &Path) -> Result<()> {
        tracing::info!(path = %target.display(), "opening text editor");
        launch_editor()?;
        pause(2000);

        tracing::info!("typing note text");
        self.input.type_text(text)?;
        pause(500);

        tracing::info!("saving through the editor dialog");
        self.input.send_keys(save_combo())?;
        pause(2000);

        // Replace the suggested file name with the full target path
        self.input.send_keys(select_all_combo())?;
        self.input.type_text(&target.display().to_string())?;
        pause(1000);

        self.input.key_press(KeyCode::Enter)?;
        pause(2000);
        // A second Enter answers the overwrite prompt when the file exists
        self.input.key_press(KeyCode::Enter)?;
        pause(1000);

        tracing::info!("closing editor window");
        self.input.send_keys(close_window_combo())?;

        if target.exists() {
            tracing::info!(path = %target.display(), "note saved");
            Ok(())
        } else {
            Err(AutomationError::NoteNotWritten(target.to_path_buf()))
        }
    }

    /// Write the note straight to disk, skipping the editor.
    pub fn write_direct(text: &str, target: &Path) -> Result<()> {
        std::fs::write(target, text)?;
        tracing::info!(path = %target.display(), "note written directly");
        Ok(())
    }
}

fn launch_editor() -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        Command::new("cmd")
            .args(["/C", "start", "", "notepad"])
            .spawn()
            .map_err(|e| anyhow!("failed to launch notepad: {}", e))?;
    }

    #[cfg(target_os = "macos")]
    {
        Command::new("open")
            .arg("-a")
            .arg("TextEdit")
            .spawn()
            .map_err(|e| anyhow!("failed to launch TextEdit: {}", e))?;
    }

    #[cfg(target_os = "linux")]
    {
        Command::new("gedit")
            .spawn()
            .map_err(|e| anyhow!("failed to launch gedit: {}", e))?;
    }

    Ok(())
}

fn save_combo() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd+S"
    } else {
        "Ctrl+S"
    }
}

fn select_all_combo() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd+A"
    } else {
        "Ctrl+A"
    }
}

fn close_window_combo() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd+W"
    } else {
        "Alt+F4"
    }
}

fn pause(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_direct_creates_the_note_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("hi_avi.txt");

        NoteTyper::write_direct(DEFAULT_NOTE_TEXT, &target).expect("direct write should succeed");

        assert_eq!(
            std::fs::read_to_string(&target).expect("note file should exist"),
            "hi avi"
        );
    }

    #[test]
    fn default_note_path_ends_with_the_note_name() {
        let path = default_note_path();
        assert_eq!(path.file_name().unwrap(), "hi_avi.txt");
    }
}
