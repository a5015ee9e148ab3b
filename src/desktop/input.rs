//! Keyboard input simulation using enigo.
//!
//! Keystrokes go to whichever window currently has focus, so callers sequence
//! application launches and pauses around these calls.

use std::thread;
use std::time::Duration;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use crate::error::{AutomationError, Result};

/// Keyboard simulator driving the focused application.
pub struct InputSimulator {
    enigo: Enigo,
}

impl InputSimulator {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            AutomationError::Input(format!("failed to create input backend: {:?}", e))
        })?;
        Ok(Self { enigo })
    }

    /// Type a text string into the focused window.
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        self.enigo
            .text(text)
            .map_err(|e| AutomationError::Input(format!("failed to type text: {:?}", e)))
    }

    /// Press and release a single key.
    pub fn key_press(&mut self, key: KeyCode) -> Result<()> {
        self.enigo
            .key(key.to_enigo(), Direction::Click)
            .map_err(|e| AutomationError::Input(format!("failed to press key: {:?}", e)))
    }

    /// Hold down a key.
    pub fn key_down(&mut self, key: KeyCode) -> Result<()> {
        self.enigo
            .key(key.to_enigo(), Direction::Press)
            .map_err(|e| AutomationError::Input(format!("failed to press key down: {:?}", e)))
    }

    /// Release a key.
    pub fn key_up(&mut self, key: KeyCode) -> Result<()> {
        self.enigo
            .key(key.to_enigo(), Direction::Release)
            .map_err(|e| AutomationError::Input(format!("failed to release key: {:?}", e)))
    }

    /// Execute a hotkey combination (e.g. Ctrl+S, Alt+F4).
    pub fn hotkey(&mut self, modifiers: &[Modifier], key: KeyCode) -> Result<()> {
        for modifier in modifiers {
            self.key_down(modifier.to_key_code())?;
        }

        thread::sleep(Duration::from_millis(20));

        self.key_press(key)?;

        thread::sleep(Duration::from_millis(20));

        // Release all modifiers in reverse order
        for modifier in modifiers.iter().rev() {
            self.key_up(modifier.to_key_code())?;
        }

        Ok(())
    }

    /// Parse and send a combination written like "Ctrl+S" or "Alt+F4".
    pub fn send_keys(&mut self, combo: &str) -> Result<()> {
        let (modifiers, key) = parse_combo(combo)?;
        if modifiers.is_empty() {
            self.key_press(key)
        } else {
            self.hotkey(&modifiers, key)
        }
    }
}

/// Split a combo string on `+`: the last segment is the key, everything
/// before it a modifier.
fn parse_combo(combo: &str) -> Result<(Vec<Modifier>, KeyCode)> {
    let parts: Vec<&str> = combo.split('+').map(str::trim).collect();
    let (key_part, modifier_parts) = parts
        .split_last()
        .ok_or_else(|| AutomationError::Input(format!("empty key combination: '{}'", combo)))?;

    let key = KeyCode::from_str(key_part).ok_or_else(|| {
        AutomationError::Input(format!("unknown key '{}' in '{}'", key_part, combo))
    })?;

    let mut modifiers = Vec::with_capacity(modifier_parts.len());
    for part in modifier_parts {
        let modifier = Modifier::from_str(part).ok_or_else(|| {
            AutomationError::Input(format!("unknown modifier '{}' in '{}'", part, combo))
        })?;
        modifiers.push(modifier);
    }

    Ok((modifiers, key))
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Control,
    Alt,
    Shift,
    Meta, // Windows key / Command key
}

impl Modifier {
    fn to_key_code(self) -> KeyCode {
        match self {
            Modifier::Control => KeyCode::Control,
            Modifier::Alt => KeyCode::Alt,
            Modifier::Shift => KeyCode::Shift,
            Modifier::Meta => KeyCode::Meta,
        }
    }

    /// Parse a modifier from a string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ctrl" | "control" => Some(Modifier::Control),
            "alt" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            "meta" | "win" | "cmd" | "command" => Some(Modifier::Meta),
            _ => None,
        }
    }
}

/// Keys the note-typing flow drives, plus the modifiers as standalone keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    F4,
    Enter,
    Tab,
    Escape,
    Space,
    Backspace,
    Delete,
    Home,
    End,
    Control,
    Alt,
    Shift,
    Meta,
}

impl KeyCode {
    fn to_enigo(self) -> Key {
        match self {
            KeyCode::Char(c) => Key::Unicode(c),
            KeyCode::F4 => Key::F4,
            KeyCode::Enter => Key::Return,
            KeyCode::Tab => Key::Tab,
            KeyCode::Escape => Key::Escape,
            KeyCode::Space => Key::Space,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::Control => Key::Control,
            KeyCode::Alt => Key::Alt,
            KeyCode::Shift => Key::Shift,
            KeyCode::Meta => Key::Meta,
        }
    }

    /// Parse a key from a string. A single character is a literal key; names
    /// are case-insensitive.
    pub fn from_str(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(KeyCode::Char(c.to_ascii_lowercase()));
        }
        match s.to_lowercase().as_str() {
            "f4" => Some(KeyCode::F4),
            "enter" | "return" => Some(KeyCode::Enter),
            "tab" => Some(KeyCode::Tab),
            "escape" | "esc" => Some(KeyCode::Escape),
            "space" => Some(KeyCode::Space),
            "backspace" | "bs" => Some(KeyCode::Backspace),
            "delete" | "del" => Some(KeyCode::Delete),
            "home" => Some(KeyCode::Home),
            "end" => Some(KeyCode::End),
            "ctrl" | "control" => Some(KeyCode::Control),
            "alt" => Some(KeyCode::Alt),
            "shift" => Some(KeyCode::Shift),
            "meta" | "win" | "cmd" | "command" => Some(KeyCode::Meta),
            _ => None,
        }
    }
}
