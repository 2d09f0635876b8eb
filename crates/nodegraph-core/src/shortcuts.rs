//! Keyboard shortcut routing for undo/redo.
//!
//! Key combinations are normalized so "Shift+Ctrl+Z" and "ctrl+shift+z"
//! match the same binding. Holding a bound key repeats the command with a
//! shrinking delay, driven by the history crate's [`RepeatCurve`].

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{bail, Result};

use crate::history::RepeatCurve;

/// Commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Undo,
    Redo,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Undo => f.write_str("undo"),
            Command::Redo => f.write_str("redo"),
        }
    }
}

/// Which shortcut layout to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Default,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Default
        }
    }

    /// Maps a config value ("mac", "default", anything else = detect).
    pub fn from_setting(setting: &str) -> Self {
        match setting {
            "mac" => Platform::Mac,
            "default" => Platform::Default,
            _ => Platform::current(),
        }
    }
}

/// A key plus its modifiers.
///
/// `option` is accepted as the mac spelling of `alt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KeyCombo {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
    /// The non-modifier key, lowercased.
    pub key: String,
}

impl KeyCombo {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_lowercase(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

impl FromStr for KeyCombo {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut combo = KeyCombo::default();
        let mut key: Option<String> = None;

        for part in s.split('+').map(|p| p.trim().to_lowercase()) {
            match part.as_str() {
                "ctrl" => combo.ctrl = true,
                "meta" => combo.meta = true,
                "shift" => combo.shift = true,
                "alt" | "option" => combo.alt = true,
                "" => bail!("Empty key in combination '{s}'"),
                _ if key.is_some() => bail!("More than one key in combination '{s}'"),
                _ => key = Some(part),
            }
        }

        match key {
            Some(key) => {
                combo.key = key;
                Ok(combo)
            }
            None => bail!("No key in combination '{s}'"),
        }
    }
}

/// Canonical form: modifiers in `ctrl, meta, shift, alt` order, then the key.
impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = [
            (self.ctrl, "ctrl"),
            (self.meta, "meta"),
            (self.shift, "shift"),
            (self.alt, "alt"),
        ];
        for (_, name) in modifiers.iter().filter(|(on, _)| *on) {
            write!(f, "{name}+")?;
        }
        f.write_str(&self.key)
    }
}

/// Normalizes a textual key combination, e.g. "Shift+Ctrl+Z" → "ctrl+shift+z".
///
/// # Errors
///
/// Returns an error if the text has no key or more than one key.
pub fn normalize_combination(text: &str) -> Result<String> {
    Ok(text.parse::<KeyCombo>()?.to_string())
}

/// Shortcut → command bindings.
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<KeyCombo, Command>,
}

impl Keymap {
    /// The stock bindings for `platform`.
    pub fn for_platform(platform: Platform) -> Self {
        let mut keymap = Self::default();
        let z = || KeyCombo::new("z");
        keymap.bind(z().ctrl(), Command::Undo);
        keymap.bind(KeyCombo::new("y").ctrl(), Command::Redo);
        keymap.bind(z().ctrl().shift(), Command::Redo);
        if platform == Platform::Mac {
            keymap.bind(z().meta(), Command::Undo);
            keymap.bind(z().meta().shift(), Command::Redo);
        }
        keymap
    }

    pub fn bind(&mut self, combo: KeyCombo, command: Command) {
        self.bindings.insert(combo, command);
    }

    pub fn lookup(&self, combo: &KeyCombo) -> Option<Command> {
        self.bindings.get(combo).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Tracks a held shortcut key and decides which key-down events fire.
///
/// After a shortcut fires, further key-downs of the same key are swallowed
/// until a window of `curve.delay(repeat_count)` has passed. Each fire
/// grows the repeat count, so the window shrinks the longer the key is
/// held. Releasing the key, or pressing a different one while the window
/// is open, starts over.
#[derive(Debug, Clone)]
pub struct KeyRepeatTracker {
    curve: RepeatCurve,
    held: Option<String>,
    window_end: Option<Instant>,
    repeat_count: u32,
}

impl KeyRepeatTracker {
    pub fn new(curve: RepeatCurve) -> Self {
        Self {
            curve,
            held: None,
            window_end: None,
            repeat_count: 0,
        }
    }

    /// Whether a key-down of `key` at `now` should be dispatched.
    pub fn accept(&mut self, key: &str, now: Instant) -> bool {
        self.expire(now);
        match self.held.as_deref() {
            Some(held) if held == key => false,
            Some(_) => {
                self.clear();
                true
            }
            None => true,
        }
    }

    /// Records that a shortcut on `key` fired at `now`.
    pub fn fired(&mut self, key: &str, now: Instant) {
        self.held = Some(key.to_string());
        self.window_end = Some(now + self.curve.delay(self.repeat_count));
        self.repeat_count = self.repeat_count.saturating_add(1);
    }

    /// Handles a key-up.
    pub fn release(&mut self, key: &str) {
        if self.held.as_deref().map_or(true, |held| held == key) {
            self.clear();
        }
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// The key currently inside its repeat window, if any.
    pub fn held_key(&self) -> Option<&str> {
        self.held.as_deref()
    }

    fn expire(&mut self, now: Instant) {
        if self.window_end.is_some_and(|end| now >= end) {
            self.held = None;
            self.window_end = None;
        }
    }

    fn clear(&mut self) {
        self.held = None;
        self.window_end = None;
        self.repeat_count = 0;
    }
}

impl Default for KeyRepeatTracker {
    fn default() -> Self {
        Self::new(RepeatCurve::default())
    }
}
