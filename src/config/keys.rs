//! Key notation and the binding tables
//!
//! Bindings are written in vim-style notation: `j`, `G` (shift+g), `C-c`,
//! `<CR>`, `<S-Tab>`. Each binding belongs to the global table or to the
//! context that has the keyboard.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ui::action::Action;

/// Named keys, accepted with or without angle brackets. The first name of
/// each key is the one displayed.
const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("CR", KeyCode::Enter),
    ("Enter", KeyCode::Enter),
    ("Return", KeyCode::Enter),
    ("Esc", KeyCode::Esc),
    ("Escape", KeyCode::Esc),
    ("BS", KeyCode::Backspace),
    ("Backspace", KeyCode::Backspace),
    ("Tab", KeyCode::Tab),
    ("Space", KeyCode::Char(' ')),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("PageUp", KeyCode::PageUp),
    ("PgUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
    ("PgDn", KeyCode::PageDown),
    ("Home", KeyCode::Home),
    ("End", KeyCode::End),
];

const MODIFIER_PREFIXES: [(KeyModifiers, &str); 3] = [
    (KeyModifiers::CONTROL, "C"),
    (KeyModifiers::ALT, "M"),
    (KeyModifiers::SHIFT, "S"),
];

fn named_key(name: &str) -> Option<KeyCode> {
    NAMED_KEYS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

fn key_name(code: KeyCode) -> Option<&'static str> {
    NAMED_KEYS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
}

/// A key code plus modifiers, in canonical form: letters are lowercase and
/// carry SHIFT when typed uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn from_key_event(event: &KeyEvent) -> Self {
        match event.code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => Self::new(
                KeyCode::Char(c.to_ascii_lowercase()),
                event.modifiers | KeyModifiers::SHIFT,
            ),
            code => Self::new(code, event.modifiers),
        }
    }

    /// Terminals report `?` and `+` with SHIFT set; bindings name them bare
    fn unshifted_punctuation(&self) -> Option<Self> {
        match self.code {
            KeyCode::Char(c)
                if !c.is_ascii_alphabetic() && self.modifiers.contains(KeyModifiers::SHIFT) =>
            {
                Some(Self::new(
                    self.code,
                    self.modifiers.difference(KeyModifiers::SHIFT),
                ))
            }
            _ => None,
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (modifier, prefix) in MODIFIER_PREFIXES {
            if self.modifiers.contains(modifier) {
                write!(f, "{prefix}-")?;
            }
        }
        match (self.code, key_name(self.code)) {
            (KeyCode::Char(c), None) => write!(f, "{c}"),
            (_, Some(name)) => write!(f, "<{name}>"),
            (code, None) => write!(f, "{code:?}"),
        }
    }
}

impl FromStr for KeyCombo {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key_notation(s)
    }
}

/// Which part of the UI has the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyContext {
    /// Keys that work everywhere unless a context overrides them
    Global,
    /// Markup tree and timeline
    Inspector,
    /// Typing a comment; printable keys go to the buffer
    CommentEditor,
}

impl KeyContext {
    /// Section name in the `[keys]` config table
    pub fn config_name(&self) -> &'static str {
        match self {
            KeyContext::Global => "global",
            KeyContext::Inspector => "inspector",
            KeyContext::CommentEditor => "comment_editor",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeybindingConfig {
    pub global: HashMap<KeyCombo, Action>,
    pub context: HashMap<KeyContext, HashMap<KeyCombo, Action>>,
}

impl KeybindingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context bindings win over global ones
    pub fn get_action(&self, key: &KeyCombo, context: KeyContext) -> Option<&Action> {
        self.context
            .get(&context)
            .and_then(|bindings| bindings.get(key))
            .or_else(|| self.global.get(key))
    }

    /// Action for a terminal key event, retrying shifted punctuation bare
    pub fn action_for_event(&self, event: &KeyEvent, context: KeyContext) -> Option<Action> {
        let combo = KeyCombo::from_key_event(event);
        self.get_action(&combo, context)
            .or_else(|| {
                combo
                    .unshifted_punctuation()
                    .and_then(|bare| self.get_action(&bare, context))
            })
            .copied()
    }

    /// Overlay `other` on top of these bindings
    pub fn merge(&mut self, other: KeybindingConfig) {
        self.global.extend(other.global);
        for (context, bindings) in other.context {
            self.context.entry(context).or_default().extend(bindings);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key notation")]
    Empty,
    #[error("no key specified")]
    NoKey,
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("invalid modifier: {0}")]
    InvalidModifier(String),
    #[error("invalid special key: {0}")]
    InvalidSpecialKey(String),
}

/// Parse vim-style notation into a [`KeyCombo`]
pub fn parse_key_notation(s: &str) -> Result<KeyCombo, KeyParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(KeyParseError::Empty);
    }

    let (bracketed, body) = match s.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
        Some(inner) if !inner.is_empty() => (true, inner),
        _ => (false, s),
    };

    let mut modifiers = KeyModifiers::NONE;
    let mut rest = body;
    // A trailing '-' is the minus key itself ("C--")
    while let Some((prefix, tail)) = rest.split_once('-') {
        if tail.is_empty() {
            break;
        }
        let Some((modifier, _)) = MODIFIER_PREFIXES.iter().find(|(_, p)| *p == prefix) else {
            if bracketed {
                return Err(KeyParseError::InvalidModifier(prefix.to_string()));
            }
            break;
        };
        modifiers |= *modifier;
        rest = tail;
    }

    let mut chars = rest.chars();
    let code = match (chars.next(), chars.next()) {
        (None, _) => return Err(KeyParseError::NoKey),
        (Some(c), None) => {
            if c.is_ascii_uppercase() {
                modifiers |= KeyModifiers::SHIFT;
            }
            KeyCode::Char(c.to_ascii_lowercase())
        }
        _ => {
            let name = rest.trim_start_matches('<').trim_end_matches('>');
            match named_key(name) {
                Some(code) => code,
                None if bracketed => return Err(KeyParseError::InvalidSpecialKey(rest.to_string())),
                None => return Err(KeyParseError::InvalidKey(rest.to_string())),
            }
        }
    };

    Ok(KeyCombo::new(code, modifiers))
}
