use serde::{Deserialize, Serialize};

pub const BACKSPACE: char = '\x08';
pub const DELETE: char = '\x7f';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeystrokeKind {
    Char,
    Backspace,
    Delete,
}

impl KeystrokeKind {
    pub fn from_char(ch: char) -> Self {
        match ch {
            BACKSPACE => KeystrokeKind::Backspace,
            DELETE => KeystrokeKind::Delete,
            _ => KeystrokeKind::Char,
        }
    }

    pub fn is_correction(self) -> bool {
        matches!(self, KeystrokeKind::Backspace | KeystrokeKind::Delete)
    }
}

/// Raw tally of key events. Independent of what the text ends up being:
/// a backspace counts even if it deletes nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeystrokeTally {
    pub total: usize,
    pub corrections: usize,
}

impl KeystrokeTally {
    pub fn record(&mut self, kind: KeystrokeKind) {
        self.total += 1;
        if kind.is_correction() {
            self.corrections += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
