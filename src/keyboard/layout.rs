use serde::{Deserialize, Serialize};

/// Unshifted key rows, top (digit) row first. Rows are staggered so that the
/// key at column `c` of a lower row touches columns `c` and `c + 1` of the
/// row above it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyboardLayout {
    pub name: String,
    pub rows: Vec<Vec<char>>,
}

impl KeyboardLayout {
    pub fn qwerty() -> Self {
        Self {
            name: "QWERTY".to_string(),
            rows: vec![
                vec!['1', '2', '3', '4', '5', '6', '7', '8', '9', '0', '-', '='],
                vec!['q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p', '[', ']'],
                vec!['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', ';', '\''],
                vec!['z', 'x', 'c', 'v', 'b', 'n', 'm', ',', '.', '/'],
            ],
        }
    }

    pub fn dvorak() -> Self {
        Self {
            name: "Dvorak".to_string(),
            rows: vec![
                vec!['1', '2', '3', '4', '5', '6', '7', '8', '9', '0', '[', ']'],
                vec!['\'', ',', '.', 'p', 'y', 'f', 'g', 'c', 'r', 'l', '/', '='],
                vec!['a', 'o', 'e', 'u', 'i', 'd', 'h', 't', 'n', 's', '-'],
                vec![';', 'q', 'j', 'k', 'x', 'b', 'm', 'w', 'v', 'z'],
            ],
        }
    }

    pub fn colemak() -> Self {
        Self {
            name: "Colemak".to_string(),
            rows: vec![
                vec!['1', '2', '3', '4', '5', '6', '7', '8', '9', '0', '-', '='],
                vec!['q', 'w', 'f', 'p', 'g', 'j', 'l', 'u', 'y', ';', '[', ']'],
                vec!['a', 'r', 's', 't', 'd', 'h', 'n', 'e', 'i', 'o', '\''],
                vec!['z', 'x', 'c', 'v', 'b', 'k', 'm', ',', '.', '/'],
            ],
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "dvorak" => Self::dvorak(),
            "colemak" => Self::colemak(),
            _ => Self::qwerty(),
        }
    }

    fn position(&self, ch: char) -> Option<(usize, usize)> {
        let ch = ch.to_lowercase().next().unwrap_or(ch);
        self.rows.iter().enumerate().find_map(|(row, keys)| {
            keys.iter().position(|&k| k == ch).map(|col| (row, col))
        })
    }

    /// True when `a` and `b` sit on physically neighbouring keys. Case is
    /// ignored; a char is not adjacent to itself.
    pub fn are_adjacent(&self, a: char, b: char) -> bool {
        let (Some((ra, ca)), Some((rb, cb))) = (self.position(a), self.position(b)) else {
            return false;
        };
        match ra.abs_diff(rb) {
            0 => ca.abs_diff(cb) == 1,
            1 => {
                let (upper, lower) = if ra < rb { (ca, cb) } else { (cb, ca) };
                upper == lower || upper == lower + 1
            }
            _ => false,
        }
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::qwerty()
    }
}
