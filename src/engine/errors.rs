use serde::{Deserialize, Serialize};

use crate::engine::alignment::{AlignOp, Aligner};
use crate::error::EngineError;
use crate::keyboard::KeyboardLayout;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Substitution,
    Insertion,
    Deletion,
    /// Right letter, wrong case.
    Case,
    /// Substitution by a neighbouring key.
    AdjacentKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingError {
    pub kind: ErrorKind,
    pub expected: Option<char>,
    pub actual: Option<char>,
    /// Char index into the target; for insertions, the target index the
    /// extra char was typed before.
    pub position: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBreakdown {
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub case_errors: usize,
    pub adjacent_key_errors: usize,
    pub errors: Vec<TypingError>,
}

impl ErrorBreakdown {
    pub fn total(&self) -> usize {
        self.errors.len()
    }

    fn push(&mut self, error: TypingError) {
        match error.kind {
            ErrorKind::Substitution => self.substitutions += 1,
            ErrorKind::Insertion => self.insertions += 1,
            ErrorKind::Deletion => self.deletions += 1,
            ErrorKind::Case => self.case_errors += 1,
            ErrorKind::AdjacentKey => self.adjacent_key_errors += 1,
        }
        self.errors.push(error);
    }
}

/// Tag every edit in the full alignment of `input` against `target`.
pub fn analyze(
    aligner: &Aligner,
    layout: &KeyboardLayout,
    input: &str,
    target: &str,
) -> Result<ErrorBreakdown, EngineError> {
    let input: Vec<char> = input.chars().collect();
    let target: Vec<char> = target.chars().collect();
    let alignment = aligner.align(&input, &target)?;

    let mut breakdown = ErrorBreakdown::default();
    let mut next_target = 0;
    for op in alignment.operations() {
        match *op {
            AlignOp::Match { target: j, .. } => next_target = j + 1,
            AlignOp::Substitute { input: i, target: j } => {
                let (actual, expected) = (input[i], target[j]);
                breakdown.push(TypingError {
                    kind: classify_substitution(layout, expected, actual),
                    expected: Some(expected),
                    actual: Some(actual),
                    position: j,
                });
                next_target = j + 1;
            }
            AlignOp::Insert { input: i } => breakdown.push(TypingError {
                kind: ErrorKind::Insertion,
                expected: None,
                actual: Some(input[i]),
                position: next_target,
            }),
            AlignOp::Delete { target: j } => {
                breakdown.push(TypingError {
                    kind: ErrorKind::Deletion,
                    expected: Some(target[j]),
                    actual: None,
                    position: j,
                });
                next_target = j + 1;
            }
        }
    }
    Ok(breakdown)
}

fn classify_substitution(layout: &KeyboardLayout, expected: char, actual: char) -> ErrorKind {
    let same_letter = expected.to_lowercase().eq(actual.to_lowercase());
    if same_letter {
        ErrorKind::Case
    } else if layout.are_adjacent(expected, actual) {
        ErrorKind::AdjacentKey
    } else {
        ErrorKind::Substitution
    }
}
