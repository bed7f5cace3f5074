use serde::{Deserialize, Serialize};

use crate::engine::normalize;
use crate::error::{FormulaCheck, FormulaInvalid};

/// Floor for the WPM denominator so near-zero elapsed time stays finite.
pub const MIN_ELAPSED_SECS: f64 = 0.1;
pub const DEFAULT_FORMULA_TOLERANCE: f64 = 0.03;
const EPSILON: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub gross_wpm: f64,
    pub net_wpm: f64,
    pub accuracy: f64,
    pub quality_score: f64,
    pub completion_percentage: f64,
    pub total_errors: usize,
    pub error_rate: f64,
    pub matched_words: usize,
    pub total_words: usize,
    pub kspc: f64,
    pub backspace_rate: f64,
    pub total_keystrokes: usize,
    pub backspace_count: usize,
    #[serde(default)]
    pub target_chars: usize,
}

impl Default for ScoreSnapshot {
    fn default() -> Self {
        Self {
            gross_wpm: 0.0,
            net_wpm: 0.0,
            accuracy: 100.0,
            quality_score: 0.0,
            completion_percentage: 0.0,
            total_errors: 0,
            error_rate: 0.0,
            matched_words: 0,
            total_words: 0,
            kspc: 0.0,
            backspace_rate: 0.0,
            total_keystrokes: 0,
            backspace_count: 0,
            target_chars: 0,
        }
    }
}

/// Score a typed text against its target. Pure: keystroke metrics stay zero
/// until attached with [`ScoreSnapshot::with_keystrokes`].
pub fn score(input: &str, target: &str, elapsed_secs: f64) -> ScoreSnapshot {
    let norm_input = normalize::for_comparison(input);
    let norm_target = normalize::for_comparison(target);

    let input_words = normalize::word_count(&norm_input);
    let target_words = normalize::word_count(&norm_target);
    let accuracy = char_accuracy(&norm_input, &norm_target);

    let (gross_wpm, net_wpm) = match elapsed_minutes(elapsed_secs) {
        Some(minutes) => {
            let estimated_correct_words = input_words as f64 * accuracy / 100.0;
            (
                input_words as f64 / minutes,
                estimated_correct_words / minutes,
            )
        }
        // Unbounded elapsed time.
        None => (0.0, 0.0),
    };

    let completion_percentage = if target_words == 0 {
        0.0
    } else {
        (input_words as f64 / target_words as f64 * 100.0).min(100.0)
    };

    let input_chars = norm_input.chars().count();
    let total_errors = (input_chars as f64 * (100.0 - accuracy) / 100.0).round() as usize;
    let error_rate = if input_chars == 0 {
        0.0
    } else {
        total_errors as f64 / input_chars as f64 * 100.0
    };

    ScoreSnapshot {
        gross_wpm,
        net_wpm,
        accuracy,
        quality_score: net_wpm * accuracy / 100.0,
        completion_percentage,
        total_errors,
        error_rate,
        matched_words: matched_words(&norm_input, &norm_target),
        total_words: target_words,
        target_chars: target.chars().count(),
        ..ScoreSnapshot::default()
    }
}

/// Positional char accuracy over the overlapping prefix of two normalized
/// texts. Nothing typed (or nothing to compare) reads as 100.
pub fn char_accuracy(norm_input: &str, norm_target: &str) -> f64 {
    let mut compared = 0usize;
    let mut correct = 0usize;
    for (a, b) in norm_input.chars().zip(norm_target.chars()) {
        compared += 1;
        if a == b {
            correct += 1;
        }
    }
    if compared == 0 {
        return 100.0;
    }
    (correct as f64 / compared as f64 * 100.0).clamp(0.0, 100.0)
}

fn matched_words(norm_input: &str, norm_target: &str) -> usize {
    normalize::split_words(norm_input)
        .zip(normalize::split_words(norm_target))
        .filter(|(a, b)| a == b)
        .count()
}

/// Elapsed minutes with the denominator floored at [`MIN_ELAPSED_SECS`].
/// NaN and negative times floor too; `None` only for infinite time.
fn elapsed_minutes(elapsed_secs: f64) -> Option<f64> {
    if elapsed_secs.is_infinite() && elapsed_secs > 0.0 {
        return None;
    }
    Some(elapsed_secs.max(MIN_ELAPSED_SECS) / 60.0)
}

fn relative_deviation(actual: f64, expected: f64) -> f64 {
    (actual - expected).abs() / actual.abs().max(EPSILON)
}

impl ScoreSnapshot {
    /// Attach the raw keystroke tally collected by the session.
    pub fn with_keystrokes(mut self, total_keystrokes: usize, backspace_count: usize) -> Self {
        self.total_keystrokes = total_keystrokes;
        self.backspace_count = backspace_count;
        self.kspc = if self.target_chars == 0 {
            0.0
        } else {
            total_keystrokes as f64 / self.target_chars as f64
        };
        self.backspace_rate = if total_keystrokes == 0 {
            0.0
        } else {
            (backspace_count as f64 / total_keystrokes as f64 * 100.0).clamp(0.0, 100.0)
        };
        self
    }

    /// Cross-check derived metrics against their defining formulas.
    pub fn validate(&self, tolerance: f64) -> Result<(), FormulaInvalid> {
        let checks = [
            (
                FormulaCheck::NetWpm,
                self.gross_wpm * self.accuracy / 100.0,
                self.net_wpm,
            ),
            (
                FormulaCheck::QualityScore,
                self.net_wpm * self.accuracy / 100.0,
                self.quality_score,
            ),
            (
                FormulaCheck::Kspc,
                if self.target_chars == 0 {
                    0.0
                } else {
                    self.total_keystrokes as f64 / self.target_chars as f64
                },
                self.kspc,
            ),
        ];

        for (check, expected, actual) in checks {
            let deviation = relative_deviation(actual, expected);
            if deviation > tolerance {
                return Err(FormulaInvalid {
                    check,
                    expected,
                    actual,
                    deviation,
                });
            }
        }
        Ok(())
    }
}
