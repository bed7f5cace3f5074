use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::mode::SessionMode;
use crate::session::result::AttemptResult;

const TIME_WEIGHT: f64 = 0.5;
const ACCURACY_WEIGHT: f64 = 0.3;
const CORRECTION_WEIGHT: f64 = 0.2;
const CORRECTIONS_FOR_ZERO: f64 = 10.0;

/// Ordinal performance band, best first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Grade::S
        } else if score >= 0.75 {
            Grade::A
        } else if score >= 0.6 {
            Grade::B
        } else {
            Grade::C
        }
    }

    pub fn is_top(self) -> bool {
        self == Grade::S
    }
}

/// Weighted 0..=1 performance score.
///
/// The time component compares completion time to the task-type baseline in
/// time attack, and net WPM to the target speed in standard mode.
pub fn performance_score(result: &AttemptResult, target_wpm: f64) -> f64 {
    let time_score = match result.mode {
        SessionMode::TimeAttack => time_score(result.completion_secs, result.task_type.baseline()),
        SessionMode::Standard => {
            if target_wpm <= 0.0 {
                0.0
            } else {
                (result.score.net_wpm / target_wpm).clamp(0.0, 1.0)
            }
        }
    };
    let accuracy_score = (result.score.accuracy / 100.0).clamp(0.0, 1.0);
    let correction_score = (1.0 - result.corrections as f64 / CORRECTIONS_FOR_ZERO).max(0.0);

    time_score * TIME_WEIGHT + accuracy_score * ACCURACY_WEIGHT + correction_score * CORRECTION_WEIGHT
}

pub fn grade(result: &AttemptResult, target_wpm: f64) -> Grade {
    Grade::from_score(performance_score(result, target_wpm))
}

fn time_score(secs: f64, baseline: Duration) -> f64 {
    if secs <= 0.0 {
        return 1.0;
    }
    (baseline.as_secs_f64() / secs).clamp(0.0, 1.0)
}
