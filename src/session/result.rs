use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::scoring::ScoreSnapshot;
use crate::record::achievement::Badge;
use crate::record::grade::Grade;
use crate::session::mode::SessionMode;
use crate::task::{TaskId, TaskType};

/// A finished attempt as frozen by the session controller, before it is
/// judged against history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub task_id: TaskId,
    #[serde(default)]
    pub task_type: TaskType,
    pub mode: SessionMode,
    pub score: ScoreSnapshot,
    pub elapsed_secs: f64,
    /// Time to the finishing input. Equals `elapsed_secs` unless a time
    /// attack finished inside its grace window.
    pub completion_secs: f64,
    pub corrections: usize,
    pub total_keystrokes: usize,
    #[serde(default)]
    pub typed_text: String,
    #[serde(default = "default_true")]
    pub formula_valid: bool,
    #[serde(default)]
    pub timed_out: bool,
    /// Input was an exact copy of the target when the attempt completed.
    #[serde(default)]
    pub matched: bool,
    pub finished_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl AttemptResult {
    pub fn accuracy(&self) -> f64 {
        self.score.accuracy
    }

    pub fn net_wpm(&self) -> f64 {
        self.score.net_wpm
    }

    /// A time attack only counts as a run once the input matched the target;
    /// one ended by hand before that has no meaningful completion time.
    pub fn is_finished_run(&self) -> bool {
        self.mode != SessionMode::TimeAttack || self.matched
    }
}

/// An attempt judged against the personal best and history: the record
/// handed to persistence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalizedResult {
    #[serde(flatten)]
    pub attempt: AttemptResult,
    pub is_new_best: bool,
    pub improvement: Option<f64>,
    pub grade: Grade,
    #[serde(default)]
    pub badges: BTreeSet<Badge>,
}

impl FinalizedResult {
    pub fn task_id(&self) -> &TaskId {
        &self.attempt.task_id
    }

    pub fn mode(&self) -> SessionMode {
        self.attempt.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring;

    fn attempt() -> AttemptResult {
        AttemptResult {
            task_id: TaskId::new("t1"),
            task_type: TaskType::Sentence,
            mode: SessionMode::TimeAttack,
            score: scoring::score("The cat sat.", "The cat sat.", 6.0),
            elapsed_secs: 6.1,
            completion_secs: 6.0,
            corrections: 0,
            total_keystrokes: 12,
            typed_text: "The cat sat.".to_string(),
            formula_valid: true,
            timed_out: false,
            matched: true,
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_old_records_fill_defaults() {
        let mut value = serde_json::to_value(attempt()).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("typed_text");
        obj.remove("formula_valid");
        obj.remove("task_type");
        let parsed: AttemptResult = serde_json::from_value(value).unwrap();
        assert!(parsed.formula_valid);
        assert!(parsed.typed_text.is_empty());
        assert_eq!(parsed.task_type, TaskType::Sentence);
    }

    #[test]
    fn test_unmatched_time_attack_is_not_a_finished_run() {
        let mut a = attempt();
        assert!(a.is_finished_run());
        a.matched = false;
        assert!(!a.is_finished_run());
        a.mode = SessionMode::Standard;
        assert!(a.is_finished_run());
    }

    #[test]
    fn test_missing_matched_flag_reads_unmatched() {
        let mut value = serde_json::to_value(attempt()).unwrap();
        value.as_object_mut().unwrap().remove("matched");
        let parsed: AttemptResult = serde_json::from_value(value).unwrap();
        assert!(!parsed.matched);
    }

    #[test]
    fn test_accessors_read_score() {
        let a = attempt();
        assert_eq!(a.accuracy(), 100.0);
        assert!((a.net_wpm() - 30.0).abs() < 1e-9);
    }
}
