use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::mode::SessionMode;
use crate::session::result::AttemptResult;
use crate::task::TaskId;

/// Records are kept per task and per mode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub task_id: TaskId,
    pub mode: SessionMode,
}

impl RecordKey {
    pub fn new(task_id: TaskId, mode: SessionMode) -> Self {
        Self { task_id, mode }
    }

    pub fn of(result: &AttemptResult) -> Self {
        Self::new(result.task_id.clone(), result.mode)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonalBestRecord {
    pub task_id: TaskId,
    pub mode: SessionMode,
    /// Time-attack completion time in seconds.
    pub best_time_secs: f64,
    pub best_net_wpm: f64,
    pub accuracy: f64,
    pub achieved_at: DateTime<Utc>,
}

impl PersonalBestRecord {
    pub fn from_attempt(result: &AttemptResult) -> Self {
        Self {
            task_id: result.task_id.clone(),
            mode: result.mode,
            best_time_secs: result.completion_secs,
            best_net_wpm: result.score.net_wpm,
            accuracy: result.score.accuracy,
            achieved_at: result.finished_at,
        }
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.task_id.clone(), self.mode)
    }
}

/// Accuracy floors a result must reach to claim the best slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestRules {
    pub time_attack_min_accuracy: f64,
    pub standard_min_accuracy: f64,
}

impl Default for BestRules {
    fn default() -> Self {
        Self {
            time_attack_min_accuracy: 95.0,
            standard_min_accuracy: 90.0,
        }
    }
}

impl BestRules {
    /// The first finished result for a (task, mode) is always a new best. A
    /// time attack that never matched the target never is.
    pub fn beats(&self, result: &AttemptResult, prior: Option<&PersonalBestRecord>) -> bool {
        if !result.is_finished_run() {
            return false;
        }
        let Some(prior) = prior else {
            return true;
        };
        match result.mode {
            SessionMode::TimeAttack => {
                result.completion_secs < prior.best_time_secs
                    && result.score.accuracy >= self.time_attack_min_accuracy
            }
            SessionMode::Standard => {
                result.score.net_wpm > prior.best_net_wpm
                    && result.score.accuracy >= self.standard_min_accuracy
            }
        }
    }
}

/// Seconds saved (time attack) or net WPM gained (standard) over the prior
/// best. Negative when the result is worse, `None` for an unfinished time attack.
pub fn improvement(result: &AttemptResult, prior: Option<&PersonalBestRecord>) -> Option<f64> {
    let prior = prior?;
    if !result.is_finished_run() {
        return None;
    }
    Some(match result.mode {
        SessionMode::TimeAttack => prior.best_time_secs - result.completion_secs,
        SessionMode::Standard => result.score.net_wpm - prior.best_net_wpm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::ScoreSnapshot;
    use crate::task::TaskType;

    fn attempt(mode: SessionMode, secs: f64, net_wpm: f64, accuracy: f64) -> AttemptResult {
        AttemptResult {
            task_id: TaskId::new("t"),
            task_type: TaskType::Sentence,
            mode,
            score: ScoreSnapshot {
                net_wpm,
                accuracy,
                ..ScoreSnapshot::default()
            },
            elapsed_secs: secs,
            completion_secs: secs,
            corrections: 0,
            total_keystrokes: 0,
            typed_text: String::new(),
            formula_valid: true,
            timed_out: false,
            matched: true,
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_result_is_always_best() {
        let rules = BestRules::default();
        assert!(rules.beats(&attempt(SessionMode::TimeAttack, 99.0, 5.0, 10.0), None));
        assert!(rules.beats(&attempt(SessionMode::Standard, 60.0, 5.0, 10.0), None));
    }

    #[test]
    fn test_time_attack_needs_faster_and_accurate() {
        let rules = BestRules::default();
        let prior = PersonalBestRecord::from_attempt(&attempt(SessionMode::TimeAttack, 30.0, 40.0, 100.0));
        assert!(rules.beats(&attempt(SessionMode::TimeAttack, 25.0, 0.0, 96.0), Some(&prior)));
        // Faster but below the 95% floor.
        assert!(!rules.beats(&attempt(SessionMode::TimeAttack, 20.0, 0.0, 90.0), Some(&prior)));
        // Equal time does not supersede.
        assert!(!rules.beats(&attempt(SessionMode::TimeAttack, 30.0, 0.0, 100.0), Some(&prior)));
        assert!(rules.beats(&attempt(SessionMode::TimeAttack, 29.0, 0.0, 95.0), Some(&prior)));
    }

    #[test]
    fn test_standard_needs_faster_and_accurate() {
        let rules = BestRules::default();
        let prior = PersonalBestRecord::from_attempt(&attempt(SessionMode::Standard, 60.0, 40.0, 97.0));
        assert!(rules.beats(&attempt(SessionMode::Standard, 60.0, 41.0, 90.0), Some(&prior)));
        assert!(!rules.beats(&attempt(SessionMode::Standard, 60.0, 55.0, 89.9), Some(&prior)));
        assert!(!rules.beats(&attempt(SessionMode::Standard, 60.0, 40.0, 100.0), Some(&prior)));
    }

    #[test]
    fn test_unmatched_time_attack_never_beats() {
        let rules = BestRules::default();
        let mut quit = attempt(SessionMode::TimeAttack, 1.0, 0.0, 100.0);
        quit.matched = false;
        assert!(!rules.beats(&quit, None));

        let prior = PersonalBestRecord::from_attempt(&attempt(SessionMode::TimeAttack, 30.0, 40.0, 100.0));
        assert!(!rules.beats(&quit, Some(&prior)));
        assert_eq!(improvement(&quit, Some(&prior)), None);

        // Standard runs are judged on speed whether or not the text matched.
        let mut partial = attempt(SessionMode::Standard, 60.0, 30.0, 100.0);
        partial.matched = false;
        assert!(rules.beats(&partial, None));
    }

    #[test]
    fn test_improvement_delta() {
        let ta_prior = PersonalBestRecord::from_attempt(&attempt(SessionMode::TimeAttack, 30.0, 0.0, 100.0));
        let ta = attempt(SessionMode::TimeAttack, 18.5, 0.0, 100.0);
        assert_eq!(improvement(&ta, Some(&ta_prior)), Some(11.5));
        assert_eq!(improvement(&ta, None), None);

        let std_prior = PersonalBestRecord::from_attempt(&attempt(SessionMode::Standard, 60.0, 40.0, 100.0));
        let std = attempt(SessionMode::Standard, 60.0, 52.0, 100.0);
        assert_eq!(improvement(&std, Some(&std_prior)), Some(12.0));
    }
}
