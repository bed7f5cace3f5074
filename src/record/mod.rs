pub mod achievement;
pub mod best;
pub mod grade;

use std::collections::BTreeSet;

use anyhow::Result;
use log::{debug, info};

use crate::config::Config;
use crate::session::result::{AttemptResult, FinalizedResult};
use crate::store::RecordRepository;

pub use achievement::Badge;
pub use best::{BestRules, PersonalBestRecord, RecordKey};
pub use grade::Grade;

use achievement::BadgeContext;

#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub is_new_best: bool,
    pub improvement: Option<f64>,
    pub grade: Grade,
    pub badges: BTreeSet<Badge>,
}

/// Classifies finished attempts against the prior best and earlier history.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordEvaluator {
    pub rules: BestRules,
    pub target_wpm: f64,
}

impl Default for RecordEvaluator {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RecordEvaluator {
    pub fn from_config(config: &Config) -> Self {
        Self {
            rules: BestRules {
                time_attack_min_accuracy: config.time_attack_best_accuracy,
                standard_min_accuracy: config.standard_best_accuracy,
            },
            target_wpm: config.target_wpm as f64,
        }
    }

    /// `history` is the earlier attempts for the same task and mode, oldest first.
    pub fn evaluate(
        &self,
        result: &AttemptResult,
        prior_best: Option<&PersonalBestRecord>,
        history: &[FinalizedResult],
    ) -> Evaluation {
        let is_new_best = self.rules.beats(result, prior_best);
        let improvement = best::improvement(result, prior_best);
        let grade = grade::grade(result, self.target_wpm);
        let badges = achievement::evaluate_badges(&BadgeContext {
            result,
            is_new_best,
            had_prior_best: prior_best.is_some(),
            improvement,
            grade,
            history,
        });

        Evaluation {
            is_new_best,
            improvement,
            grade,
            badges,
        }
    }

    pub fn finalize(
        &self,
        attempt: AttemptResult,
        prior_best: Option<&PersonalBestRecord>,
        history: &[FinalizedResult],
    ) -> FinalizedResult {
        let eval = self.evaluate(&attempt, prior_best, history);
        FinalizedResult {
            attempt,
            is_new_best: eval.is_new_best,
            improvement: eval.improvement,
            grade: eval.grade,
            badges: eval.badges,
        }
    }

    /// Evaluate `attempt` against what the repository holds for its task and
    /// mode, then persist the finalized result and any new best.
    pub fn record<R: RecordRepository + ?Sized>(
        &self,
        repo: &mut R,
        attempt: AttemptResult,
    ) -> Result<FinalizedResult> {
        let key = RecordKey::of(&attempt);
        let prior = repo.fetch_best(&key)?;
        let history = repo.fetch_history(&key)?;

        let finalized = self.finalize(attempt, prior.as_ref(), &history);
        repo.save_result(&finalized)?;

        if finalized.is_new_best {
            let best = PersonalBestRecord::from_attempt(&finalized.attempt);
            info!(
                "new best for {} ({}): {:.2}s, {:.1} net wpm",
                key.task_id,
                key.mode.as_str(),
                best.best_time_secs,
                best.best_net_wpm
            );
            repo.save_best(&best)?;
        } else {
            debug!(
                "attempt on {} ({}) did not beat the best",
                key.task_id,
                key.mode.as_str()
            );
        }

        Ok(finalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scoring::ScoreSnapshot;
    use crate::session::controller::SessionController;
    use crate::session::input::KeystrokeKind;
    use crate::session::mode::{SessionMode, TimerMode};
    use crate::store::memory::MemoryRepository;
    use crate::task::{Task, TaskId, TaskType};
    use chrono::Utc;
    use std::time::Duration;

    fn attempt(mode: SessionMode, secs: f64, net_wpm: f64, accuracy: f64) -> AttemptResult {
        AttemptResult {
            task_id: TaskId::new("task-1"),
            task_type: TaskType::Sentence,
            mode,
            score: ScoreSnapshot {
                gross_wpm: net_wpm,
                net_wpm,
                accuracy,
                ..ScoreSnapshot::default()
            },
            elapsed_secs: secs,
            completion_secs: secs,
            corrections: 1,
            total_keystrokes: 40,
            typed_text: String::new(),
            formula_valid: true,
            timed_out: false,
            matched: true,
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_result_is_new_best() {
        let eval = RecordEvaluator::default().evaluate(
            &attempt(SessionMode::TimeAttack, 40.0, 30.0, 80.0),
            None,
            &[],
        );
        assert!(eval.is_new_best);
        assert_eq!(eval.improvement, None);
        assert!(eval.badges.contains(&Badge::FirstAttempt));
        assert!(!eval.badges.contains(&Badge::RecordBreaker));
    }

    #[test]
    fn test_inaccurate_faster_time_attack_is_not_new_best() {
        let evaluator = RecordEvaluator::default();
        let prior = PersonalBestRecord::from_attempt(&attempt(SessionMode::TimeAttack, 30.0, 30.0, 100.0));
        let eval = evaluator.evaluate(
            &attempt(SessionMode::TimeAttack, 20.0, 30.0, 90.0),
            Some(&prior),
            &[],
        );
        assert!(!eval.is_new_best);
        assert_eq!(eval.improvement, Some(10.0));
        assert!(!eval.badges.contains(&Badge::BigImprovement));
    }

    #[test]
    fn test_target_wpm_and_floors_come_from_config() {
        let config = Config {
            target_wpm: 60,
            time_attack_best_accuracy: 99.0,
            ..Config::default()
        };
        let evaluator = RecordEvaluator::from_config(&config);
        assert_eq!(evaluator.target_wpm, 60.0);
        assert_eq!(evaluator.rules.time_attack_min_accuracy, 99.0);
    }

    #[test]
    fn test_record_persists_result_and_best() {
        let evaluator = RecordEvaluator::default();
        let mut repo = MemoryRepository::default();

        let first = evaluator
            .record(&mut repo, attempt(SessionMode::TimeAttack, 40.0, 30.0, 100.0))
            .unwrap();
        assert!(first.is_new_best);

        let key = RecordKey::new(TaskId::new("task-1"), SessionMode::TimeAttack);
        let best = repo.fetch_best(&key).unwrap().unwrap();
        assert_eq!(best.best_time_secs, 40.0);

        let slower = evaluator
            .record(&mut repo, attempt(SessionMode::TimeAttack, 45.0, 30.0, 100.0))
            .unwrap();
        assert!(!slower.is_new_best);
        assert_eq!(slower.improvement, Some(-5.0));
        assert_eq!(repo.fetch_best(&key).unwrap().unwrap().best_time_secs, 40.0);
        assert_eq!(repo.fetch_history(&key).unwrap().len(), 2);
    }

    #[test]
    fn test_three_consecutive_bests_earn_hot_streak() {
        let evaluator = RecordEvaluator::default();
        let mut repo = MemoryRepository::default();

        let mut last = None;
        for secs in [50.0, 40.0, 30.0] {
            last = Some(
                evaluator
                    .record(&mut repo, attempt(SessionMode::TimeAttack, secs, 30.0, 100.0))
                    .unwrap(),
            );
        }
        let last = last.unwrap();
        assert!(last.is_new_best);
        assert!(last.badges.contains(&Badge::HotStreak));
        assert!(last.badges.contains(&Badge::RecordBreaker));
        assert!(last.badges.contains(&Badge::BigImprovement));
    }

    #[test]
    fn test_ended_time_attack_cannot_take_the_best() {
        let evaluator = RecordEvaluator::default();
        let mut repo = MemoryRepository::default();
        evaluator
            .record(&mut repo, attempt(SessionMode::TimeAttack, 20.0, 30.0, 100.0))
            .unwrap();

        let mut session = SessionController::default();
        session
            .start(
                Task::new("task-1", "The cat sat.", TaskType::Sentence),
                SessionMode::TimeAttack,
                TimerMode::Exam,
            )
            .unwrap();
        session.record_keystroke(KeystrokeKind::Char);
        session.update_input("T");
        session.tick(Duration::from_secs(1));
        let quit = session.end().unwrap();
        assert_eq!(quit.score.accuracy, 100.0);

        let finalized = evaluator.record(&mut repo, quit).unwrap();
        assert!(!finalized.is_new_best);
        assert_eq!(finalized.improvement, None);
        for badge in [
            Badge::Lightning,
            Badge::UnderAMinute,
            Badge::RecordBreaker,
            Badge::BigImprovement,
        ] {
            assert!(!finalized.badges.contains(&badge), "{badge:?}");
        }

        let key = RecordKey::new(TaskId::new("task-1"), SessionMode::TimeAttack);
        assert_eq!(repo.fetch_best(&key).unwrap().unwrap().best_time_secs, 20.0);
        assert_eq!(repo.fetch_history(&key).unwrap().len(), 2);
    }

    #[test]
    fn test_ended_time_attack_on_fresh_task_sets_no_best() {
        let evaluator = RecordEvaluator::default();
        let mut repo = MemoryRepository::default();
        let mut quit = attempt(SessionMode::TimeAttack, 2.0, 30.0, 100.0);
        quit.matched = false;

        let finalized = evaluator.record(&mut repo, quit).unwrap();
        assert!(!finalized.is_new_best);
        assert!(finalized.badges.contains(&Badge::FirstAttempt));
        let key = RecordKey::new(TaskId::new("task-1"), SessionMode::TimeAttack);
        assert!(repo.fetch_best(&key).unwrap().is_none());
    }

    #[test]
    fn test_modes_keep_separate_records() {
        let evaluator = RecordEvaluator::default();
        let mut repo = MemoryRepository::default();

        evaluator
            .record(&mut repo, attempt(SessionMode::TimeAttack, 30.0, 30.0, 100.0))
            .unwrap();
        let standard = evaluator
            .record(&mut repo, attempt(SessionMode::Standard, 60.0, 20.0, 92.0))
            .unwrap();
        assert!(standard.is_new_best);
        assert!(standard.badges.contains(&Badge::FirstAttempt));
    }
}
