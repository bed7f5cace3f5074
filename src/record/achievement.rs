use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::grade::Grade;
use crate::session::mode::SessionMode;
use crate::session::result::{AttemptResult, FinalizedResult};

const BIG_IMPROVEMENT: f64 = 10.0;
const UNDER_A_MINUTE_SECS: f64 = 60.0;
const LIGHTNING_SECS: f64 = 45.0;
const DEDICATED_ATTEMPTS: usize = 10;
const HOT_STREAK_LEN: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    FirstAttempt,
    RecordBreaker,
    BigImprovement,
    UnderAMinute,
    Lightning,
    Perfectionist,
    Sharpshooter,
    Precise,
    Flawless,
    SteadyHands,
    HotStreak,
    Dedicated,
    Master,
}

/// Everything a badge predicate may look at. `history` holds the earlier
/// attempts for the same task and mode, oldest first, excluding this one.
pub struct BadgeContext<'a> {
    pub result: &'a AttemptResult,
    pub is_new_best: bool,
    pub had_prior_best: bool,
    pub improvement: Option<f64>,
    pub grade: Grade,
    pub history: &'a [FinalizedResult],
}

impl Badge {
    pub const ALL: [Badge; 13] = [
        Badge::FirstAttempt,
        Badge::RecordBreaker,
        Badge::BigImprovement,
        Badge::UnderAMinute,
        Badge::Lightning,
        Badge::Perfectionist,
        Badge::Sharpshooter,
        Badge::Precise,
        Badge::Flawless,
        Badge::SteadyHands,
        Badge::HotStreak,
        Badge::Dedicated,
        Badge::Master,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Badge::FirstAttempt => "First Steps",
            Badge::RecordBreaker => "Record Breaker",
            Badge::BigImprovement => "Leap Forward",
            Badge::UnderAMinute => "Under a Minute",
            Badge::Lightning => "Lightning",
            Badge::Perfectionist => "Perfectionist",
            Badge::Sharpshooter => "Sharpshooter",
            Badge::Precise => "Precise",
            Badge::Flawless => "Flawless",
            Badge::SteadyHands => "Steady Hands",
            Badge::HotStreak => "Hot Streak",
            Badge::Dedicated => "Dedicated",
            Badge::Master => "Master",
        }
    }

    pub fn earned(self, ctx: &BadgeContext) -> bool {
        let r = ctx.result;
        let accuracy = r.score.accuracy;
        let time_attack = r.mode == SessionMode::TimeAttack && r.matched;
        match self {
            Badge::FirstAttempt => ctx.history.is_empty(),
            Badge::RecordBreaker => ctx.is_new_best && ctx.had_prior_best,
            Badge::BigImprovement => {
                ctx.is_new_best && ctx.improvement.is_some_and(|d| d >= BIG_IMPROVEMENT)
            }
            Badge::UnderAMinute => time_attack && r.completion_secs <= UNDER_A_MINUTE_SECS,
            Badge::Lightning => time_attack && r.completion_secs <= LIGHTNING_SECS,
            Badge::Perfectionist => accuracy >= 100.0,
            Badge::Sharpshooter => accuracy >= 98.0,
            Badge::Precise => accuracy >= 95.0,
            Badge::Flawless => r.corrections == 0,
            Badge::SteadyHands => r.corrections <= 2,
            Badge::HotStreak => {
                let needed = HOT_STREAK_LEN - 1;
                ctx.is_new_best
                    && ctx.history.len() >= needed
                    && ctx.history[ctx.history.len() - needed..]
                        .iter()
                        .all(|h| h.is_new_best)
            }
            Badge::Dedicated => ctx.history.len() + 1 >= DEDICATED_ATTEMPTS,
            Badge::Master => ctx.grade.is_top() && accuracy >= 98.0 && r.corrections <= 1,
        }
    }
}

pub fn evaluate_badges(ctx: &BadgeContext) -> BTreeSet<Badge> {
    Badge::ALL
        .into_iter()
        .filter(|badge| badge.earned(ctx))
        .collect()
}
