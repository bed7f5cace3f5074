use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::alignment::Aligner;
use crate::engine::compare::{self, ComparisonResult};
use crate::engine::normalize;
use crate::engine::scoring::{self, DEFAULT_FORMULA_TOLERANCE, ScoreSnapshot};
use crate::error::{EngineError, FormulaInvalid};
use crate::session::clock::SessionClock;
use crate::session::input::{KeystrokeKind, KeystrokeTally};
use crate::session::mode::{SessionMode, TimerMode};
use crate::session::result::AttemptResult;
use crate::task::Task;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    Active,
    Paused,
    Completed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    Started { mode: SessionMode },
    Paused,
    Resumed,
    TimeUp,
    Completed(AttemptResult),
    Aborted,
    /// The live snapshot stopped satisfying its formula cross-checks.
    IntegrityWarning(FormulaInvalid),
}

/// The slice of [`Config`] the controller needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSettings {
    pub exam_duration: Duration,
    pub practice_duration: Duration,
    pub time_attack_grace: Duration,
    pub max_alignment_chars: usize,
    pub formula_tolerance: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            exam_duration: config.exam_duration(),
            practice_duration: config.practice_duration(),
            time_attack_grace: config.time_attack_grace(),
            max_alignment_chars: config.max_alignment_chars,
            formula_tolerance: config.formula_tolerance,
        }
    }
}

/// Time attack input matched the target; completion fires once the grace
/// window has run out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingFinish {
    matched_at: Duration,
    grace_left: Duration,
}

/// Owns one typing test from start to completion. Calls that are not valid
/// in the current state are ignored and produce no events.
pub struct SessionController {
    settings: SessionSettings,
    aligner: Aligner,
    state: SessionState,
    task: Option<Task>,
    mode: SessionMode,
    input: String,
    clock: SessionClock,
    keystrokes: KeystrokeTally,
    snapshot: ScoreSnapshot,
    integrity: Result<(), FormulaInvalid>,
    pending_finish: Option<PendingFinish>,
    last_result: Option<AttemptResult>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl SessionController {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            aligner: Aligner::new(settings.max_alignment_chars),
            state: SessionState::Idle,
            task: None,
            mode: SessionMode::Standard,
            input: String::new(),
            clock: SessionClock::default(),
            keystrokes: KeystrokeTally::default(),
            snapshot: ScoreSnapshot::default(),
            integrity: Ok(()),
            pending_finish: None,
            last_result: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(SessionSettings::from(config))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn snapshot(&self) -> &ScoreSnapshot {
        &self.snapshot
    }

    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Time left in a standard session; `None` in time attack.
    pub fn remaining(&self) -> Option<Duration> {
        self.clock.remaining()
    }

    pub fn corrections(&self) -> usize {
        self.keystrokes.corrections
    }

    pub fn total_keystrokes(&self) -> usize {
        self.keystrokes.total
    }

    pub fn integrity(&self) -> Result<(), &FormulaInvalid> {
        self.integrity.as_ref().map(|_| ())
    }

    pub fn last_result(&self) -> Option<&AttemptResult> {
        self.last_result.as_ref()
    }

    pub fn is_finishing(&self) -> bool {
        self.pending_finish.is_some()
    }

    /// Live highlight of the current input against the task text.
    pub fn comparison(&self) -> Result<ComparisonResult, EngineError> {
        let target = self.task.as_ref().map(|t| t.text.as_str()).unwrap_or("");
        compare::compare(&self.aligner, &self.input, target)
    }

    pub fn start(
        &mut self,
        task: Task,
        mode: SessionMode,
        timer: TimerMode,
    ) -> Result<Vec<SessionEvent>, EngineError> {
        if matches!(self.state, SessionState::Active | SessionState::Paused) {
            debug!("start ignored: session is {:?}", self.state);
            return Ok(Vec::new());
        }
        if !task.has_text() {
            return Err(EngineError::InvalidTask);
        }

        let limit = match mode {
            SessionMode::Standard => Some(
                timer.duration(self.settings.exam_duration, self.settings.practice_duration),
            ),
            SessionMode::TimeAttack => None,
        };
        debug!(
            "starting {} session on task {} (limit {:?})",
            mode.as_str(),
            task.id,
            limit
        );

        self.task = Some(task);
        self.mode = mode;
        self.input.clear();
        self.clock = SessionClock::new(limit);
        self.keystrokes.reset();
        self.integrity = Ok(());
        self.pending_finish = None;
        self.state = SessionState::Active;
        let mut events = vec![SessionEvent::Started { mode }];
        events.extend(self.refresh());
        Ok(events)
    }

    pub fn tick(&mut self, delta: Duration) -> Vec<SessionEvent> {
        if self.state != SessionState::Active {
            return Vec::new();
        }
        self.clock.advance(delta);

        match self.mode {
            SessionMode::Standard => {
                let mut events = self.refresh();
                if self.clock.is_expired() {
                    info!("time up after {:.1}s", self.clock.elapsed().as_secs_f64());
                    events.push(SessionEvent::TimeUp);
                    events.push(SessionEvent::Completed(self.complete(true)));
                }
                events
            }
            SessionMode::TimeAttack => {
                if let Some(pending) = self.pending_finish.as_mut() {
                    pending.grace_left = pending.grace_left.saturating_sub(delta);
                    if pending.grace_left.is_zero() {
                        return vec![SessionEvent::Completed(self.complete(false))];
                    }
                    // The score is frozen at the matching input while finishing.
                    return Vec::new();
                }
                self.refresh()
            }
        }
    }

    /// Replace the typed text and rescore immediately.
    pub fn update_input(&mut self, text: impl Into<String>) -> Vec<SessionEvent> {
        if self.state != SessionState::Active {
            return Vec::new();
        }
        self.input = text.into();
        let mut events = self.refresh();

        if self.mode == SessionMode::TimeAttack {
            if self.is_exact_match() {
                if self.pending_finish.is_none() {
                    debug!(
                        "exact match at {:.2}s, finishing after grace",
                        self.clock.elapsed().as_secs_f64()
                    );
                    self.pending_finish = Some(PendingFinish {
                        matched_at: self.clock.elapsed(),
                        grace_left: self.settings.time_attack_grace,
                    });
                }
                if self.settings.time_attack_grace.is_zero() {
                    events.push(SessionEvent::Completed(self.complete(false)));
                }
            } else if self.pending_finish.take().is_some() {
                debug!("input diverged during grace window, finish cancelled");
            }
        }
        events
    }

    pub fn record_keystroke(&mut self, kind: KeystrokeKind) {
        if self.state != SessionState::Active {
            return;
        }
        self.keystrokes.record(kind);
    }

    pub fn pause(&mut self) -> Vec<SessionEvent> {
        if self.state != SessionState::Active {
            return Vec::new();
        }
        self.state = SessionState::Paused;
        debug!("paused at {:.2}s", self.clock.elapsed().as_secs_f64());
        vec![SessionEvent::Paused]
    }

    pub fn resume(&mut self) -> Vec<SessionEvent> {
        if self.state != SessionState::Paused {
            return Vec::new();
        }
        self.state = SessionState::Active;
        debug!("resumed at {:.2}s", self.clock.elapsed().as_secs_f64());
        vec![SessionEvent::Resumed]
    }

    /// Abort the attempt without producing a result. Idempotent.
    pub fn stop(&mut self) -> Vec<SessionEvent> {
        if !matches!(self.state, SessionState::Active | SessionState::Paused) {
            return Vec::new();
        }
        info!("session aborted");
        self.state = SessionState::Idle;
        self.input.clear();
        self.keystrokes.reset();
        self.pending_finish = None;
        self.clock = SessionClock::default();
        self.snapshot = ScoreSnapshot::default();
        self.integrity = Ok(());
        vec![SessionEvent::Aborted]
    }

    /// Finish now and return the frozen result.
    pub fn end(&mut self) -> Option<AttemptResult> {
        if !matches!(self.state, SessionState::Active | SessionState::Paused) {
            return None;
        }
        Some(self.complete(false))
    }

    fn is_exact_match(&self) -> bool {
        let Some(task) = self.task.as_ref() else {
            return false;
        };
        normalize::for_exact_match(&self.input) == normalize::for_exact_match(&task.text)
    }

    fn score_at(&self, elapsed: Duration) -> ScoreSnapshot {
        let target = self.task.as_ref().map(|t| t.text.as_str()).unwrap_or("");
        scoring::score(&self.input, target, elapsed.as_secs_f64())
            .with_keystrokes(self.keystrokes.total, self.keystrokes.corrections)
    }

    /// Recompute the live snapshot and report a newly failing formula check.
    fn refresh(&mut self) -> Vec<SessionEvent> {
        self.snapshot = self.score_at(self.clock.elapsed());
        self.check_integrity()
    }

    fn check_integrity(&mut self) -> Vec<SessionEvent> {
        let check = self.snapshot.validate(self.tolerance());
        let newly_failing = self.integrity.is_ok() && check.is_err();
        self.integrity = check;
        match (&self.integrity, newly_failing) {
            (Err(err), true) => {
                warn!("score snapshot failed integrity check: {err}");
                vec![SessionEvent::IntegrityWarning(err.clone())]
            }
            _ => Vec::new(),
        }
    }

    fn tolerance(&self) -> f64 {
        if self.settings.formula_tolerance > 0.0 {
            self.settings.formula_tolerance
        } else {
            DEFAULT_FORMULA_TOLERANCE
        }
    }

    fn complete(&mut self, timed_out: bool) -> AttemptResult {
        let elapsed = self.clock.elapsed();
        let matched = self.pending_finish.is_some() || self.is_exact_match();
        let completion = self
            .pending_finish
            .take()
            .map(|p| p.matched_at)
            .unwrap_or(elapsed);
        self.snapshot = self.score_at(completion);
        self.integrity = self.snapshot.validate(self.tolerance());

        let task = self.task.as_ref();
        let result = AttemptResult {
            task_id: task.map(|t| t.id.clone()).unwrap_or_default(),
            task_type: task.map(|t| t.task_type).unwrap_or_default(),
            mode: self.mode,
            score: self.snapshot.clone(),
            elapsed_secs: elapsed.as_secs_f64(),
            completion_secs: completion.as_secs_f64(),
            corrections: self.keystrokes.corrections,
            total_keystrokes: self.keystrokes.total,
            typed_text: std::mem::take(&mut self.input),
            formula_valid: self.integrity.is_ok(),
            timed_out,
            matched,
            finished_at: Utc::now(),
        };
        info!(
            "{} session complete: {:.1} net wpm, {:.1}% accuracy in {:.2}s",
            self.mode.as_str(),
            result.score.net_wpm,
            result.score.accuracy,
            result.completion_secs
        );
        self.state = SessionState::Completed;
        self.last_result = Some(result.clone());
        result
    }
}
