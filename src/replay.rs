//! Headless playback of a recorded typing session.
//!
//! A script names the task, mode and timer plus a list of actions stamped with
//! wall-clock offsets. Playback advances the controller in fixed ticks and
//! applies each action once its offset is reached, so paused stretches in the
//! script are excluded from the measured time exactly as they would be live.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::session::controller::{SessionController, SessionEvent, SessionState};
use crate::session::input::KeystrokeKind;
use crate::session::mode::{SessionMode, TimerMode};
use crate::session::result::AttemptResult;
use crate::task::Task;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayAction {
    /// Type each char of `text` in turn.
    Type { text: String },
    Backspace {
        #[serde(default = "default_count")]
        count: usize,
    },
    /// Replace the whole input, as a paste would.
    SetInput { text: String },
    Pause,
    Resume,
    Stop,
    End,
}

fn default_count() -> usize {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ReplayAction,
}

impl ScriptEvent {
    fn at(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub task: Task,
    #[serde(default)]
    pub mode: SessionMode,
    #[serde(default = "default_timer")]
    pub timer: TimerMode,
    pub events: Vec<ScriptEvent>,
}

fn default_timer() -> TimerMode {
    TimerMode::Exam
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReplayOutcome {
    pub events: Vec<SessionEvent>,
    /// `None` when the script stopped the session.
    pub result: Option<AttemptResult>,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading replay script {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing replay script {}", path.display()))
    }

    /// Drive `controller` through the script until the session finishes.
    /// Events apply in `at_ms` order; ties keep their listed order.
    ///
    /// Once every action has been applied, a standard session runs until its
    /// timer expires and a time attack waits out a pending finish; anything
    /// still open after that is ended on the spot.
    pub fn run(&self, controller: &mut SessionController, tick: Duration) -> Result<ReplayOutcome> {
        if tick.is_zero() {
            bail!("replay tick must be greater than zero");
        }

        let mut events = controller.start(self.task.clone(), self.mode, self.timer)?;
        let mut ordered: Vec<&ScriptEvent> = self.events.iter().collect();
        ordered.sort_by_key(|e| e.at_ms);
        let mut pending = ordered.into_iter().peekable();
        let mut now = Duration::ZERO;

        loop {
            while let Some(event) = pending.next_if(|e| e.at() <= now) {
                events.extend(apply(controller, &event.action));
            }
            if controller.state() != SessionState::Active && controller.state() != SessionState::Paused {
                break;
            }
            if pending.peek().is_none() && !self.keeps_running(controller) {
                if let Some(result) = controller.end() {
                    events.push(SessionEvent::Completed(result));
                }
                break;
            }
            events.extend(controller.tick(tick));
            now += tick;
        }

        let result = events.iter().rev().find_map(|e| match e {
            SessionEvent::Completed(result) => Some(result.clone()),
            _ => None,
        });
        debug!(
            "replay of {} finished after {:.2}s of script time",
            self.task.id,
            now.as_secs_f64()
        );
        Ok(ReplayOutcome { events, result })
    }

    fn keeps_running(&self, controller: &SessionController) -> bool {
        if controller.state() != SessionState::Active {
            return false;
        }
        match controller.mode() {
            SessionMode::Standard => true,
            SessionMode::TimeAttack => controller.is_finishing(),
        }
    }
}

fn apply(controller: &mut SessionController, action: &ReplayAction) -> Vec<SessionEvent> {
    match action {
        ReplayAction::Type { text } => {
            let mut events = Vec::new();
            let mut input = controller.input().to_string();
            for ch in text.chars() {
                controller.record_keystroke(KeystrokeKind::Char);
                input.push(ch);
                events.extend(controller.update_input(input.clone()));
            }
            events
        }
        ReplayAction::Backspace { count } => {
            let mut events = Vec::new();
            let mut input = controller.input().to_string();
            for _ in 0..*count {
                controller.record_keystroke(KeystrokeKind::Backspace);
                input.pop();
                events.extend(controller.update_input(input.clone()));
            }
            events
        }
        ReplayAction::SetInput { text } => controller.update_input(text.clone()),
        ReplayAction::Pause => controller.pause(),
        ReplayAction::Resume => controller.resume(),
        ReplayAction::Stop => controller.stop(),
        ReplayAction::End => controller
            .end()
            .map(|result| vec![SessionEvent::Completed(result)])
            .unwrap_or_default(),
    }
}
