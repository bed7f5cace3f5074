use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Fixed-duration test ranked by net WPM.
    #[default]
    Standard,
    /// Race to an exact copy of the text, ranked by completion time.
    TimeAttack,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Standard => "standard",
            SessionMode::TimeAttack => "time_attack",
        }
    }
}

/// Duration source for a standard session. Ignored in time attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Fixed exam duration from the configuration.
    Exam,
    /// Practice run; without `secs` the configured practice length applies.
    Practice {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secs: Option<u64>,
    },
}

impl TimerMode {
    pub fn practice(secs: u64) -> Self {
        TimerMode::Practice { secs: Some(secs) }
    }

    pub fn duration(self, exam_duration: Duration, practice_duration: Duration) -> Duration {
        match self {
            TimerMode::Exam => exam_duration,
            TimerMode::Practice { secs: Some(secs) } => Duration::from_secs(secs),
            TimerMode::Practice { secs: None } => practice_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_durations() {
        let exam = Duration::from_secs(300);
        let practice = Duration::from_secs(60);
        assert_eq!(TimerMode::Exam.duration(exam, practice), exam);
        assert_eq!(
            TimerMode::practice(45).duration(exam, practice),
            Duration::from_secs(45)
        );
        assert_eq!(TimerMode::Practice { secs: None }.duration(exam, practice), practice);
    }

    #[test]
    fn test_mode_serde_names() {
        let json = serde_json::to_string(&SessionMode::TimeAttack).unwrap();
        assert_eq!(json, "\"time_attack\"");
        assert_eq!(SessionMode::TimeAttack.as_str(), "time_attack");
        let timer: TimerMode = serde_json::from_str(r#"{"practice": {"secs": 30}}"#).unwrap();
        assert_eq!(timer, TimerMode::practice(30));
        let timer: TimerMode = serde_json::from_str(r#"{"practice": {}}"#).unwrap();
        assert_eq!(timer, TimerMode::Practice { secs: None });
    }
}
