use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Length class of a passage. Only used to pick the grading baseline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Word,
    #[default]
    Sentence,
    Paragraph,
    Article,
}

impl TaskType {
    /// Completion time that earns a full time score.
    pub fn baseline(self) -> Duration {
        match self {
            TaskType::Word => Duration::from_secs(15),
            TaskType::Sentence => Duration::from_secs(30),
            TaskType::Paragraph => Duration::from_secs(90),
            TaskType::Article => Duration::from_secs(240),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Word => "word",
            TaskType::Sentence => "sentence",
            TaskType::Paragraph => "paragraph",
            TaskType::Article => "article",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub task_type: TaskType,
}

impl Task {
    pub fn new(id: impl Into<String>, text: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            id: TaskId::new(id),
            text: text.into(),
            task_type,
        }
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
