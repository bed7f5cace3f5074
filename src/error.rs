use thiserror::Error;

/// Caller-misuse failures surfaced by the engine. Everything else (invalid
/// transitions, near-zero elapsed time) is absorbed locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("input too large for alignment: {len} chars exceeds limit of {limit}")]
    InvalidInput { len: usize, limit: usize },

    #[error("task has no reference text")]
    InvalidTask,
}

/// Which cross-check of a score snapshot failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaCheck {
    NetWpm,
    QualityScore,
    Kspc,
}

impl FormulaCheck {
    pub fn as_str(self) -> &'static str {
        match self {
            FormulaCheck::NetWpm => "net wpm",
            FormulaCheck::QualityScore => "quality score",
            FormulaCheck::Kspc => "kspc",
        }
    }
}

/// Data-integrity warning: a derived metric drifted from its defining formula.
/// Never aborts a session.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} formula check failed: expected {expected:.3}, got {actual:.3} ({deviation:.1}% deviation)", check.as_str(), deviation = deviation * 100.0)]
pub struct FormulaInvalid {
    pub check: FormulaCheck,
    pub expected: f64,
    pub actual: f64,
    pub deviation: f64,
}
