// Typing assessment engine: alignment-based diffing, scoring, the test
// session state machine and personal-best evaluation. The `keyscore` binary
// in main.rs is a thin headless driver over this library.

pub mod config;
pub mod engine;
pub mod error;
pub mod keyboard;
pub mod record;
pub mod replay;
pub mod session;
pub mod store;
pub mod task;

pub use config::Config;
pub use error::{EngineError, FormulaInvalid};
pub use record::{Evaluation, RecordEvaluator};
pub use session::{SessionController, SessionEvent, SessionMode, SessionState, TimerMode};
pub use store::{JsonStore, MemoryRepository, RecordRepository};
pub use task::{Task, TaskId, TaskType};
