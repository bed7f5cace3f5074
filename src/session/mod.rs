pub mod clock;
pub mod controller;
pub mod input;
pub mod mode;
pub mod result;

pub use controller::{SessionController, SessionEvent, SessionSettings, SessionState};
pub use input::KeystrokeKind;
pub use mode::{SessionMode, TimerMode};
pub use result::{AttemptResult, FinalizedResult};
