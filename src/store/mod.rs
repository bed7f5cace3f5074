pub mod json_store;
pub mod memory;
pub mod schema;

use anyhow::Result;

use crate::record::best::{PersonalBestRecord, RecordKey};
use crate::session::result::FinalizedResult;
use crate::task::TaskId;

pub use json_store::JsonStore;
pub use memory::MemoryRepository;

/// Persistence for finished attempts and personal bests, keyed by task and mode.
pub trait RecordRepository {
    /// Earlier results for `key`, oldest first.
    fn fetch_history(&self, key: &RecordKey) -> Result<Vec<FinalizedResult>>;
    fn fetch_best(&self, key: &RecordKey) -> Result<Option<PersonalBestRecord>>;
    fn save_result(&mut self, result: &FinalizedResult) -> Result<()>;
    /// Replaces any stored best for the record's key.
    fn save_best(&mut self, best: &PersonalBestRecord) -> Result<()>;
    /// Drops every result and best stored for the task, in all modes.
    fn delete_task(&mut self, task_id: &TaskId) -> Result<()>;
}
