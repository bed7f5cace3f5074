use std::collections::HashMap;

use anyhow::Result;

use crate::record::best::{PersonalBestRecord, RecordKey};
use crate::session::result::FinalizedResult;
use crate::store::RecordRepository;
use crate::task::TaskId;

#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    history: HashMap<RecordKey, Vec<FinalizedResult>>,
    bests: HashMap<RecordKey, PersonalBestRecord>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result_count(&self) -> usize {
        self.history.values().map(Vec::len).sum()
    }
}

impl RecordRepository for MemoryRepository {
    fn fetch_history(&self, key: &RecordKey) -> Result<Vec<FinalizedResult>> {
        Ok(self.history.get(key).cloned().unwrap_or_default())
    }

    fn fetch_best(&self, key: &RecordKey) -> Result<Option<PersonalBestRecord>> {
        Ok(self.bests.get(key).cloned())
    }

    fn save_result(&mut self, result: &FinalizedResult) -> Result<()> {
        let key = RecordKey::of(&result.attempt);
        self.history.entry(key).or_default().push(result.clone());
        Ok(())
    }

    fn save_best(&mut self, best: &PersonalBestRecord) -> Result<()> {
        self.bests.insert(best.key(), best.clone());
        Ok(())
    }

    fn delete_task(&mut self, task_id: &TaskId) -> Result<()> {
        self.history.retain(|key, _| &key.task_id != task_id);
        self.bests.retain(|key, _| &key.task_id != task_id);
        Ok(())
    }
}
