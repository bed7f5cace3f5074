use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::warn;
use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::record::best::{PersonalBestRecord, RecordKey};
use crate::session::result::FinalizedResult;
use crate::store::RecordRepository;
use crate::store::schema::{BestRecordsData, HistoryData, Versioned};
use crate::task::TaskId;

const HISTORY_FILE: &str = "history.json";
const BESTS_FILE: &str = "bests.json";

/// A store file as found on disk.
enum Loaded<T> {
    Missing,
    Data(T),
    /// Unreadable, corrupt, or written under another schema version.
    Unusable(String),
}

pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_base_dir(PathBuf::from(&config.data_dir))
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating store directory {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn backup_path(&self, name: &str) -> PathBuf {
        self.file_path(name).with_extension("json.bak")
    }

    fn read<T: DeserializeOwned + Versioned>(&self, name: &str) -> Loaded<T> {
        let path = self.file_path(name);
        if !path.exists() {
            return Loaded::Missing;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => return Loaded::Unusable(format!("unreadable: {e}")),
        };
        match serde_json::from_str::<T>(&content) {
            Ok(data) if data.needs_reset() => Loaded::Unusable(format!(
                "schema version {} unsupported",
                data.schema_version()
            )),
            Ok(data) => Loaded::Data(data),
            Err(e) => Loaded::Unusable(format!("corrupt: {e}")),
        }
    }

    /// Unusable files read as empty and are left on disk untouched.
    fn load<T: DeserializeOwned + Versioned + Default>(&self, name: &str) -> T {
        match self.read(name) {
            Loaded::Missing => T::default(),
            Loaded::Data(data) => data,
            Loaded::Unusable(reason) => {
                warn!("ignoring {} ({reason})", self.file_path(name).display());
                T::default()
            }
        }
    }

    /// Load ahead of a read-modify-write. An unusable file is moved to
    /// `<name>.bak` first so the write that follows cannot destroy it.
    fn load_for_update<T: DeserializeOwned + Versioned + Default>(&self, name: &str) -> Result<T> {
        match self.read(name) {
            Loaded::Missing => Ok(T::default()),
            Loaded::Data(data) => Ok(data),
            Loaded::Unusable(reason) => {
                let path = self.file_path(name);
                let bak_path = self.backup_path(name);
                if bak_path.exists() {
                    bail!(
                        "{} is unusable ({reason}) and backup {} already exists; move one of them aside",
                        path.display(),
                        bak_path.display()
                    );
                }
                fs::rename(&path, &bak_path)
                    .with_context(|| format!("backing up {}", path.display()))?;
                warn!(
                    "{} is unusable ({reason}); moved to {} and starting fresh",
                    path.display(),
                    bak_path.display()
                );
                Ok(T::default())
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_history(&self) -> HistoryData {
        self.load(HISTORY_FILE)
    }

    pub fn save_history(&self, data: &HistoryData) -> Result<()> {
        self.save(HISTORY_FILE, data)
    }

    pub fn load_bests(&self) -> BestRecordsData {
        self.load(BESTS_FILE)
    }

    pub fn save_bests(&self, data: &BestRecordsData) -> Result<()> {
        self.save(BESTS_FILE, data)
    }
}

impl RecordRepository for JsonStore {
    fn fetch_history(&self, key: &RecordKey) -> Result<Vec<FinalizedResult>> {
        Ok(self
            .load_history()
            .results
            .into_iter()
            .filter(|r| RecordKey::of(&r.attempt) == *key)
            .collect())
    }

    fn fetch_best(&self, key: &RecordKey) -> Result<Option<PersonalBestRecord>> {
        Ok(self
            .load_bests()
            .bests
            .into_iter()
            .find(|b| b.key() == *key))
    }

    fn save_result(&mut self, result: &FinalizedResult) -> Result<()> {
        let mut data: HistoryData = self.load_for_update(HISTORY_FILE)?;
        data.results.push(result.clone());
        self.save_history(&data)
    }

    fn save_best(&mut self, best: &PersonalBestRecord) -> Result<()> {
        let mut data: BestRecordsData = self.load_for_update(BESTS_FILE)?;
        let key = best.key();
        data.bests.retain(|b| b.key() != key);
        data.bests.push(best.clone());
        self.save_bests(&data)
    }

    fn delete_task(&mut self, task_id: &TaskId) -> Result<()> {
        let mut history: HistoryData = self.load_for_update(HISTORY_FILE)?;
        history.results.retain(|r| &r.attempt.task_id != task_id);
        self.save_history(&history)?;

        let mut bests: BestRecordsData = self.load_for_update(BESTS_FILE)?;
        bests.bests.retain(|b| &b.task_id != task_id);
        self.save_bests(&bests)
    }
}
