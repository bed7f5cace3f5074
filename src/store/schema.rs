use serde::{Deserialize, Serialize};

use crate::record::best::PersonalBestRecord;
use crate::session::result::FinalizedResult;

pub const SCHEMA_VERSION: u32 = 1;

/// Store files carry the schema version they were written under.
pub trait Versioned {
    fn schema_version(&self) -> u32;

    /// Check if loaded data has a stale schema version and needs reset.
    fn needs_reset(&self) -> bool {
        self.schema_version() != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    pub results: Vec<FinalizedResult>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            results: Vec::new(),
        }
    }
}

impl Versioned for HistoryData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}

/// One entry per (task, mode). Stored as a list since JSON object keys must be strings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BestRecordsData {
    pub schema_version: u32,
    pub bests: Vec<PersonalBestRecord>,
}

impl Default for BestRecordsData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            bests: Vec::new(),
        }
    }
}

impl Versioned for BestRecordsData {
    fn schema_version(&self) -> u32 {
        self.schema_version
    }
}
