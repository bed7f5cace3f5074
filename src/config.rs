use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::alignment::DEFAULT_MAX_CHARS;
use crate::engine::scoring::DEFAULT_FORMULA_TOLERANCE;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_target_wpm")]
    pub target_wpm: u32,
    #[serde(default = "default_exam_duration_secs")]
    pub exam_duration_secs: u64,
    #[serde(default = "default_practice_duration_secs")]
    pub practice_duration_secs: u64,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_time_attack_grace_ms")]
    pub time_attack_grace_ms: u64,
    #[serde(default = "default_max_alignment_chars")]
    pub max_alignment_chars: usize,
    #[serde(default = "default_formula_tolerance")]
    pub formula_tolerance: f64,
    #[serde(default = "default_time_attack_best_accuracy")]
    pub time_attack_best_accuracy: f64,
    #[serde(default = "default_standard_best_accuracy")]
    pub standard_best_accuracy: f64,
    #[serde(default = "default_keyboard_layout")]
    pub keyboard_layout: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_target_wpm() -> u32 {
    35
}
fn default_exam_duration_secs() -> u64 {
    300
}
fn default_practice_duration_secs() -> u64 {
    60
}
fn default_tick_rate_ms() -> u64 {
    100
}
fn default_time_attack_grace_ms() -> u64 {
    150
}
fn default_max_alignment_chars() -> usize {
    DEFAULT_MAX_CHARS
}
fn default_formula_tolerance() -> f64 {
    DEFAULT_FORMULA_TOLERANCE
}
fn default_time_attack_best_accuracy() -> f64 {
    95.0
}
fn default_standard_best_accuracy() -> f64 {
    90.0
}
fn default_keyboard_layout() -> String {
    "qwerty".to_string()
}
fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keyscore")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_wpm: default_target_wpm(),
            exam_duration_secs: default_exam_duration_secs(),
            practice_duration_secs: default_practice_duration_secs(),
            tick_rate_ms: default_tick_rate_ms(),
            time_attack_grace_ms: default_time_attack_grace_ms(),
            max_alignment_chars: default_max_alignment_chars(),
            formula_tolerance: default_formula_tolerance(),
            time_attack_best_accuracy: default_time_attack_best_accuracy(),
            standard_best_accuracy: default_standard_best_accuracy(),
            keyboard_layout: default_keyboard_layout(),
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyscore")
            .join("config.toml")
    }

    /// Clamp values that would make sessions or scoring degenerate.
    pub fn validate(&mut self) {
        self.target_wpm = self.target_wpm.clamp(10, 300);
        self.exam_duration_secs = self.exam_duration_secs.clamp(10, 3600);
        self.practice_duration_secs = self.practice_duration_secs.clamp(5, 3600);
        self.tick_rate_ms = self.tick_rate_ms.clamp(10, 1000);
        self.time_attack_grace_ms = self.time_attack_grace_ms.min(2000);
        self.max_alignment_chars = self.max_alignment_chars.clamp(16, 20_000);
        if !self.formula_tolerance.is_finite() || self.formula_tolerance <= 0.0 {
            self.formula_tolerance = default_formula_tolerance();
        }
        self.time_attack_best_accuracy = clamp_percent(self.time_attack_best_accuracy, 95.0);
        self.standard_best_accuracy = clamp_percent(self.standard_best_accuracy, 90.0);
        if !matches!(self.keyboard_layout.as_str(), "qwerty" | "dvorak" | "colemak") {
            self.keyboard_layout = default_keyboard_layout();
        }
    }

    pub fn exam_duration(&self) -> Duration {
        Duration::from_secs(self.exam_duration_secs)
    }

    pub fn practice_duration(&self) -> Duration {
        Duration::from_secs(self.practice_duration_secs)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn time_attack_grace(&self) -> Duration {
        Duration::from_millis(self.time_attack_grace_ms)
    }
}

fn clamp_percent(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        fallback
    }
}
