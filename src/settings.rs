use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pad::{Color, PenStyle};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives log output instead of stderr.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// How long notifications stay on screen, in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    /// Where every notification is appended. `None` disables the log.
    #[serde(default = "default_toast_log")]
    pub toast_log: Option<PathBuf>,
    #[serde(default = "default_pen_color")]
    pub pen_color: [u8; 4],
    #[serde(default = "default_pen_width")]
    pub pen_width: f32,
    /// Logical size of the handwriting pad.
    #[serde(default = "default_pad_size")]
    pub pad_size: [f32; 2],
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_search_min_query_len")]
    pub search_min_query_len: usize,
    /// Simulated delay before the stand-in recognizer answers.
    #[serde(default = "default_recognition_latency_ms")]
    pub recognition_latency_ms: u64,
    /// `heuristic` or `mock_api`.
    #[serde(default = "default_recognizer")]
    pub recognizer: String,
    /// Form action for dispense requests. Dispensing is disabled when unset.
    #[serde(default)]
    pub dispense_endpoint: Option<String>,
    #[serde(default = "default_dispense_timeout_secs")]
    pub dispense_timeout_secs: u64,
    #[serde(default = "default_medicines_file")]
    pub medicines_file: PathBuf,
    #[serde(default = "default_patients_file")]
    pub patients_file: PathBuf,
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    5.0
}

fn default_toast_log() -> Option<PathBuf> {
    Some(PathBuf::from(crate::toast_log::TOAST_LOG_FILE))
}

fn default_pen_color() -> [u8; 4] {
    [0, 0, 0, 255]
}

fn default_pen_width() -> f32 {
    3.0
}

fn default_pad_size() -> [f32; 2] {
    [400.0, 200.0]
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_search_min_query_len() -> usize {
    2
}

fn default_recognition_latency_ms() -> u64 {
    2000
}

fn default_recognizer() -> String {
    "heuristic".into()
}

fn default_dispense_timeout_secs() -> u64 {
    10
}

fn default_medicines_file() -> PathBuf {
    PathBuf::from("medicines.json")
}

fn default_patients_file() -> PathBuf {
    PathBuf::from("patients.json")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
            toast_log: default_toast_log(),
            pen_color: default_pen_color(),
            pen_width: default_pen_width(),
            pad_size: default_pad_size(),
            search_debounce_ms: default_search_debounce_ms(),
            search_min_query_len: default_search_min_query_len(),
            recognition_latency_ms: default_recognition_latency_ms(),
            recognizer: default_recognizer(),
            dispense_endpoint: None,
            dispense_timeout_secs: default_dispense_timeout_secs(),
            medicines_file: default_medicines_file(),
            patients_file: default_patients_file(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn pen_style(&self) -> PenStyle {
        PenStyle {
            color: Color::from(self.pen_color),
            width: if self.pen_width.is_finite() && self.pen_width > 0.0 {
                self.pen_width
            } else {
                default_pen_width()
            },
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn recognition_latency(&self) -> Duration {
        Duration::from_millis(self.recognition_latency_ms)
    }

    pub fn notice_duration(&self) -> Duration {
        Duration::from_secs_f32(self.toast_duration.max(0.5))
    }

    pub fn dispense_timeout(&self) -> Duration {
        Duration::from_secs(self.dispense_timeout_secs.max(1))
    }
}
