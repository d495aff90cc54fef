use std::fs;
use std::path::{Path, PathBuf};

use lingua_core::{HistoryEntry, HistoryLog};
use lingua_engine::AtomicWriter;
use lingua_logging::{lingua_error, lingua_info, lingua_warn};
use serde::{Deserialize, Serialize};

const HISTORY_FILENAME: &str = ".lingua_history.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedEntry {
    text: String,
    result: String,
    source: String,
    target: String,
    cost_secs: String,
    recorded_utc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedHistory {
    entries: Vec<PersistedEntry>,
}

/// Loads and saves the translation history as a single RON blob in
/// `data_dir`. Read failures degrade to an empty log; write failures are
/// logged and swallowed, matching the rest of the diagnostics-only
/// persistence policy.
#[derive(Clone)]
pub struct HistoryStore {
    data_dir: PathBuf,
}

impl HistoryStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILENAME)
    }

    pub fn load(&self) -> HistoryLog {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return HistoryLog::new();
            }
            Err(err) => {
                lingua_warn!("Failed to read history from {:?}: {}", path, err);
                return HistoryLog::new();
            }
        };

        let persisted: PersistedHistory = match ron::from_str(&content) {
            Ok(persisted) => persisted,
            Err(err) => {
                lingua_warn!("Failed to parse history from {:?}: {}", path, err);
                return HistoryLog::new();
            }
        };

        let entries = persisted
            .entries
            .into_iter()
            .map(|entry| HistoryEntry {
                text: entry.text,
                result: entry.result,
                source: entry.source,
                target: entry.target,
                cost_secs: entry.cost_secs,
                recorded_utc: entry.recorded_utc,
            })
            .collect();

        lingua_info!("Loaded translation history from {:?}", path);
        HistoryLog::from_entries(entries)
    }

    pub fn save(&self, log: &HistoryLog) {
        let persisted = PersistedHistory {
            entries: log
                .entries()
                .iter()
                .map(|entry| PersistedEntry {
                    text: entry.text.clone(),
                    result: entry.result.clone(),
                    source: entry.source.clone(),
                    target: entry.target.clone(),
                    cost_secs: entry.cost_secs.clone(),
                    recorded_utc: entry.recorded_utc.clone(),
                })
                .collect(),
        };

        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&persisted, pretty) {
            Ok(text) => text,
            Err(err) => {
                lingua_error!("Failed to serialize history: {}", err);
                return;
            }
        };

        let writer = AtomicWriter::new(self.data_dir.clone());
        if let Err(err) = writer.write(HISTORY_FILENAME, &content) {
            lingua_error!("Failed to write history to {:?}: {}", self.data_dir, err);
        }
    }

    /// Removes the persisted blob entirely (the "clear history" action).
    pub fn clear(&self) {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => lingua_warn!("Failed to remove history at {:?}: {}", path, err),
        }
    }
}

/// Where the history blob lives by default: the current working directory.
pub fn default_data_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf())
}
