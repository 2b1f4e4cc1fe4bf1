use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::engine::utils::now_ms;
use crate::logging;
use crate::types::HighScoreResponse;

pub trait ScoreStore: Send {
    fn get(&self) -> u32;
    fn set(&mut self, value: u32);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryScoreStore {
    value: u32,
}

impl MemoryScoreStore {
    pub fn new(value: u32) -> Self {
        Self { value }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get(&self) -> u32 {
        self.value
    }

    fn set(&mut self, value: u32) {
        self.value = value;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct HighScoreFile {
    version: u8,
    #[serde(rename = "highScore", alias = "high_score")]
    high_score: u32,
    #[serde(rename = "updatedAtMs", alias = "updated_at_ms", default)]
    updated_at_ms: u64,
}

pub struct FileScoreStore {
    file_path: PathBuf,
    high_score: u32,
}

impl FileScoreStore {
    pub fn new(file_path: PathBuf) -> Self {
        let high_score = load_high_score(&file_path);
        Self {
            file_path,
            high_score,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn save(&self) {
        if let Some(parent) = self.file_path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                logging::error(
                    "score_store_write_failed",
                    json!({
                        "path": parent.to_string_lossy(),
                        "error": format!("failed to create parent dir: {error}"),
                    }),
                );
                return;
            }
        }

        let payload = HighScoreFile {
            version: 1,
            high_score: self.high_score,
            updated_at_ms: now_ms(),
        };
        let result = serde_json::to_string_pretty(&payload)
            .map_err(|error| error.to_string())
            .and_then(|text| fs::write(&self.file_path, text).map_err(|error| error.to_string()));
        if let Err(error) = result {
            logging::error(
                "score_store_write_failed",
                json!({
                    "path": self.file_path.to_string_lossy(),
                    "error": error,
                }),
            );
        }
    }
}

impl ScoreStore for FileScoreStore {
    fn get(&self) -> u32 {
        self.high_score
    }

    fn set(&mut self, value: u32) {
        self.high_score = value;
        self.save();
    }
}

pub fn high_score_response(store: &dyn ScoreStore) -> HighScoreResponse {
    HighScoreResponse {
        high_score: store.get(),
        generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn load_high_score(path: &Path) -> u32 {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                logging::warn(
                    "score_store_read_failed",
                    json!({
                        "path": path.to_string_lossy(),
                        "error": error.to_string(),
                    }),
                );
            }
            return 0;
        }
    };

    match serde_json::from_str::<HighScoreFile>(&text) {
        Ok(file) if file.version == 1 => file.high_score,
        Ok(file) => {
            logging::warn(
                "score_store_unsupported_version",
                json!({
                    "path": path.to_string_lossy(),
                    "version": file.version,
                }),
            );
            0
        }
        Err(error) => {
            logging::warn(
                "score_store_parse_failed",
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        let unique = format!(
            "{}-{}-{}",
            name,
            std::process::id(),
            now_ms().saturating_add(rand::random::<u32>() as u64)
        );
        std::env::temp_dir().join(unique).join("high_score.json")
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryScoreStore::new(5);
        assert_eq!(store.get(), 5);
        store.set(40);
        assert_eq!(store.get(), 40);
    }

    #[test]
    fn missing_file_loads_as_zero_and_set_creates_it() {
        let path = temp_file("score-store-create");
        let mut store = FileScoreStore::new(path.clone());
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.get(), 0);

        store.set(1_230);
        let text = fs::read_to_string(&path).expect("file written");
        let parsed: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(parsed["version"], 1);
        assert_eq!(parsed["highScore"], 1_230);

        let reloaded = FileScoreStore::new(path.clone());
        assert_eq!(reloaded.get(), 1_230);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir_all(path.parent().expect("parent exists"));
    }

    #[test]
    fn unsupported_version_and_garbage_load_as_zero() {
        let path = temp_file("score-store-invalid");
        let parent = path.parent().expect("parent exists").to_path_buf();
        fs::create_dir_all(&parent).expect("create dir");

        fs::write(&path, r#"{"version":2,"highScore":500}"#).expect("write file");
        assert_eq!(FileScoreStore::new(path.clone()).get(), 0);

        fs::write(&path, "not json").expect("write file");
        assert_eq!(FileScoreStore::new(path.clone()).get(), 0);

        fs::write(&path, r#"{"version":1,"high_score":77}"#).expect("write file");
        assert_eq!(FileScoreStore::new(path.clone()).get(), 77);

        let _ = fs::remove_file(&path);
        let _ = fs::remove_dir_all(&parent);
    }

    #[test]
    fn response_reports_current_value() {
        let store = MemoryScoreStore::new(90);
        let response = high_score_response(&store);
        assert_eq!(response.high_score, 90);
        assert!(response.generated_at_iso.ends_with('Z'));
    }
}
