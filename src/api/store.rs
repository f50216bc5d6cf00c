use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{ModelCatalog, ResultsSnapshot, RunCommand};

const CATALOG_FILE: &str = "all-models.json";
const RESULTS_FILE: &str = "all-results.json";
const COMMANDS_FILE: &str = "run-commands.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Decode {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: String,
        source: serde_json::Error,
    },
}

/// The three JSON snapshots the dashboard works from, kept as plain files
/// in one data directory. Concurrent writers of the command snapshot are
/// not coordinated; last write wins.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub fn load_catalog(&self) -> Result<ModelCatalog, StoreError> {
        self.load_json(CATALOG_FILE)
    }

    pub fn load_results(&self) -> Result<ResultsSnapshot, StoreError> {
        self.load_json(RESULTS_FILE)
    }

    /// A command snapshot that has never been written reads as the empty
    /// configuration.
    pub fn load_commands(&self) -> Result<Vec<RunCommand>, StoreError> {
        let path = self.dir.join(COMMANDS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        self.load_json(COMMANDS_FILE)
    }

    pub fn save_commands(&self, commands: &[RunCommand]) -> Result<(), StoreError> {
        let path = self.dir.join(COMMANDS_FILE);
        let json = serde_json::to_string_pretty(commands).map_err(|source| StoreError::Encode {
            path: display_path(&path),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StoreError::Write {
            path: display_path(&path),
            source,
        })
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<T, StoreError> {
        let path = self.dir.join(file);
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: display_path(&path),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
            path: display_path(&path),
            source,
        })
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store_in_tempdir() -> (tempfile::TempDir, SnapshotStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn missing_command_snapshot_reads_as_empty() {
        let (_dir, store) = store_in_tempdir();
        assert_eq!(store.load_commands().expect("must load"), vec![]);
    }

    #[test]
    fn command_snapshot_round_trips() {
        let (_dir, store) = store_in_tempdir();
        let commands = vec![
            RunCommand::StartDay {
                start_day: "2021-06-01".to_string(),
            },
            RunCommand::ExeModels {
                exe_models: vec!["Exxon_4".to_string()],
            },
        ];
        store.save_commands(&commands).expect("must save");
        assert_eq!(store.load_commands().expect("must load"), commands);
    }

    #[test]
    fn corrupt_snapshot_is_a_decode_error() {
        let (dir, store) = store_in_tempdir();
        fs::write(dir.path().join("all-results.json"), "not json").expect("write");
        let err = store.load_results().expect_err("must fail");
        assert!(matches!(err, StoreError::Decode { .. }));
    }

    #[test]
    fn results_snapshot_parses_date_maps() {
        let (dir, store) = store_in_tempdir();
        fs::write(
            dir.path().join("all-results.json"),
            r#"{"oil_Brent: macbook:timeseries": {"2020-01-02": 64.9, "2020-01-01": 66.0}}"#,
        )
        .expect("write");

        let snapshot = store.load_results().expect("must load");
        let values = &snapshot["oil_Brent: macbook:timeseries"];
        let dates: Vec<&str> = values.keys().map(String::as_str).collect();
        assert_eq!(dates, vec!["2020-01-01", "2020-01-02"]);
    }
}
