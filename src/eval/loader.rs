//! Loads evaluation result documents from a results directory

use super::EvaluationRecord;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while loading result documents
#[derive(Debug, Error)]
pub enum LoadError {
    /// The results directory does not exist or is not a directory
    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document is valid JSON but not an object
    #[error("{0:?} does not contain a JSON object")]
    NotAnObject(PathBuf),
}

/// Result of scanning a results directory
#[derive(Debug, Default)]
pub struct LoadedResults {
    /// Parsed records in file name order
    pub records: Vec<EvaluationRecord>,
    /// Files that were skipped, with the reason
    pub skipped: Vec<LoadError>,
}

/// Parse a single result document
pub fn load_record(path: &Path) -> Result<EvaluationRecord, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if !value.is_object() {
        return Err(LoadError::NotAnObject(path.to_path_buf()));
    }

    serde_json::from_value(value).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load every `*.json` document of `dir`, sorted by file name.
///
/// Unreadable or malformed files are skipped with a warning; only a missing
/// or unreadable directory fails the whole load.
pub fn load_records(dir: &Path) -> Result<LoadedResults, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if path.is_file() && path.extension().map_or(false, |e| e == "json") {
                    paths.push(path);
                }
            }
            Err(e) => warn!("Skipping unreadable entry in {:?}: {}", dir, e),
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut loaded = LoadedResults::default();
    for path in paths {
        match load_record(&path) {
            Ok(record) => {
                debug!(
                    "Loaded {:?} as ({}, {}, {})",
                    path,
                    record.combo(),
                    record.mode(),
                    record.task()
                );
                loaded.records.push(record);
            }
            Err(e) => {
                warn!("Skipping {}", e);
                loaded.skipped.push(e);
            }
        }
    }

    Ok(loaded)
}
