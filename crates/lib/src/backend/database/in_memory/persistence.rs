//! Persistence operations for the InMemory store
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory key-value map to/from JSON files.

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::InMemory;
use crate::{Error, Result, backend::errors::BackendError};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk layout of the store file.
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    entries: HashMap<String, String>,
}

pub(crate) async fn save_to_file(store: &InMemory, path: &Path) -> Result<()> {
    let entries = store.entries.read().await.clone();
    write_entries(&entries, path).await
}

/// Write `entries` to `path` through a temp file and rename.
pub(crate) async fn write_entries(entries: &HashMap<String, String>, path: &Path) -> Result<()> {
    #[derive(Serialize)]
    struct SnapshotRef<'a> {
        #[serde(rename = "_v", skip_serializing_if = "is_v0")]
        version: u8,
        entries: &'a HashMap<String, String>,
    }

    let serializable = SnapshotRef {
        version: PERSISTENCE_VERSION,
        entries,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| -> Error {
            BackendError::FileIo {
                path: tmp.clone(),
                source: e,
            }
            .into()
        })?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| -> Error {
        BackendError::FileIo {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}

pub(crate) async fn load_from_file(path: &Path) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let serializable: SerializableStore =
                serde_json::from_str(&json).map_err(|e| -> Error {
                    BackendError::DeserializationFailed {
                        path: path.to_path_buf(),
                        source: e,
                    }
                    .into()
                })?;
            Ok(InMemory {
                entries: RwLock::new(serializable.entries),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo {
            path: path.to_path_buf(),
            source: e,
        }
        .into()),
    }
}
