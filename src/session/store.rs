use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable map keyed by store name. Each key is one pretty-printed JSON file
/// under the state directory. The layout is versionless.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path).map_err(|source| StorageError::Read {
            path: path.clone(),
            source,
        })?;
        let value = serde_json::from_slice(&data)
            .map_err(|source| StorageError::Parse { path, source })?;
        Ok(Some(value))
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let final_path = self.path_for(key);
        let tmp_path = self.dir.join(format!("{}.json.tmp", sanitize_key(key)));
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;

        fs::write(&tmp_path, bytes).map_err(|source| StorageError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        let write_err = |source| StorageError::Write {
            path: final_path.clone(),
            source,
        };
        match fs::rename(&tmp_path, &final_path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if final_path.exists() {
                    fs::remove_file(&final_path).map_err(write_err)?;
                    fs::rename(&tmp_path, &final_path).map_err(write_err)?;
                    Ok(())
                } else {
                    Err(write_err(rename_err))
                }
            }
        }
    }
}

fn sanitize_key(raw: &str) -> String {
    let out: String = raw
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        "store".to_string()
    } else {
        out
    }
}
