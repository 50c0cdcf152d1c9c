//! File-backed storage: one JSON document per key.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::QueueStorage;
use crate::{AppError, Result};

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so readers never observe a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Construct a store rooted at `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| {
            AppError::Storage(format!(
                "failed to create storage directory {}: {err}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    /// Root directory of this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document holding `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl QueueStorage for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(AppError::Storage(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.dir)
            .map_err(|err| AppError::Storage(format!("failed to create temp file: {err}")))?;
        tmp.write_all(value.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| AppError::Storage(format!("failed to write snapshot: {err}")))?;
        tmp.persist(&path).map_err(|err| {
            AppError::Storage(format!("failed to replace {}: {}", path.display(), err.error))
        })?;
        Ok(())
    }
}
