use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{debug, info};

use crate::error::{PhaseLensError, Result};
use crate::providers::JobId;

/// Key-value storage for decompressed job logs, keyed by revision and job id.
pub trait LogStore: Send + Sync {
    /// Makes the store ready to hold logs for `revision`.
    fn prepare(&self, revision: &str) -> Result<()>;

    /// Returns the stored log, or `None` when nothing was stored yet.
    fn load(&self, revision: &str, job_id: JobId) -> Result<Option<Vec<u8>>>;

    fn save(&self, revision: &str, job_id: JobId, contents: &[u8]) -> Result<()>;
}

/// Log store backed by a directory tree: `{root}/{revision}/{job_id}.log`.
///
/// Entries are never removed. A file truncated by an interrupted run is read
/// back as-is on the next run.
pub struct FsLogStore {
    root: PathBuf,
}

impl FsLogStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn revision_dir(&self, revision: &str) -> Result<PathBuf> {
        if revision.is_empty() || revision.contains(['/', '\\']) || revision == ".." {
            return Err(PhaseLensError::Cache(format!(
                "Revision cannot be used as a directory name: {revision:?}"
            )));
        }
        Ok(self.root.join(revision))
    }

    pub fn log_path(&self, revision: &str, job_id: JobId) -> Result<PathBuf> {
        Ok(self.revision_dir(revision)?.join(format!("{job_id}.log")))
    }
}

impl LogStore for FsLogStore {
    fn prepare(&self, revision: &str) -> Result<()> {
        let dir = self.revision_dir(revision)?;
        fs::create_dir_all(&dir)?;
        info!("Log cache at: {}", dir.display());
        Ok(())
    }

    fn load(&self, revision: &str, job_id: JobId) -> Result<Option<Vec<u8>>> {
        let path = self.log_path(revision, job_id)?;
        match fs::read(&path) {
            Ok(contents) => {
                info!("Loading {}", path.display());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, revision: &str, job_id: JobId, contents: &[u8]) -> Result<()> {
        let path = self.log_path(revision, job_id)?;
        fs::write(&path, contents)?;
        debug!("Saved {} bytes to cache: {}", contents.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory store used to exercise callers without touching the disk.
    #[derive(Default)]
    pub struct MemoryLogStore {
        entries: Mutex<HashMap<(String, JobId), Vec<u8>>>,
        prepared: Mutex<Vec<String>>,
    }

    impl MemoryLogStore {
        pub fn with_entry(self, revision: &str, job_id: JobId, contents: &str) -> Self {
            self.entries
                .lock()
                .unwrap()
                .insert((revision.to_string(), job_id), contents.as_bytes().to_vec());
            self
        }

        pub fn get(&self, revision: &str, job_id: JobId) -> Option<Vec<u8>> {
            self.entries
                .lock()
                .unwrap()
                .get(&(revision.to_string(), job_id))
                .cloned()
        }

        pub fn prepared(&self) -> Vec<String> {
            self.prepared.lock().unwrap().clone()
        }
    }

    impl LogStore for MemoryLogStore {
        fn prepare(&self, revision: &str) -> Result<()> {
            self.prepared.lock().unwrap().push(revision.to_string());
            Ok(())
        }

        fn load(&self, revision: &str, job_id: JobId) -> Result<Option<Vec<u8>>> {
            Ok(self.get(revision, job_id))
        }

        fn save(&self, revision: &str, job_id: JobId, contents: &[u8]) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .insert((revision.to_string(), job_id), contents.to_vec());
            Ok(())
        }
    }
}
