//! Identity store port and implementations.
//!
//! `replace` is delete-then-insert as one step: a reader sees either the
//! old record or the new one, never an empty or partial store in between.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::error::PersistenceError;

use super::models::Identity;

const IDENTITY_FILE: &str = "identity.json";

#[cfg_attr(test, mockall::automock)]
pub trait IdentityStore: Send + Sync {
    /// The stored identity, if any.
    fn get(&self) -> Result<Option<Identity>, PersistenceError>;

    /// Atomically drop any existing record and store `identity`.
    fn replace(&self, identity: Identity) -> Result<(), PersistenceError>;
}

/// Store that lives for the process.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    record: RwLock<Option<Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self {
            record: RwLock::new(Some(identity)),
        }
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn get(&self) -> Result<Option<Identity>, PersistenceError> {
        Ok(self.record.read().clone())
    }

    fn replace(&self, identity: Identity) -> Result<(), PersistenceError> {
        let mut record = self.record.write();
        record.take();
        *record = Some(identity);
        Ok(())
    }
}

/// Store backed by a JSON file in a data directory.
///
/// Writes go to a temporary file that is renamed over the record, so a
/// crash mid-write leaves the previous record intact.
#[derive(Debug)]
pub struct FileIdentityStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileIdentityStore {
    pub fn new(data_dir: &Path) -> Result<Self, PersistenceError> {
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            path: data_dir.join(IDENTITY_FILE),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self) -> Result<Option<Identity>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn replace(&self, identity: Identity) -> Result<(), PersistenceError> {
        let _guard = self.write_lock.lock();

        let body = serde_json::to_vec_pretty(&identity)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        log::debug!("IDENTITY_FILE_WRITTEN path={}", self.path.display());
        Ok(())
    }
}
