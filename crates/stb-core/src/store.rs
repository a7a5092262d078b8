use std::{
    fs,
    path::{Path, PathBuf},
};

use tokio::sync::Mutex;

use crate::{config::GlobalConfig, errors::Error, Result};

/// Durable storage contract for the configuration document.
///
/// `load` creates and persists defaults when nothing is stored yet; `save`
/// replaces the full document. Partial updates are deliberately not part of
/// the contract — every mutation is a whole-document read-modify-write.
pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<GlobalConfig>;
    fn save(&self, cfg: &GlobalConfig) -> Result<()>;
}

/// File-backed JSON store.
///
/// Saves go through a temp file in the same directory followed by a rename,
/// so a crash mid-write never leaves a truncated document behind.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, json: &str) -> std::io::Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<GlobalConfig> {
        if !self.path.exists() {
            let default = GlobalConfig::default();
            self.save(&default)?;
            return Ok(default);
        }
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| Error::Persistence(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Persistence(format!("parse {}: {e}", self.path.display())))
    }

    fn save(&self, cfg: &GlobalConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(cfg)
            .map_err(|e| Error::Persistence(format!("serialize config: {e}")))?;
        self.write_atomic(&json)
            .map_err(|e| Error::Persistence(format!("write {}: {e}", self.path.display())))
    }
}

/// In-memory store for tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    doc: std::sync::Mutex<Option<GlobalConfig>>,
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<GlobalConfig> {
        let mut guard = self.doc.lock().unwrap();
        Ok(guard.get_or_insert_with(GlobalConfig::default).clone())
    }

    fn save(&self, cfg: &GlobalConfig) -> Result<()> {
        *self.doc.lock().unwrap() = Some(cfg.clone());
        Ok(())
    }
}

/// Serialized access to the shared document.
///
/// Every mutation follows load → mutate → save while holding the handle's
/// mutex, which closes the lost-update window two interleaved ticket
/// operations would otherwise have on the shared file.
pub struct ConfigHandle {
    store: Box<dyn ConfigStore>,
    lock: Mutex<()>,
}

impl ConfigHandle {
    pub fn new(store: Box<dyn ConfigStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Snapshot the current document.
    pub async fn read(&self) -> Result<GlobalConfig> {
        let _guard = self.lock.lock().await;
        self.store.load()
    }

    /// Run one locked read-modify-write cycle. The closure's return value is
    /// handed back to the caller; the mutated document is persisted before
    /// the lock is released.
    pub async fn update<T>(&self, f: impl FnOnce(&mut GlobalConfig) -> Result<T>) -> Result<T> {
        let _guard = self.lock.lock().await;
        let mut cfg = self.store.load()?;
        let out = f(&mut cfg)?;
        self.store.save(&cfg)?;
        Ok(out)
    }
}
