//! Storage backends for model artifacts and the ledger.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use super::ledger::VersionLedger;
use crate::error::{Error, Result};

/// Ledger file name inside a model directory.
pub const LEDGER_FILE: &str = "versions.json";

/// Where artifacts and the ledger live
pub trait ArtifactBackend: Send + Sync {
    /// Write an artifact, replacing any previous content
    fn write_artifact(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Read an artifact
    fn read_artifact(&self, name: &str) -> Result<Vec<u8>>;

    /// Load the persisted ledger, `None` if none has been written yet
    fn read_ledger(&self) -> Result<Option<VersionLedger>>;

    /// Persist the ledger
    fn write_ledger(&self, ledger: &VersionLedger) -> Result<()>;

    /// Human-readable location, for logs
    fn location(&self) -> String;
}

impl<T: ArtifactBackend + ?Sized> ArtifactBackend for std::sync::Arc<T> {
    fn write_artifact(&self, name: &str, bytes: &[u8]) -> Result<()> {
        (**self).write_artifact(name, bytes)
    }

    fn read_artifact(&self, name: &str) -> Result<Vec<u8>> {
        (**self).read_artifact(name)
    }

    fn read_ledger(&self) -> Result<Option<VersionLedger>> {
        (**self).read_ledger()
    }

    fn write_ledger(&self, ledger: &VersionLedger) -> Result<()> {
        (**self).write_ledger(ledger)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

/// Directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsBackend {
    dir: PathBuf,
}

impl FsBackend {
    /// Open (creating if needed) a model directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::io(format!("creating model directory {}", dir.display()), e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write to a sibling temp file, then rename over the target.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let target = self.dir.join(name);
        let tmp = self.dir.join(format!(".{name}.tmp"));
        std::fs::write(&tmp, bytes)
            .and_then(|()| std::fs::rename(&tmp, &target))
            .map_err(|e| Error::storage(format!("writing {}: {e}", target.display())))
    }
}

impl ArtifactBackend for FsBackend {
    fn write_artifact(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.write_atomic(name, bytes)
    }

    fn read_artifact(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.dir.join(name);
        std::fs::read(&path).map_err(|e| Error::storage(format!("reading {}: {e}", path.display())))
    }

    fn read_ledger(&self) -> Result<Option<VersionLedger>> {
        let path = self.dir.join(LEDGER_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::storage(format!("reading {}: {e}", path.display())))?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_ledger(&self, ledger: &VersionLedger) -> Result<()> {
        let json = serde_json::to_string_pretty(ledger)?;
        self.write_atomic(LEDGER_FILE, json.as_bytes())
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

/// In-process backend for tests and ephemeral pipelines.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
    ledger: Mutex<Option<String>>,
    fail_writes: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::storage("in-memory backend is refusing writes"));
        }
        Ok(())
    }
}

impl ArtifactBackend for InMemoryBackend {
    fn write_artifact(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read_artifact(&self, name: &str) -> Result<Vec<u8>> {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::storage(format!("artifact {name} does not exist")))
    }

    fn read_ledger(&self) -> Result<Option<VersionLedger>> {
        let ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(Error::from)
    }

    fn write_ledger(&self, ledger: &VersionLedger) -> Result<()> {
        self.check_writable()?;
        let json = serde_json::to_string(ledger)?;
        *self.ledger.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
