//! The model artifact store: artifacts plus the version ledger.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{info, warn};

use super::backend::{ArtifactBackend, FsBackend, InMemoryBackend};
use super::ledger::VersionLedger;
use super::version::{Metadata, Metrics, ModelVersion, StageTransition, VersionStatus};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::models::TrainedModel;

/// Result of a conditional promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOutcome {
    Promoted,
    /// The gate returned `false`; nothing changed
    Rejected,
    /// No version with that id
    UnknownVersion,
}

/// Persists serialized models and the ledger that tracks them.
///
/// Readers take the ledger's read lock. Every mutation is serialized by a
/// writer mutex, applied to a clone of the ledger, persisted, and only then
/// swapped in, so a failed write leaves the in-memory ledger untouched.
pub struct ModelArtifactStore {
    backend: Box<dyn ArtifactBackend>,
    ledger: RwLock<VersionLedger>,
    writer: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ModelArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifactStore")
            .field("location", &self.backend.location())
            .field("versions", &self.read().versions.len())
            .finish()
    }
}

impl ModelArtifactStore {
    /// Open the store in `dir`, loading `versions.json` if present.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_backend(FsBackend::open(dir)?, Arc::new(SystemClock))
    }

    /// Store with no persistence beyond the process.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            backend: Box::new(InMemoryBackend::new()),
            ledger: RwLock::new(VersionLedger::default()),
            writer: Mutex::new(()),
            clock,
        }
    }

    /// Store over an arbitrary backend. A persisted ledger that violates the
    /// single-production invariant is refused.
    pub fn with_backend(
        backend: impl ArtifactBackend + 'static,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let ledger = backend.read_ledger()?.unwrap_or_default();
        ledger
            .check()
            .map_err(|e| Error::storage(format!("corrupt ledger at {}: {e}", backend.location())))?;
        info!(
            location = %backend.location(),
            versions = ledger.versions.len(),
            current = ?ledger.current,
            "Opened model store"
        );
        Ok(Self {
            backend: Box::new(backend),
            ledger: RwLock::new(ledger),
            writer: Mutex::new(()),
            clock,
        })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, VersionLedger> {
        self.ledger.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist `next` and make it the live ledger. Caller holds `writer`.
    fn commit(&self, next: VersionLedger) -> Result<()> {
        self.backend.write_ledger(&next)?;
        *self.ledger.write().unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    fn new_version_id(&self) -> String {
        format!("v_{}_{:08x}", self.clock.now().format("%Y%m%d_%H%M%S"), rand::random::<u32>())
    }

    /// Persist a trained model as a new `staged` version.
    pub fn save(
        &self,
        model: &TrainedModel,
        metrics: Metrics,
        metadata: Metadata,
    ) -> Result<String> {
        let bytes = model.to_bytes()?;
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = self.read().clone();
        let mut version_id = self.new_version_id();
        while next.get(&version_id).is_some() {
            version_id = self.new_version_id();
        }
        let artifact = format!("model_{version_id}.bin");
        self.backend.write_artifact(&artifact, &bytes)?;

        next.versions.push(ModelVersion {
            version_id: version_id.clone(),
            created_at: self.clock.now(),
            metrics,
            metadata,
            status: VersionStatus::Staged,
            promoted_at: None,
            artifact,
        });
        self.commit(next)?;
        info!(version_id = %version_id, bytes = bytes.len(), "Saved model version");
        Ok(version_id)
    }

    /// Load a model by id, or the production model when `version_id` is `None`.
    pub fn load(&self, version_id: Option<&str>) -> Result<(TrainedModel, ModelVersion)> {
        let version = match version_id {
            Some(id) => self.get(id).ok_or_else(|| Error::NotFound(format!("version {id}")))?,
            None => self
                .current_version()
                .ok_or_else(|| Error::NotFound("no production version".into()))?,
        };
        let bytes = self.backend.read_artifact(&version.artifact)?;
        Ok((TrainedModel::from_bytes(&bytes)?, version))
    }

    /// Promote unconditionally. `false` for an unknown id.
    pub fn promote(&self, version_id: &str) -> Result<bool> {
        let outcome = self.promote_if(version_id, |_| true)?;
        Ok(outcome == PromotionOutcome::Promoted)
    }

    /// Promote if `gate` accepts the production version at the moment of
    /// promotion. The gate runs inside the writer critical section.
    pub fn promote_if<F>(&self, version_id: &str, gate: F) -> Result<PromotionOutcome>
    where
        F: FnOnce(Option<&ModelVersion>) -> bool,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        self.promote_locked(version_id, "promoted", gate)
    }

    /// Re-promote the version `steps` promotions before the latest one.
    /// `false` with no change when fewer than `steps + 1` versions were
    /// ever promoted.
    pub fn rollback(&self, steps: usize) -> Result<bool> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let target = self.read()
            .rollback_target(steps)
            .map(|v| v.version_id.clone());
        let Some(target) = target else {
            warn!(steps, "Not enough promotion history to roll back");
            return Ok(false);
        };
        let reason = format!("rollback {steps} step(s)");
        let outcome = self.promote_locked(&target, &reason, |_| true)?;
        Ok(outcome == PromotionOutcome::Promoted)
    }

    /// Caller holds `writer`.
    fn promote_locked<F>(&self, version_id: &str, reason: &str, gate: F) -> Result<PromotionOutcome>
    where
        F: FnOnce(Option<&ModelVersion>) -> bool,
    {
        let mut next = self.read().clone();
        if next.get(version_id).is_none() {
            warn!(version_id = %version_id, "Cannot promote unknown version");
            return Ok(PromotionOutcome::UnknownVersion);
        }
        if !gate(next.production()) {
            return Ok(PromotionOutcome::Rejected);
        }
        if !next.promote(version_id, self.clock.now(), reason) {
            warn!(version_id = %version_id, "Version cannot move to production");
            return Ok(PromotionOutcome::Rejected);
        }
        self.commit(next)?;
        info!(version_id = %version_id, reason, "Promoted model version");
        Ok(PromotionOutcome::Promoted)
    }

    /// Snapshot of every version, in creation order.
    pub fn versions(&self) -> Vec<ModelVersion> {
        self.read().versions.clone()
    }

    /// The full ledger as pretty JSON.
    pub fn versions_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.read())?)
    }

    pub fn current_id(&self) -> Option<String> {
        self.read().current.clone()
    }

    pub fn current_version(&self) -> Option<ModelVersion> {
        self.read().production().cloned()
    }

    pub fn get(&self, version_id: &str) -> Option<ModelVersion> {
        self.read().get(version_id).cloned()
    }

    /// Audit trail of status changes.
    pub fn transitions(&self) -> Vec<StageTransition> {
        self.read().transitions.clone()
    }

    /// Snapshot of the whole ledger.
    pub fn ledger(&self) -> VersionLedger {
        self.read().clone()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
