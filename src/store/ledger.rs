//! The version ledger: every version plus a pointer to the production one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::version::{ModelVersion, StageTransition, VersionStatus};

/// Persisted as `versions.json`.
///
/// At most one version is `production`, and `current` names it whenever it
/// is set. Ledgers written before `transitions` existed load with an empty
/// trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionLedger {
    pub versions: Vec<ModelVersion>,
    pub current: Option<String>,
    #[serde(default)]
    pub transitions: Vec<StageTransition>,
}

impl VersionLedger {
    pub fn get(&self, version_id: &str) -> Option<&ModelVersion> {
        self.versions.iter().find(|v| v.version_id == version_id)
    }

    fn get_mut(&mut self, version_id: &str) -> Option<&mut ModelVersion> {
        self.versions
            .iter_mut()
            .find(|v| v.version_id == version_id)
    }

    /// The production version, if any.
    pub fn production(&self) -> Option<&ModelVersion> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    /// Check the single-production invariant.
    pub fn check(&self) -> Result<(), String> {
        let production: Vec<&str> = self
            .versions
            .iter()
            .filter(|v| v.is_production())
            .map(|v| v.version_id.as_str())
            .collect();
        match (production.as_slice(), self.current.as_deref()) {
            ([], None) => Ok(()),
            ([id], Some(current)) if *id == current => Ok(()),
            ([], Some(current)) => {
                Err(format!("current points at {current}, which is not in production"))
            }
            ([id], current) => {
                Err(format!("{id} is in production but current is {current:?}"))
            }
            (ids, _) => Err(format!("{} versions in production: {}", ids.len(), ids.join(", "))),
        }
    }

    /// Make `version_id` the production version, archiving the incumbent.
    ///
    /// Returns `false` (and changes nothing) for an unknown id or a status
    /// that cannot move to production.
    pub fn promote(&mut self, version_id: &str, now: DateTime<Utc>, reason: &str) -> bool {
        let Some(target) = self.get(version_id) else {
            return false;
        };
        let from = target.status;
        if !from.can_transition_to(VersionStatus::Production) {
            return false;
        }

        if let Some(previous) = self.current.clone().filter(|id| id != version_id) {
            if let Some(v) = self.get_mut(&previous) {
                v.status = VersionStatus::Archived;
            }
            self.transitions.push(StageTransition {
                version_id: previous,
                from: VersionStatus::Production,
                to: VersionStatus::Archived,
                timestamp: now,
                reason: format!("replaced by {version_id}"),
            });
        }

        if let Some(v) = self.get_mut(version_id) {
            v.status = VersionStatus::Production;
            v.promoted_at = Some(now);
        }
        self.current = Some(version_id.to_string());
        self.transitions.push(StageTransition {
            version_id: version_id.to_string(),
            from,
            to: VersionStatus::Production,
            timestamp: now,
            reason: reason.to_string(),
        });
        true
    }

    /// Version `steps` promotions back, counting the latest as 0.
    ///
    /// Promotions with the same timestamp are ordered by ledger position,
    /// later entries first.
    pub fn rollback_target(&self, steps: usize) -> Option<&ModelVersion> {
        let mut promoted: Vec<(usize, &ModelVersion)> = self
            .versions
            .iter()
            .enumerate()
            .filter(|(_, v)| v.promoted_at.is_some())
            .collect();
        if promoted.len() <= steps {
            return None;
        }
        promoted.sort_by(|(ia, a), (ib, b)| (b.promoted_at, ib).cmp(&(a.promoted_at, ia)));
        promoted.get(steps).map(|(_, v)| *v)
    }
}
