//! Model versioning: artifacts, the version ledger, promotion and rollback.

mod artifacts;
mod backend;
mod ledger;
mod version;

#[cfg(test)]
mod tests;

pub use artifacts::{ModelArtifactStore, PromotionOutcome};
pub use backend::{ArtifactBackend, FsBackend, InMemoryBackend, LEDGER_FILE};
pub use ledger::VersionLedger;
pub use version::{Metadata, Metrics, ModelVersion, StageTransition, VersionStatus};
