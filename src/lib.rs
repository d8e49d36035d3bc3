//! Continuous Learning Pipeline
//!
//! Tracks trained classification models, detects drift in incoming feature
//! data, decides when to retrain, and monitors live prediction quality.
//!
//! ## Architecture
//!
//! - `store`: model artifacts plus a persisted version ledger
//! - `drift`: per-feature summary statistics and mean/std drift scoring
//! - `eval`: accuracy/precision/recall/F1, k-fold and train/test splitting
//! - `retrain`: retrain policy, candidate lifecycle, promotion gate
//! - `monitor`: prediction log, performance history, alerts
//! - `pipeline`: the orchestrator composing all of the above
//! - `scheduler`: periodic evaluate-and-maybe-retrain jobs
//!
//! ## Example
//!
//! ```no_run
//! use continual::config::PipelineConfig;
//! use continual::data::synthetic::SyntheticClassification;
//! use continual::pipeline::PipelineOrchestrator;
//!
//! # fn main() -> continual::Result<()> {
//! let config = PipelineConfig::default();
//! let pipeline = PipelineOrchestrator::open(config)?;
//!
//! let train = SyntheticClassification::new(4).samples(1000).seed(42).generate();
//! let fresh = SyntheticClassification::new(4).samples(200).seed(43).shift(0.5).generate();
//!
//! let summary = pipeline.run(&train, Some(&fresh))?;
//! println!("serving {:?}", summary.current_version);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod clock;
pub mod config;
pub mod data;
pub mod drift;
pub mod error;
pub mod eval;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod pipeline;
pub mod retrain;
pub mod scheduler;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PipelineConfig;
pub use data::{FeatureBatch, LabeledBatch};
pub use drift::{BaselineStatistics, DriftDetector, DriftReport};
pub use error::{Error, Result};
pub use eval::{ClassificationMetrics, ModelEvaluator};
pub use models::{Classifier, ModelFamily, TrainedModel};
pub use monitor::{ModelMonitor, MonitoringSummary, PredictionLogEntry};
pub use pipeline::{LifecycleSummary, PipelineOrchestrator, PipelineStatus};
pub use retrain::{RetrainDecisionEngine, RetrainResult, RetrainStatus};
pub use store::{ModelArtifactStore, ModelVersion, VersionLedger, VersionStatus};
