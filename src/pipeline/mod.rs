//! End-to-end continuous learning lifecycle.
//!
//! 1. `initialize`: train, promote, and take the drift baseline.
//! 2. `process_batch`: drift check, production accuracy, retrain decision.
//! 3. On a trigger: retrain on all data seen so far, promote only if better.
//! 4. Every batch is scored into the monitor.
//! 5. `summary` and `get_status` report where things stand.

mod orchestrator;
mod outcome;


pub use orchestrator::PipelineOrchestrator;
pub use outcome::{BatchOutcome, LifecycleSummary, PipelinePhase, PipelineStatus, Prediction};
