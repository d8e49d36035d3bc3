//! Retraining: trigger policy, candidate lifecycle, and the promotion gate.
//!
//! A retrain is triggered by a relative accuracy drop, data drift, or model
//! age. Candidates are trained on a stratified split, scored on the held-out
//! part, cross-validated, and saved as staged. Only a candidate that beats
//! the production model's accuracy is promoted.

mod engine;
mod gate;
mod lifecycle;
mod policy;
mod result;


pub use engine::RetrainDecisionEngine;
pub use gate::{MeasuredIncumbent, PromotionGate};
pub use lifecycle::{RetrainLifecycle, RetrainState};
pub use policy::{RetrainDecision, RetrainPolicy, RetrainTrigger};
pub use result::{RetrainResult, RetrainStatus};
