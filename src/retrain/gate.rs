//! Candidate-versus-incumbent promotion gate.

use crate::store::ModelVersion;

/// Promote only when the candidate beats the incumbent's accuracy by more
/// than `min_improvement`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PromotionGate {
    pub min_improvement: f64,
}

impl Default for PromotionGate {
    fn default() -> Self {
        Self {
            min_improvement: 0.0,
        }
    }
}

/// The incumbent's accuracy as measured by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredIncumbent {
    pub version_id: String,
    pub accuracy: f64,
}

impl PromotionGate {
    pub fn new(min_improvement: f64) -> Self {
        Self { min_improvement }
    }

    /// With no bar to beat, any candidate passes.
    pub fn passes(&self, candidate_accuracy: f64, incumbent_accuracy: Option<f64>) -> bool {
        match incumbent_accuracy {
            None => true,
            Some(bar) => candidate_accuracy > bar + self.min_improvement,
        }
    }

    /// Bar for the production version at promotion time: the caller's
    /// measurement if production is still the measured version, otherwise
    /// whatever accuracy the new production version recorded.
    pub fn bar(
        production: Option<&ModelVersion>,
        measured: Option<&MeasuredIncumbent>,
    ) -> Option<f64> {
        let production = production?;
        match measured {
            Some(m) if m.version_id == production.version_id => Some(m.accuracy),
            _ => production.metric("accuracy"),
        }
    }
}
