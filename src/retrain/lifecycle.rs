//! Candidate lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Where the current (or last) retrain cycle stands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrainState {
    NotTriggered,
    Retraining,
    /// Candidate trained, scored, and saved as staged
    Evaluated,
    Promoted,
    Rejected,
    Failed,
}

impl RetrainState {
    /// Check if transition to target state is valid
    pub fn can_transition_to(&self, target: RetrainState) -> bool {
        use RetrainState::*;
        match (self, target) {
            (NotTriggered | Promoted | Rejected | Failed, Retraining) => true,
            (Retraining, Evaluated | Failed) => true,
            (Evaluated, Promoted | Rejected) => true,
            // An ungated candidate is abandoned by the next cycle
            (Evaluated, Retraining) => true,
            _ => false,
        }
    }

    /// A cycle in this state has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Promoted | Self::Rejected | Self::Failed)
    }
}

/// State plus a timestamped log of how it got there.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrainLifecycle {
    state: RetrainState,
    log: Vec<(RetrainState, DateTime<Utc>)>,
}

impl Default for RetrainLifecycle {
    fn default() -> Self {
        Self {
            state: RetrainState::NotTriggered,
            log: Vec::new(),
        }
    }
}

impl RetrainLifecycle {
    pub fn state(&self) -> RetrainState {
        self.state
    }

    pub fn log(&self) -> &[(RetrainState, DateTime<Utc>)] {
        &self.log
    }

    /// Move to `to`, rejecting transitions the state machine does not allow.
    pub fn advance(&mut self, to: RetrainState, at: DateTime<Utc>) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(Error::Validation(format!(
                "invalid retrain transition {:?} -> {:?}",
                self.state, to
            )));
        }
        self.state = to;
        self.log.push((to, at));
        Ok(())
    }
}
