//! Production monitoring: prediction log, performance history, alerts.

mod alert;
mod entry;
mod model_monitor;


pub use alert::{Alert, AlertCallback, AlertKind};
pub use entry::{fingerprint, PerformanceRecord, PredictionLogEntry};
pub use model_monitor::{ModelMonitor, MonitoringSummary};
