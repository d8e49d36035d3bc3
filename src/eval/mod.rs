//! Model evaluation: metrics, cross-validation, and data splitting.

mod confusion;
mod kfold;
mod metrics;
mod model_evaluator;
mod split;


pub use confusion::ConfusionMatrix;
pub use kfold::KFold;
pub use metrics::ClassificationMetrics;
pub use model_evaluator::{CrossValidation, ModelEvaluator};
pub use split::{train_test_split, TrainTestSplit};
