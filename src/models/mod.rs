//! Classifier contract and the model families it is trained with.
//!
//! The pipeline only relies on [`Classifier`]. The families are adapters over
//! aprender's estimators. [`ModelFamily`] is the closed set of
//! constructible families, and unknown names fall back to
//! [`ModelFamily::DefaultEnsemble`].

mod boosting;
mod classifier;
mod family;
mod forest;
mod logistic;
mod scaler;
mod trained;


pub use boosting::GradientBoostedTrees;
pub use classifier::Classifier;
pub(crate) use classifier::argmax;
pub use family::ModelFamily;
pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use trained::TrainedModel;
