//! Feature batches and labeled datasets.
//!
//! A [`FeatureBatch`] is a rectangular table of named `f64` columns where
//! `NaN` marks a missing value. A [`LabeledBatch`] pairs one with class labels.

mod batch;
mod dataset;
pub mod synthetic;


pub use batch::FeatureBatch;
pub use dataset::{DatasetFile, LabeledBatch};
