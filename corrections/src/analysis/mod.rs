//! Submission outcome classification - pure business logic only

pub mod error_classifier;

pub use error_classifier::{ErrorClassifierImpl, OutcomeClassifier};
