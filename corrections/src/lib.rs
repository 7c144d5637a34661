//! Corrections - bulk submission of package corrections to Nextlinux Enterprise
//!
//! This crate reads a correction set from a JSON file, authenticates once per
//! batch and submits every correction in order, classifying each response so
//! that a known benign response-shape quirk does not abort the run.

// Core modules
pub mod config;
pub mod error;
pub mod types;

// Main functionality modules
pub mod analysis;
pub mod http;
pub mod session;
pub mod submitter;
pub mod testing;
pub mod traits;

// Re-export main types for convenience
pub use analysis::{ErrorClassifierImpl, OutcomeClassifier};
pub use config::ApplicationConfig;
pub use error::{CorrectionsError, Result};
pub use http::HttpTransport;
pub use session::{BasicAuth, RequestContext, Session, SessionConfig};
pub use submitter::{
    load_corrections, BatchReport, BatchState, BatchSubmitter, FailureMode, ItemReport,
    DEFAULT_CORRECTIONS_FILE,
};
pub use traits::{CorrectionTransport, ProgressCallback};
pub use types::{
    ApiError, ApiFailure, ApiResponse, ApiResult, Correction, CorrectionMatch, FieldMatch, Outcome,
    ReplacementField,
};

/// Submit every correction in `path` through a reqwest-backed session
pub async fn add_corrections<P: AsRef<std::path::Path>>(
    config: SessionConfig,
    path: P,
    mode: FailureMode,
) -> Result<BatchReport> {
    let session = Session::new(config)?;
    let mut submitter = BatchSubmitter::new(&session).with_failure_mode(mode);
    submitter.run_file(path, None).await
}
