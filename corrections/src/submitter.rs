//! Batch submission of a correction set.
//!
//! The submitter walks `Idle → Loading → Authenticating → Submitting(i)` and
//! ends in `Done` or `Aborted`. One request context is derived per batch and
//! shared by every call. Corrections are sent strictly one at a time in file
//! order.

use crate::analysis::{ErrorClassifierImpl, OutcomeClassifier};
use crate::error::{CorrectionsError, Result};
use crate::session::{RequestContext, Session};
use crate::traits::{CorrectionTransport, ProgressCallback};
use crate::types::{Correction, Outcome};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Input file read when no other path is given
pub const DEFAULT_CORRECTIONS_FILE: &str = "corrections.json";

const SUBMIT_CONTEXT: &str = "unable to add correction";

/// Where a batch run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Loading,
    Authenticating,
    /// Submitting the correction at this zero-based position
    Submitting(usize),
    Done,
    Aborted,
}

/// What to do when a correction fails with a fatal outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Abort the whole batch on the first failure
    #[default]
    FailFast,
    /// Record the failure and carry on, reporting a summary at the end
    ContinueOnError,
}

/// Outcome of one correction in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub index: usize,
    pub label: String,
    pub outcome: Outcome,
}

/// Summary of a finished batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub state: BatchState,
    pub total: usize,
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn submitted(&self) -> usize {
        self.items.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Success))
    }

    pub fn decode_mismatches(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::DecodeMismatch { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|item| item.outcome.is_fatal())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|item| predicate(&item.outcome)).count()
    }
}

/// Read and parse a JSON array of corrections
pub fn load_corrections<P: AsRef<Path>>(path: P) -> Result<Vec<Correction>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| CorrectionsError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| CorrectionsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Sequential submitter driving corrections through a [`Session`]
pub struct BatchSubmitter<'a, T, C = ErrorClassifierImpl> {
    session: &'a Session<T>,
    classifier: C,
    mode: FailureMode,
    progress: Option<ProgressCallback>,
    state: BatchState,
}

impl<'a, T: CorrectionTransport> BatchSubmitter<'a, T> {
    pub fn new(session: &'a Session<T>) -> Self {
        Self::with_classifier(session, ErrorClassifierImpl::new())
    }
}

impl<'a, T: CorrectionTransport, C: OutcomeClassifier> BatchSubmitter<'a, T, C> {
    pub fn with_classifier(session: &'a Session<T>, classifier: C) -> Self {
        Self {
            session,
            classifier,
            mode: FailureMode::default(),
            progress: None,
            state: BatchState::Idle,
        }
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Load `path` and submit every correction in it
    pub async fn run_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        parent: Option<&RequestContext>,
    ) -> Result<BatchReport> {
        self.transition(BatchState::Loading);
        let corrections = match load_corrections(&path) {
            Ok(corrections) => corrections,
            Err(err) => {
                self.transition(BatchState::Aborted);
                return Err(err);
            }
        };
        info!(
            count = corrections.len(),
            file = %path.as_ref().display(),
            "found {} corrections to add",
            corrections.len()
        );

        self.submit_all(&corrections, parent).await
    }

    /// Submit an already loaded correction set
    pub async fn submit_all(
        &mut self,
        corrections: &[Correction],
        parent: Option<&RequestContext>,
    ) -> Result<BatchReport> {
        self.transition(BatchState::Authenticating);
        let context = self.session.new_request_context(parent);

        let total = corrections.len();
        let mut items = Vec::with_capacity(total);

        for (index, correction) in corrections.iter().enumerate() {
            self.transition(BatchState::Submitting(index));

            if context.is_cancelled() {
                warn!(index, "batch cancelled");
                self.transition(BatchState::Aborted);
                return Err(CorrectionsError::Cancelled { index });
            }

            let item = self.submit_one(&context, index, correction).await;
            if let Some(callback) = &self.progress {
                callback(&item, total);
            }

            if item.outcome.is_fatal() && self.mode == FailureMode::FailFast {
                self.transition(BatchState::Aborted);
                return Err(CorrectionsError::Aborted {
                    index: item.index,
                    label: item.label,
                    outcome: item.outcome,
                });
            }
            items.push(item);
        }

        self.transition(BatchState::Done);
        let report = BatchReport {
            state: self.state,
            total,
            items,
        };
        info!(
            submitted = report.submitted(),
            failed = report.failures().count(),
            "correction batch finished"
        );
        Ok(report)
    }

    async fn submit_one(
        &self,
        context: &RequestContext,
        index: usize,
        correction: &Correction,
    ) -> ItemReport {
        let label = correction.package_label().to_string();
        info!(index, "adding correction for package: {}", label);

        let result = self.session.submit(context, correction).await;
        let outcome = self.classifier.classify_result(&result, SUBMIT_CONTEXT);

        match &outcome {
            Outcome::Success => debug!(index, package = %label, "correction added"),
            Outcome::DecodeMismatch { detail } => {
                warn!(index, package = %label, "correction added, response did not match declared shape: {}", detail)
            }
            Outcome::HttpFailure { status, detail } => {
                error!(index, package = %label, status, "{}", detail)
            }
            Outcome::TransportFailure { detail } => error!(index, package = %label, "{}", detail),
        }

        ItemReport {
            index,
            label,
            outcome,
        }
    }

    fn transition(&mut self, next: BatchState) {
        debug!(from = ?self.state, to = ?next, "batch state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use crate::testing::{correction, MockTransport};
    use crate::types::{ApiError, ApiFailure, ApiResponse};
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn session(transport: MockTransport) -> Session<MockTransport> {
        let config = SessionConfig::from_url("https://nextlinux.example.com")
            .with_credentials("admin", "foobar")
            .with_account("admin");
        Session::with_transport(config, transport)
    }

    fn decode_mismatch() -> ApiFailure {
        ApiFailure::with_response(
            ApiResponse::new(200, r#"{"id": "c-1"}"#),
            ApiError::Decode {
                expected: "Vec<Correction>",
                message: "invalid type: map, expected a sequence".to_string(),
            },
        )
    }

    fn three_item_transport() -> MockTransport {
        MockTransport::new().with_results([
            Ok(ApiResponse::new(200, "[]")),
            Err(decode_mismatch()),
            Err(ApiFailure::with_response(
                ApiResponse::new(500, "boom"),
                ApiError::Status("500 Internal Server Error".to_string()),
            )),
        ])
    }

    fn four_corrections() -> Vec<Correction> {
        vec![
            correction("openssl"),
            correction("zlib"),
            correction("curl"),
            correction("busybox"),
        ]
    }

    #[tokio::test]
    async fn test_fail_fast_stops_at_first_http_failure() {
        let session = session(three_item_transport());
        let mut submitter = BatchSubmitter::new(&session);

        let err = submitter.submit_all(&four_corrections(), None).await.unwrap_err();

        match err {
            CorrectionsError::Aborted { index, label, outcome } => {
                assert_eq!(index, 2);
                assert_eq!(label, "curl");
                assert_eq!(outcome.status(), Some(500));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(submitter.state(), BatchState::Aborted);

        let calls = session.transport().calls();
        assert_eq!(calls.len(), 3, "busybox must not be attempted");
        assert!(calls.iter().all(|call| call.username == "admin"));
    }

    #[tokio::test]
    async fn test_continue_on_error_reports_summary() {
        let session = session(three_item_transport());
        let mut submitter =
            BatchSubmitter::new(&session).with_failure_mode(FailureMode::ContinueOnError);

        let report = submitter.submit_all(&four_corrections(), None).await.unwrap();

        assert_eq!(report.state, BatchState::Done);
        assert_eq!(report.total, 4);
        assert_eq!(report.submitted(), 4);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.decode_mismatches(), 1);
        assert!(report.has_failures());

        let failures: Vec<_> = report.failures().map(|item| item.label.as_str()).collect();
        assert_eq!(failures, vec!["curl"]);
    }

    #[tokio::test]
    async fn test_transport_failure_aborts() {
        let transport = MockTransport::new().with_result(Err(ApiFailure::transport(
            ApiError::Transport("connection refused".to_string()),
        )));
        let session = session(transport);
        let mut submitter = BatchSubmitter::new(&session);

        let err = submitter.submit_all(&four_corrections(), None).await.unwrap_err();
        assert!(matches!(
            err.outcome(),
            Some(Outcome::TransportFailure { detail }) if detail.contains("connection refused")
        ));
        assert_eq!(session.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_calls() {
        let session = session(MockTransport::new());
        let mut submitter = BatchSubmitter::new(&session);

        let report = submitter.submit_all(&[], None).await.unwrap();

        assert_eq!(report.state, BatchState::Done);
        assert_eq!(report.submitted(), 0);
        assert!(session.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_parent_stops_batch() {
        let session = session(MockTransport::new());
        let parent = RequestContext::background();
        parent.cancellation().cancel();

        let mut submitter = BatchSubmitter::new(&session);
        let err = submitter
            .submit_all(&four_corrections(), Some(&parent))
            .await
            .unwrap_err();

        assert!(matches!(err, CorrectionsError::Cancelled { index: 0 }));
        assert!(session.transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_progress_callback_sees_every_item() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let session = session(MockTransport::new());
        let mut submitter = BatchSubmitter::new(&session).with_progress(Box::new(move |item: &ItemReport, total: usize| {
            sink.lock().unwrap().push((item.index, item.label.clone(), total));
        }));

        submitter
            .submit_all(&[correction("openssl"), correction("zlib")], None)
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![(0, "openssl".to_string(), 2), (1, "zlib".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_run_file_missing_is_load_error() {
        let session = session(MockTransport::new());
        let mut submitter = BatchSubmitter::new(&session);

        let err = submitter
            .run_file("/definitely/not/here/corrections.json", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CorrectionsError::Load { .. }));
        assert_eq!(submitter.state(), BatchState::Aborted);
    }

    #[tokio::test]
    async fn test_run_file_malformed_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"match": {{"type": "java"}}}}, "#).unwrap();

        let session = session(MockTransport::new());
        let mut submitter = BatchSubmitter::new(&session);

        let err = submitter.run_file(file.path(), None).await.unwrap_err();
        assert!(matches!(err, CorrectionsError::Parse { .. }));
        assert!(session.transport().calls().is_empty());
    }

    #[test]
    fn test_load_corrections_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"match": {{"type": "java", "field_matches": []}}}}"#).unwrap();

        assert!(matches!(
            load_corrections(file.path()),
            Err(CorrectionsError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_corrections_in_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let corrections = vec![correction("b"), correction("a")];
        write!(file, "{}", serde_json::to_string(&corrections).unwrap()).unwrap();

        let loaded = load_corrections(file.path()).unwrap();
        let labels: Vec<_> = loaded.iter().map(|c| c.package_label()).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }
}
