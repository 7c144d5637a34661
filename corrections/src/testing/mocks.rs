use crate::session::RequestContext;
use crate::traits::CorrectionTransport;
use crate::types::{ApiResponse, ApiResult, Correction, CorrectionMatch, FieldMatch};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A call observed by [`MockTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub label: String,
    pub username: String,
}

/// Mock transport replaying scripted results in order
#[derive(Clone, Default)]
pub struct MockTransport {
    results: Arc<Mutex<VecDeque<ApiResult>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    hang: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result for the next call; unscripted calls answer `200 []`
    pub fn with_result(self, result: ApiResult) -> Self {
        self.results
            .lock()
            .expect("mock results lock poisoned")
            .push_back(result);
        self
    }

    pub fn with_results(self, results: impl IntoIterator<Item = ApiResult>) -> Self {
        results
            .into_iter()
            .fold(self, |mock, result| mock.with_result(result))
    }

    /// Never complete a call
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("mock calls lock poisoned").clone()
    }
}

impl CorrectionTransport for MockTransport {
    async fn add_correction(&self, context: &RequestContext, correction: &Correction) -> ApiResult {
        self.calls
            .lock()
            .expect("mock calls lock poisoned")
            .push(RecordedCall {
                label: correction.package_label().to_string(),
                username: context.credentials().username.clone(),
            });

        if self.hang {
            std::future::pending::<()>().await;
        }

        let next = self
            .results
            .lock()
            .expect("mock results lock poisoned")
            .pop_front();
        next.unwrap_or_else(|| Ok(ApiResponse::new(200, "[]")))
    }
}

/// Build a minimal correction matching on `package`
pub fn correction(package: &str) -> Correction {
    Correction {
        id: None,
        description: Some(format!("correction for {package}")),
        correction_type: "package".to_string(),
        match_spec: CorrectionMatch {
            package_type: "java".to_string(),
            field_matches: vec![FieldMatch {
                field_name: "package".to_string(),
                field_value: package.to_string(),
            }],
        },
        replace: Vec::new(),
        created_at: None,
        last_modified_at: None,
        extra: serde_json::Map::new(),
    }
}
