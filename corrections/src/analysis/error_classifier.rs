//! Turns a raw response/error pair into an [`Outcome`].
//!
//! The status code is the primary signal. A body decode error only matters
//! when the status does not already indicate failure, and then it is reported
//! as a non-fatal [`Outcome::DecodeMismatch`]: the remote service answers the
//! add-correction call with a single object although its contract declares an
//! array, and the correction has been stored regardless.

use crate::types::{ApiError, ApiResponse, ApiResult, Outcome};

/// Trait for submission outcome classification - pure business logic
pub trait OutcomeClassifier: Send + Sync {
    /// Classify a response/error pair; `context` prefixes every detail message
    fn classify(
        &self,
        response: Option<&ApiResponse>,
        error: Option<&ApiError>,
        context: &str,
    ) -> Outcome;

    /// Classify the result of a transport call
    fn classify_result(&self, result: &ApiResult, context: &str) -> Outcome {
        match result {
            Ok(response) => self.classify(Some(response), None, context),
            Err(failure) => self.classify(failure.response.as_ref(), Some(&failure.error), context),
        }
    }
}

/// Default implementation of the outcome classifier
#[derive(Debug, Clone, Copy)]
pub struct ErrorClassifierImpl;

impl ErrorClassifierImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ErrorClassifierImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeClassifier for ErrorClassifierImpl {
    fn classify(
        &self,
        response: Option<&ApiResponse>,
        error: Option<&ApiError>,
        context: &str,
    ) -> Outcome {
        match (response, error) {
            (Some(response), None) if response.is_failure() => Outcome::HttpFailure {
                status: response.status,
                detail: with_context(context, &response.status_text),
            },
            (Some(_), None) => Outcome::Success,
            (None, Some(error)) => Outcome::TransportFailure {
                detail: with_context(context, error),
            },
            // the status supersedes whatever went wrong decoding the body
            (Some(response), Some(error)) if response.is_failure() => Outcome::HttpFailure {
                status: response.status,
                detail: with_context(context, error),
            },
            (Some(_), Some(error)) if matches!(error, ApiError::Decode { .. }) => Outcome::DecodeMismatch {
                detail: with_context(context, error),
            },
            (Some(_), Some(error)) => Outcome::TransportFailure {
                detail: with_context(context, error),
            },
            (None, None) => Outcome::TransportFailure {
                detail: with_context(context, "no response received"),
            },
        }
    }
}

fn with_context(context: &str, message: impl std::fmt::Display) -> String {
    if context.is_empty() {
        message.to_string()
    } else {
        format!("{context}: {message}")
    }
}
