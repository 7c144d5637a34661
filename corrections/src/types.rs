use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Label used when a correction does not match on a `package` field
pub const UNKNOWN_PACKAGE: &str = "unknown";

/// A package metadata override rule as accepted by the remote service
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Correction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Correction type, `package` unless the service says otherwise
    #[serde(rename = "type", default = "default_correction_type")]
    pub correction_type: String,
    /// Which packages this correction applies to
    #[serde(rename = "match", default)]
    pub match_spec: CorrectionMatch,
    /// Field replacements applied to matched packages
    #[serde(default)]
    pub replace: Vec<ReplacementField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<String>,
    /// Fields this crate does not model, kept so the record round-trips intact
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_correction_type() -> String {
    "package".to_string()
}

/// Match rule: the package type plus ordered field matches.
///
/// Records are opaque to this crate. Absent fields load as empty values and
/// the remote service decides whether the record is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CorrectionMatch {
    #[serde(rename = "type", default)]
    pub package_type: String,
    #[serde(default)]
    pub field_matches: Vec<FieldMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldMatch {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub field_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReplacementField {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub replacement_value: String,
}

impl Correction {
    /// Human readable label for logging, taken from the `package` field match.
    ///
    /// The whole list is scanned, so when several `package` entries exist the
    /// last one wins. Returns [`UNKNOWN_PACKAGE`] when there is none.
    pub fn package_label(&self) -> &str {
        self.match_spec
            .field_matches
            .iter()
            .rev()
            .find(|field| field.field_name == "package")
            .map(|field| field.field_value.as_str())
            .unwrap_or(UNKNOWN_PACKAGE)
    }
}

/// Classified result of a single submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Body did not match the declared response shape although the status was fine
    DecodeMismatch { detail: String },
    HttpFailure { status: u16, detail: String },
    TransportFailure { detail: String },
}

impl Outcome {
    /// Whether this outcome stops a fail-fast batch
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::HttpFailure { .. } | Self::TransportFailure { .. })
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::DecodeMismatch { detail }
            | Self::HttpFailure { detail, .. }
            | Self::TransportFailure { detail } => Some(detail),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::DecodeMismatch { detail } => write!(f, "response decode mismatch: {detail}"),
            Self::HttpFailure { status, detail } => write!(f, "HTTP {status}: {detail}"),
            Self::TransportFailure { detail } => write!(f, "transport failure: {detail}"),
        }
    }
}

/// A fully drained HTTP response; owns its body so no connection outlives the call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Status line such as `500 Internal Server Error`
    pub status_text: String,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_line(status),
            body: body.into(),
        }
    }

    /// Check if response indicates failure
    pub fn is_failure(&self) -> bool {
        self.status > 300
    }
}

fn status_line(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
    {
        Some(reason) => format!("{status} {reason}"),
        None => status.to_string(),
    }
}

/// Errors raised by a transport while performing a remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Network level failure: connect, TLS, timeout, body read
    #[error("{0}")]
    Transport(String),

    /// The service answered with a failing status
    #[error("{0}")]
    Status(String),

    /// The body could not be decoded into the declared response type
    #[error("cannot decode response body as {expected}: {message}")]
    Decode {
        expected: &'static str,
        message: String,
    },

    #[error("request cancelled")]
    Cancelled,
}

/// A failed call: the error plus whatever response was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub response: Option<ApiResponse>,
    pub error: ApiError,
}

impl ApiFailure {
    /// Failure before any response arrived
    pub fn transport(error: ApiError) -> Self {
        Self {
            response: None,
            error,
        }
    }

    pub fn with_response(response: ApiResponse, error: ApiError) -> Self {
        Self {
            response: Some(response),
            error,
        }
    }
}

/// Result of one remote call as seen by the classifier
pub type ApiResult = std::result::Result<ApiResponse, ApiFailure>;
