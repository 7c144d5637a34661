use crate::error::{CorrectionsError, Result};
use crate::session::{RequestContext, SessionConfig};
use crate::traits::CorrectionTransport;
use crate::types::{ApiError, ApiFailure, ApiResponse, ApiResult, Correction};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::error::Category;
use tracing::debug;

/// Header selecting the tenant account on every call
pub const ACCOUNT_HEADER: &str = "x-nextlinux-account";

/// Type the service declares for the add-correction response body
const DECLARED_RESPONSE: &str = "Vec<Correction>";

/// reqwest-backed transport for the corrections endpoint
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Create a new transport honouring the session's timeout, TLS policy and account header
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if !config.account.is_empty() {
            let account = HeaderValue::from_str(&config.account).map_err(|_| {
                CorrectionsError::invalid_config(format!(
                    "account '{}' is not a valid header value",
                    config.account
                ))
            })?;
            headers.insert(ACCOUNT_HEADER, account);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/corrections", config.base_url()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check the drained response against the declared contract
    fn check_response(response: ApiResponse) -> ApiResult {
        if response.is_failure() {
            let error = ApiError::Status(response.status_text.clone());
            return Err(ApiFailure::with_response(response, error));
        }

        // nothing was returned, so nothing contradicts the declared shape
        if response.body.trim().is_empty() {
            return Ok(response);
        }

        match serde_json::from_str::<Vec<Correction>>(&response.body) {
            Ok(_) => Ok(response),
            Err(err) => {
                let error = match err.classify() {
                    // well-formed JSON of a different shape
                    Category::Data => ApiError::Decode {
                        expected: DECLARED_RESPONSE,
                        message: err.to_string(),
                    },
                    Category::Syntax | Category::Eof | Category::Io => {
                        ApiError::Transport(format!("invalid response body: {err}"))
                    }
                };
                Err(ApiFailure::with_response(response, error))
            }
        }
    }
}

impl CorrectionTransport for HttpTransport {
    async fn add_correction(&self, context: &RequestContext, correction: &Correction) -> ApiResult {
        let credentials = context.credentials();
        debug!(endpoint = %self.endpoint, "POST correction");

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .json(correction)
            .send()
            .await
            .map_err(|e| ApiFailure::transport(ApiError::Transport(e.to_string())))?;

        let status = response.status().as_u16();

        // consuming the body releases the connection whatever happens next
        let body = response.text().await.map_err(|e| {
            ApiFailure::with_response(
                ApiResponse::new(status, String::new()),
                ApiError::Transport(format!("unable to read response body: {e}")),
            )
        })?;

        Self::check_response(ApiResponse::new(status, body))
    }
}
