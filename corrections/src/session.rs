//! Authenticated session against the Nextlinux Enterprise API.
//!
//! A [`Session`] is an immutable bundle of connection parameters plus the
//! transport that carries calls. Credentials are not attached per call;
//! instead a [`RequestContext`] is derived once per batch and reused for every
//! submission in it.
//!
//! # Security
//!
//! [`SessionConfig::insecure`] turns off TLS certificate validation on the
//! underlying transport. Anyone on the network path can then impersonate the
//! service and capture the basic-auth credentials. It is never enabled by
//! default and should only be used against test installations.

use crate::error::Result;
use crate::http::HttpTransport;
use crate::traits::CorrectionTransport;
use crate::types::{ApiError, ApiFailure, ApiResult, Correction};
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters for a session
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub hostname: String,
    /// `None` means [`DEFAULT_SCHEME`]
    pub scheme: Option<String>,
    pub username: String,
    pub password: String,
    /// Tenant selector sent as `x-nextlinux-account`; not a credential
    pub account: String,
    pub timeout: Duration,
    /// Disable TLS certificate validation. Weakens the trust boundary.
    pub insecure: bool,
}

impl SessionConfig {
    /// Build a config from a host URL that may carry a `scheme://` prefix
    pub fn from_url(url: &str) -> Self {
        let (scheme, hostname) = match url.split_once("://") {
            Some((scheme, hostname)) => (Some(scheme.to_string()), hostname.to_string()),
            None => (None, url.to_string()),
        };

        Self {
            hostname,
            scheme,
            username: String::new(),
            password: String::new(),
            account: String::new(),
            timeout: DEFAULT_TIMEOUT,
            insecure: false,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn scheme(&self) -> &str {
        match self.scheme.as_deref() {
            Some(scheme) if !scheme.is_empty() => scheme,
            _ => DEFAULT_SCHEME,
        }
    }

    /// Base URL of the enterprise API, without a trailing slash
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}/v1/enterprise",
            self.scheme(),
            self.hostname.trim_end_matches('/')
        )
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("hostname", &self.hostname)
            .field("scheme", &self.scheme())
            .field("username", &self.username)
            .field("password", &"******")
            .field("account", &self.account)
            .field("timeout", &self.timeout)
            .field("insecure", &self.insecure)
            .finish()
    }
}

/// Basic-auth credential pair
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"******")
            .finish()
    }
}

/// Per-batch capability carrying credentials and a cancellation scope
#[derive(Debug, Clone)]
pub struct RequestContext {
    credentials: BasicAuth,
    cancellation: CancellationToken,
}

impl RequestContext {
    /// A context with no credentials and a fresh cancellation scope
    pub fn background() -> Self {
        Self {
            credentials: BasicAuth {
                username: String::new(),
                password: String::new(),
            },
            cancellation: CancellationToken::new(),
        }
    }

    /// A context that is cancelled whenever `token` is
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancellation: token,
            ..Self::background()
        }
    }

    pub fn credentials(&self) -> &BasicAuth {
        &self.credentials
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Immutable session wrapping a transport
pub struct Session<T = HttpTransport> {
    config: SessionConfig,
    transport: T,
}

impl Session<HttpTransport> {
    /// Create a session backed by the reqwest transport
    pub fn new(config: SessionConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: CorrectionTransport> Session<T> {
    /// Create a session over an externally supplied transport
    pub fn with_transport(config: SessionConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Derive an authenticated context; cancelling `parent` cancels the child
    pub fn new_request_context(&self, parent: Option<&RequestContext>) -> RequestContext {
        let cancellation = parent
            .map(|parent| parent.cancellation.child_token())
            .unwrap_or_default();

        RequestContext {
            credentials: BasicAuth {
                username: self.config.username.clone(),
                password: self.config.password.clone(),
            },
            cancellation,
        }
    }

    /// Submit one correction, bounded by the configured timeout and the context's cancellation
    pub async fn submit(&self, context: &RequestContext, correction: &Correction) -> ApiResult {
        let call = tokio::time::timeout(
            self.config.timeout,
            self.transport.add_correction(context, correction),
        );

        tokio::select! {
            biased;
            _ = context.cancellation.cancelled() => Err(ApiFailure::transport(ApiError::Cancelled)),
            result = call => match result {
                Ok(result) => result,
                Err(_) => Err(ApiFailure::transport(ApiError::Transport(format!(
                    "request timed out after {}s",
                    self.config.timeout.as_secs_f64()
                )))),
            },
        }
    }
}
