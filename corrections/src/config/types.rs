use crate::error::{CorrectionsError, Result};
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const REDACTED: &str = "******";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Connection details for the Nextlinux Enterprise service
    pub nextlinux: NextlinuxConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NextlinuxConfig {
    /// Host URL, optionally prefixed with `scheme://`
    pub url: String,
    pub user: String,
    pub password: String,
    pub account: String,
    pub http: HttpConfig,
}

/// Settings for the HTTP client itself
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Skip TLS certificate validation
    pub insecure: bool,
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: u64,
}

impl Default for NextlinuxConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user: String::new(),
            password: String::new(),
            account: "admin".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout_seconds: 10,
        }
    }
}

impl ApplicationConfig {
    /// Check the values a session cannot work without
    pub fn validate(&self) -> Result<()> {
        if self.nextlinux.url.trim().is_empty() {
            return Err(CorrectionsError::invalid_config(
                "nextlinux.url is required (set it in the config file or FPMANAGEMENT_NEXTLINUX_URL)",
            ));
        }
        if self.nextlinux.http.timeout_seconds == 0 {
            return Err(CorrectionsError::invalid_config(
                "nextlinux.http.timeoutSeconds must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Session parameters derived from this configuration
    pub fn session_config(&self) -> SessionConfig {
        let nextlinux = &self.nextlinux;
        SessionConfig::from_url(&nextlinux.url)
            .with_credentials(nextlinux.user.clone(), nextlinux.password.clone())
            .with_account(nextlinux.account.clone())
            .with_timeout(Duration::from_secs(nextlinux.http.timeout_seconds))
            .with_insecure(nextlinux.http.insecure)
    }
}

impl fmt::Display for ApplicationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut redacted = self.clone();
        if !redacted.nextlinux.password.is_empty() {
            redacted.nextlinux.password = REDACTED.to_string();
        }

        match serde_yaml::to_string(&redacted) {
            Ok(yaml) => f.write_str(&yaml),
            Err(err) => write!(f, "{err}"),
        }
    }
}
