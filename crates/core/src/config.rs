//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the upstream
//! client. Request handling never reads environment variables, so credentials and
//! endpoints stay consistent across concurrent requests and test harnesses.

use crate::constants::{
    DEFAULT_APPOINTMENT_INDEX, DEFAULT_BASE_URL, DEFAULT_REFERRAL_INDEX, DEFAULT_TIMEOUT_SECS,
    MAX_TIMEOUT_SECS,
};
use crate::{SisregError, SisregResult};
use std::fmt;
use std::time::Duration;

/// Basic-auth credentials for the upstream registry.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> SisregResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(SisregError::InvalidConfig(
                "SISREG_USUARIO cannot be empty".into(),
            ));
        }
        if password.is_empty() {
            return Err(SisregError::InvalidConfig(
                "SISREG_SENHA cannot be empty".into(),
            ));
        }
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

// The password never reaches logs through a `{:?}` of the config.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Upstream registry configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct SisregConfig {
    base_url: String,
    referral_index: String,
    appointment_index: String,
    credentials: Credentials,
    timeout: Duration,
}

impl SisregConfig {
    /// Create a configuration with the default host, indices and timeout.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            referral_index: DEFAULT_REFERRAL_INDEX.into(),
            appointment_index: DEFAULT_APPOINTMENT_INDEX.into(),
            credentials,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the search host. A trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> SisregResult<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(SisregError::InvalidConfig(format!(
                "SISREG_BASE_URL must be an http(s) URL, got {base_url:?}"
            )));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    /// Override the referral and appointment index names.
    pub fn with_indices(
        mut self,
        referral_index: impl Into<String>,
        appointment_index: impl Into<String>,
    ) -> SisregResult<Self> {
        let referral_index = referral_index.into();
        let appointment_index = appointment_index.into();
        for (name, value) in [
            ("SISREG_SOLICITACAO_INDEX", &referral_index),
            ("SISREG_MARCACAO_INDEX", &appointment_index),
        ] {
            if value.trim().is_empty() || value.contains('/') {
                return Err(SisregError::InvalidConfig(format!(
                    "{name} must be a non-empty index name without '/'"
                )));
            }
        }
        self.referral_index = referral_index.trim().to_string();
        self.appointment_index = appointment_index.trim().to_string();
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn referral_index(&self) -> &str {
        &self.referral_index
    }

    pub fn appointment_index(&self) -> &str {
        &self.appointment_index
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full `_search` URL for an index.
    pub fn search_url(&self, index: &str) -> String {
        format!("{}/{}/_search", self.base_url, index)
    }
}

/// Resolve the full configuration from a variable lookup.
///
/// `lookup` is usually `|name| std::env::var(name).ok()`; taking it as a parameter keeps
/// startup logic testable without touching the process environment.
pub fn config_from_lookup<F>(lookup: F) -> SisregResult<SisregConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = Credentials::new(
        lookup("SISREG_USUARIO").unwrap_or_default(),
        lookup("SISREG_SENHA").unwrap_or_default(),
    )?;

    let timeout = timeout_from_env_value(lookup("SISREG_TIMEOUT_SECS"))?;

    Ok(SisregConfig::new(credentials)
        .with_base_url(lookup("SISREG_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()))?
        .with_indices(
            lookup("SISREG_SOLICITACAO_INDEX").unwrap_or_else(|| DEFAULT_REFERRAL_INDEX.into()),
            lookup("SISREG_MARCACAO_INDEX").unwrap_or_else(|| DEFAULT_APPOINTMENT_INDEX.into()),
        )?
        .with_timeout(timeout))
}

/// Parse the upstream timeout from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn timeout_from_env_value(value: Option<String>) -> SisregResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let secs = match value {
        None => DEFAULT_TIMEOUT_SECS,
        Some(v) => v.parse::<u64>().map_err(|_| {
            SisregError::InvalidConfig(format!("SISREG_TIMEOUT_SECS is not a number: {v:?}"))
        })?,
    };

    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(SisregError::InvalidConfig(format!(
            "SISREG_TIMEOUT_SECS must be between 1 and {MAX_TIMEOUT_SECS}"
        )));
    }

    Ok(Duration::from_secs(secs))
}

/// Parse a comma-separated CORS origin allowlist.
///
/// Returns an empty list when unset, which callers treat as "allow any origin".
pub fn cors_origins_from_env_value(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
