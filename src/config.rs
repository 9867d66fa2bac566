//! Configuration for oaigate
//!
//! Centralized configuration with sensible defaults. Built once at start-up
//! and shared read-only by every request.

use std::time::Duration;

use crate::error::{GateError, Result};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "OAIGATE_";

/// Main configuration for an oaigate instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Repository Identity
    // -------------------------------------------------------------------------
    /// Name reported by Identify
    pub repository_name: String,

    /// Contact address reported by Identify
    pub admin_email: String,

    /// Namespace used in `oai:<namespace>/notification:<id>` identifiers
    pub identifier_namespace: String,

    // -------------------------------------------------------------------------
    // Harvesting Window
    // -------------------------------------------------------------------------
    /// How far back harvesters may reach; also the earliest datestamp
    pub lookback: Duration,

    /// How long an issued resumption token stays valid
    pub token_lifetime: Duration,

    // -------------------------------------------------------------------------
    // Backend Configuration
    // -------------------------------------------------------------------------
    /// Base URL of the notification API
    pub backend_url: String,

    /// API key appended to backend requests, if any
    pub backend_api_key: Option<String>,

    /// Per-request timeout against the backend
    pub backend_timeout: Duration,

    /// Total attempts for a transiently failing backend call
    pub retry_attempts: u32,

    /// Base delay between attempts (doubled after each failure)
    pub retry_backoff: Duration,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// HTTP listen address
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repository_name: "Jisc Publications Router OAI-PMH Endpoint".to_string(),
            admin_email: "admin@jisc.ac.uk".to_string(),
            identifier_namespace: "pubrouter.jisc.ac.uk".to_string(),
            lookback: Duration::from_secs(7_776_000), // 90 days
            token_lifetime: Duration::from_secs(86_400),
            backend_url: "https://pubrouter.jisc.ac.uk/api/v1".to_string(),
            backend_api_key: None,
            backend_timeout: Duration::from_secs(20),
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(200),
            listen_addr: "0.0.0.0:5030".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Defaults overlaid with `OAIGATE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from an arbitrary lookup
    ///
    /// Keys are the `OAIGATE_*` variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.trim().is_empty())
        };
        let mut builder = Config::builder();

        if let Some(v) = get("REPO_NAME") {
            builder = builder.repository_name(v);
        }
        if let Some(v) = get("ADMIN_EMAIL") {
            builder = builder.admin_email(v);
        }
        if let Some(v) = get("IDENTIFIER_NAMESPACE") {
            builder = builder.identifier_namespace(v);
        }
        if let Some(v) = get("MAX_LOOKBACK_SECS") {
            builder = builder.lookback(Duration::from_secs(parse_number("MAX_LOOKBACK_SECS", &v)?));
        }
        if let Some(v) = get("TOKEN_LIFETIME_SECS") {
            builder = builder.token_lifetime(Duration::from_secs(parse_number("TOKEN_LIFETIME_SECS", &v)?));
        }
        if let Some(v) = get("BACKEND_URL") {
            builder = builder.backend_url(v);
        }
        if let Some(v) = get("BACKEND_API_KEY") {
            builder = builder.backend_api_key(v);
        }
        if let Some(v) = get("BACKEND_TIMEOUT_SECS") {
            builder = builder.backend_timeout(Duration::from_secs(parse_number("BACKEND_TIMEOUT_SECS", &v)?));
        }
        if let Some(v) = get("RETRY_ATTEMPTS") {
            let attempts = parse_number("RETRY_ATTEMPTS", &v)?;
            builder = builder.retry_attempts(u32::try_from(attempts).unwrap_or(u32::MAX));
        }
        if let Some(v) = get("RETRY_BACKOFF_MS") {
            builder = builder.retry_backoff(Duration::from_millis(parse_number("RETRY_BACKOFF_MS", &v)?));
        }
        if let Some(v) = get("LISTEN_ADDR") {
            builder = builder.listen_addr(v);
        }

        Ok(builder.build())
    }
}

fn parse_number(name: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|e| {
        GateError::Config(format!("{ENV_PREFIX}{name}={value:?} is not a number: {e}"))
    })
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the repository name reported by Identify
    pub fn repository_name(mut self, name: impl Into<String>) -> Self {
        self.config.repository_name = name.into();
        self
    }

    /// Set the admin contact address
    pub fn admin_email(mut self, email: impl Into<String>) -> Self {
        self.config.admin_email = email.into();
        self
    }

    /// Set the identifier namespace
    pub fn identifier_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.identifier_namespace = namespace.into();
        self
    }

    /// Set the harvesting horizon
    pub fn lookback(mut self, lookback: Duration) -> Self {
        self.config.lookback = lookback;
        self
    }

    /// Set the resumption token lifetime
    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.config.token_lifetime = lifetime;
        self
    }

    /// Set the notification API base URL
    pub fn backend_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend_url = url.into();
        self
    }

    /// Set the notification API key
    pub fn backend_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.backend_api_key = Some(key.into());
        self
    }

    /// Set the backend request timeout
    pub fn backend_timeout(mut self, timeout: Duration) -> Self {
        self.config.backend_timeout = timeout;
        self
    }

    /// Set the number of attempts for transient backend failures
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.config.retry_attempts = attempts.max(1);
        self
    }

    /// Set the base backoff between attempts
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.config.retry_backoff = backoff;
        self
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
