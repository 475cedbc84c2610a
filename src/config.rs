//! Service configuration.
//!
//! Defaults point at the production collection service. Environment
//! variables overlay the defaults; the CLI overlays the environment.

use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://insamling.postnummeruppror.nu";
pub const DEFAULT_API_VERSION: &str = "0.0.5";
pub const DEFAULT_APPLICATION: &str = "insamlingsappen-ios";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_API_URL: &str = "POSTNUMMERUPPROR_API_URL";
pub const ENV_API_VERSION: &str = "POSTNUMMERUPPROR_API_VERSION";
pub const ENV_APPLICATION: &str = "POSTNUMMERUPPROR_APPLICATION";
pub const ENV_APP_VERSION: &str = "POSTNUMMERUPPROR_APP_VERSION";
pub const ENV_TIMEOUT_SECS: &str = "POSTNUMMERUPPROR_TIMEOUT_SECS";

const REPORT_PATH: &str = "location_sample/create";
const ACCOUNT_PATH: &str = "account/set";

/// Where and how the core talks to the collection service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub api_version: String,
    pub application: String,
    pub application_version: String,
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            application: DEFAULT_APPLICATION.to_string(),
            application_version: env!("CARGO_PKG_VERSION").to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with any `POSTNUMMERUPPROR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as [`ServiceConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config = config.with_base_url(&url)?;
        }
        if let Some(version) = lookup(ENV_API_VERSION) {
            if version.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    var: ENV_API_VERSION,
                    value: version,
                });
            }
            config.api_version = version;
        }
        if let Some(application) = lookup(ENV_APPLICATION) {
            config.application = application;
        }
        if let Some(app_version) = lookup(ENV_APP_VERSION) {
            config.application_version = app_version;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let parsed = secs
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: ENV_TIMEOUT_SECS,
                    value: secs.clone(),
                })?;
            config.timeout = Duration::from_secs(parsed);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                url: url.to_string(),
                reason: "not a base url".to_string(),
            });
        }
        self.base_url = parsed.as_str().trim_end_matches('/').to_string();
        Ok(self)
    }

    /// `{base}/api/{version}/location_sample/create`
    pub fn report_endpoint(&self) -> String {
        self.endpoint(REPORT_PATH)
    }

    /// `{base}/api/{version}/account/set`
    pub fn account_endpoint(&self) -> String {
        self.endpoint(ACCOUNT_PATH)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}/{}", self.base_url, self.api_version, path)
    }
}
