//! Provider configuration.
//!
//! The provider block accepts `token` and `base_url`; either may instead come
//! from the environment (`SENTRY_TOKEN`, `SENTRY_BASE_URL`). Values in the
//! configuration win over the environment.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::logging::Logger;
use crate::schema::{Attribute, Schema};

/// API root used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://sentry.io/api/";

/// Environment variable holding the authentication token.
pub const TOKEN_ENV: &str = "SENTRY_TOKEN";

/// Environment variable holding the API root.
pub const BASE_URL_ENV: &str = "SENTRY_BASE_URL";

/// Provider configuration as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Authentication token.
    pub token: Option<String>,
    /// Root of the Sentry web API.
    pub base_url: Option<String>,
}

/// Configuration with fallbacks applied and the base URL parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Authentication token.
    pub token: String,
    /// API root, always ending in `/`.
    pub base_url: Url,
}

impl ProviderConfig {
    /// Schema of the provider block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(format!(
                        "The authentication token used to connect to Sentry. Falls back to {}.",
                        TOKEN_ENV
                    )),
            )
            .with_attribute(
                "base_url",
                Attribute::optional_string().with_description(format!(
                    "The Sentry API root. Falls back to {}, then {}.",
                    BASE_URL_ENV, DEFAULT_BASE_URL
                )),
            )
    }

    /// Decode the provider block.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| ProviderError::Configuration(format!("invalid provider block: {}", e)))
    }

    /// Apply fallbacks from the process environment.
    pub fn resolve(self, logger: &Logger) -> Result<ResolvedConfig, ProviderError> {
        self.resolve_with(logger, |name| std::env::var(name).ok())
    }

    /// Apply fallbacks from `lookup`, which reads an environment variable.
    pub fn resolve_with<F>(self, logger: &Logger, lookup: F) -> Result<ResolvedConfig, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = self
            .token
            .filter(|t| !t.is_empty())
            .or_else(|| lookup(TOKEN_ENV).filter(|t| !t.is_empty()))
            .ok_or_else(|| {
                ProviderError::Configuration(format!(
                    "no authentication token; set 'token' or {}",
                    TOKEN_ENV
                ))
            })?;

        let base_url = match self.base_url.or_else(|| lookup(BASE_URL_ENV)) {
            Some(url) if !url.trim().is_empty() => url,
            _ => {
                logger.warningf(format_args!(
                    "No base URL was set, using default {}",
                    DEFAULT_BASE_URL
                ));
                DEFAULT_BASE_URL.to_string()
            },
        };
        logger.debugf(format_args!("Parsing base url {}", base_url));

        Ok(ResolvedConfig {
            token,
            base_url: parse_base_url(&base_url)?,
        })
    }
}

/// Parse an API root, adding the trailing `/` that relative joins depend on.
fn parse_base_url(raw: &str) -> Result<Url, ProviderError> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| ProviderError::Configuration(format!("invalid base_url '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(ProviderError::Configuration(format!(
            "invalid base_url '{}': not a hierarchical URL",
            raw
        )));
    }
    Ok(url)
}
