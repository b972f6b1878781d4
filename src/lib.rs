//! Sentry Provider
//!
//! This crate manages Sentry organizations, teams, client keys, plugins and
//! alert rules as declarative resources, driven by an infrastructure-as-code
//! host through the [`ProviderService`] trait.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **Redacting HTTP logger**: [`log_response`] writes every API exchange
//!   with `Authorization` values replaced by a placeholder
//! - **Leveled logger**: [`Logger`] emits `[LEVEL] message` lines through `tracing`
//! - **Config normalizer**: [`normalize`] turns loosely typed rule and plugin
//!   configuration into API parameters, and API responses back into stable state
//! - **API client**: the [`SentryApi`] seam, backed by [`HttpClient`] over `reqwest`
//! - **Resources**: one handler module per resource type under [`resources`]
//! - **Testing**: an in-memory [`MockSentry`](testing::MockSentry) and a
//!   [`ProviderTester`](testing::ProviderTester) harness
//!
//! # Quick Start
//!
//! ```ignore
//! use sentry_provider::{Logger, ProviderService, SentryProvider};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = SentryProvider::new(Logger::from_env());
//!     let diagnostics = provider.configure(json!({"token": "..."})).await?;
//!     if !diagnostics.is_empty() {
//!         return Err(format!("configuration rejected: {:?}", diagnostics).into());
//!     }
//!
//!     let team = provider
//!         .create("sentry_team", json!({"organization": "acme", "name": "Backend"}))
//!         .await?;
//!     println!("created team {}", team["slug"]);
//!     Ok(())
//! }
//! ```
//!
//! # Resource Types
//!
//! - `sentry_organization`: an organization (import id: slug)
//! - `sentry_team`: a team (import id: `org/team-slug`)
//! - `sentry_key`: a project client key (import id: `org/project/key-id`)
//! - `sentry_default_key`: the key Sentry creates with a project
//! - `sentry_plugin`: a legacy project plugin (import id: `org/project/plugin-id`)
//! - `sentry_rule`: an issue alert rule (import id: `org/project/rule-id`)
//!
//! Data source `sentry_organization` looks an organization up by slug.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod error;
pub mod http_client;
pub mod http_log;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use api::{ApiResponse, ApiResult, SentryApi};
pub use config::{ProviderConfig, ResolvedConfig};
pub use error::{ProviderError, ResultExt};
pub use http_client::HttpClient;
pub use http_log::{log_response, HttpExchange, REDACTED_PLACEHOLDER};
pub use logging::{LogLevel, Logger};
pub use normalize::DecodeError;
pub use provider::{ProviderService, SentryProvider};
pub use schema::ProviderSchema;
pub use types::{ImportedResource, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
