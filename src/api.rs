//! The seam between resources and the Sentry web API.
//!
//! Resources never talk HTTP directly: they call a [`SentryApi`], which the
//! provider backs with [`HttpClient`](crate::http_client::HttpClient) and
//! tests back with [`MockSentry`](crate::testing::MockSentry).
//!
//! A call that reached the server returns `Ok` whatever the status; the
//! caller decides what a 404 means through [`ApiResponse::check`]. A 2xx body
//! that does not decode is also kept as a response, so it can still be logged.
//! `Err` is reserved for transport failures.

use async_trait::async_trait;
use http::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ProviderError;
use crate::http_log::{log_response, HttpExchange};
use crate::logging::{LogLevel, Logger};
use crate::models::{
    CreateOrganizationParams, CreateProjectKeyParams, CreateRuleParams, CreateTeamParams,
    Organization, Plugin, Project, ProjectKey, Rule, Team, UpdateOrganizationParams,
    UpdateProjectKeyParams, UpdateRuleParams, UpdateTeamParams,
};

/// Result of one API call: the exchange and its decoded body.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// The completed exchange.
    pub exchange: HttpExchange,
    /// Decoded body; `None` for an empty body or an error response.
    pub data: Option<T>,
    /// `detail` message of an error response.
    pub detail: Option<String>,
    /// Why a 2xx body could not be decoded.
    pub decode_error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying `data`.
    pub fn new(exchange: HttpExchange, data: Option<T>) -> Self {
        Self {
            exchange,
            data,
            detail: None,
            decode_error: None,
        }
    }

    /// An error response carrying the server's detail message.
    pub fn failure(exchange: HttpExchange, detail: impl Into<String>) -> Self {
        Self {
            exchange,
            data: None,
            detail: Some(detail.into()),
            decode_error: None,
        }
    }

    /// A 2xx response whose body did not decode.
    pub fn undecodable(exchange: HttpExchange, error: impl Into<String>) -> Self {
        Self {
            exchange,
            data: None,
            detail: None,
            decode_error: Some(error.into()),
        }
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.exchange.status
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.exchange.status.is_success()
    }

    /// Whether the status is 404.
    pub fn is_not_found(&self) -> bool {
        self.exchange.status == StatusCode::NOT_FOUND
    }

    /// Turn a non-2xx status into an error, keeping the body otherwise.
    ///
    /// 404 becomes [`ProviderError::NotFound`]; other failures and
    /// undecodable bodies become [`ProviderError::Api`].
    pub fn check(self) -> Result<Option<T>, ProviderError> {
        if let Some(error) = self.decode_error {
            return Err(ProviderError::Api {
                status: self.exchange.status.as_u16(),
                message: format!("invalid response body from {}: {}", self.exchange.url, error),
            });
        }
        if self.is_success() {
            return Ok(self.data);
        }

        let message = self.detail.unwrap_or_else(|| {
            self.exchange
                .status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
        if self.exchange.status == StatusCode::NOT_FOUND {
            Err(ProviderError::NotFound(format!("{} ({})", message, self.exchange.url)))
        } else {
            Err(ProviderError::Api {
                status: self.exchange.status.as_u16(),
                message,
            })
        }
    }

    /// Like [`check`](Self::check), requiring a body.
    pub fn into_value(self) -> Result<T, ProviderError> {
        let url = self.exchange.url.clone();
        let status = self.exchange.status.as_u16();
        self.check()?.ok_or_else(|| ProviderError::Api {
            status,
            message: format!("empty response body from {}", url),
        })
    }
}

impl<T: Serialize + fmt::Debug> ApiResponse<T> {
    /// Write the exchange and body to `logger` at [`LogLevel::Trace`].
    pub fn log(&self, logger: &Logger) -> &Self {
        log_response(logger, &self.exchange, &self.data, LogLevel::Trace);
        self
    }
}

/// Result of an API call.
pub type ApiResult<T> = Result<ApiResponse<T>, ProviderError>;

/// Operations on the Sentry web API used by the resources.
#[async_trait]
pub trait SentryApi: Send + Sync {
    /// Get an organization by slug.
    async fn get_organization(&self, slug: &str) -> ApiResult<Organization>;

    /// Create an organization.
    async fn create_organization(
        &self,
        params: &CreateOrganizationParams,
    ) -> ApiResult<Organization>;

    /// Update an organization.
    async fn update_organization(
        &self,
        slug: &str,
        params: &UpdateOrganizationParams,
    ) -> ApiResult<Organization>;

    /// Delete an organization.
    async fn delete_organization(&self, slug: &str) -> ApiResult<()>;

    /// Get a team.
    async fn get_team(&self, org: &str, slug: &str) -> ApiResult<Team>;

    /// Create a team.
    async fn create_team(&self, org: &str, params: &CreateTeamParams) -> ApiResult<Team>;

    /// Update a team.
    async fn update_team(
        &self,
        org: &str,
        slug: &str,
        params: &UpdateTeamParams,
    ) -> ApiResult<Team>;

    /// Delete a team.
    async fn delete_team(&self, org: &str, slug: &str) -> ApiResult<()>;

    /// Get a project.
    async fn get_project(&self, org: &str, project: &str) -> ApiResult<Project>;

    /// List the client keys of a project, all pages.
    async fn list_project_keys(&self, org: &str, project: &str) -> ApiResult<Vec<ProjectKey>>;

    /// Create a client key.
    async fn create_project_key(
        &self,
        org: &str,
        project: &str,
        params: &CreateProjectKeyParams,
    ) -> ApiResult<ProjectKey>;

    /// Update a client key.
    async fn update_project_key(
        &self,
        org: &str,
        project: &str,
        id: &str,
        params: &UpdateProjectKeyParams,
    ) -> ApiResult<ProjectKey>;

    /// Delete a client key.
    async fn delete_project_key(&self, org: &str, project: &str, id: &str) -> ApiResult<()>;

    /// Get a project plugin.
    async fn get_plugin(&self, org: &str, project: &str, id: &str) -> ApiResult<Plugin>;

    /// Enable a project plugin.
    async fn enable_plugin(&self, org: &str, project: &str, id: &str) -> ApiResult<()>;

    /// Disable a project plugin.
    async fn disable_plugin(&self, org: &str, project: &str, id: &str) -> ApiResult<()>;

    /// Replace the options of a project plugin.
    async fn update_plugin(
        &self,
        org: &str,
        project: &str,
        id: &str,
        config: &BTreeMap<String, String>,
    ) -> ApiResult<Plugin>;

    /// List the alert rules of a project, all pages.
    async fn list_rules(&self, org: &str, project: &str) -> ApiResult<Vec<Rule>>;

    /// Create an alert rule.
    async fn create_rule(
        &self,
        org: &str,
        project: &str,
        params: &CreateRuleParams,
    ) -> ApiResult<Rule>;

    /// Update an alert rule.
    async fn update_rule(
        &self,
        org: &str,
        project: &str,
        id: &str,
        params: &UpdateRuleParams,
    ) -> ApiResult<Rule>;

    /// Delete an alert rule.
    async fn delete_rule(&self, org: &str, project: &str, id: &str) -> ApiResult<()>;
}
