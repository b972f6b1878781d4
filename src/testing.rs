//! Testing utilities for the Sentry provider.
//!
//! This module provides an in-memory [`MockSentry`] implementing
//! [`SentryApi`], a [`LogCapture`] sink for asserting on log output, and a
//! [`ProviderTester`] harness to drive a [`ProviderService`] the way a host
//! would.
//!
//! # Example
//!
//! ```ignore
//! use sentry_provider::testing::{LogCapture, MockSentry, ProviderTester};
//! use sentry_provider::SentryProvider;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_create_team() {
//!     let api = Arc::new(MockSentry::new());
//!     let provider = SentryProvider::with_api(api.clone(), LogCapture::new().logger());
//!     let tester = ProviderTester::new(provider);
//!
//!     let state = tester
//!         .create("sentry_team", json!({"organization": "acme", "name": "Backend"}))
//!         .await
//!         .unwrap();
//!
//!     assert_eq!(state["slug"], "backend");
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_subscriber::fmt::MakeWriter;

use crate::api::{ApiResponse, ApiResult, SentryApi};
use crate::error::ProviderError;
use crate::http_log::HttpExchange;
use crate::logging::Logger;
use crate::models::{
    CreateOrganizationParams, CreateProjectKeyParams, CreateRuleParams, CreateTeamParams, Dsn,
    Organization, Plugin, PluginConfigEntry, Project, ProjectKey, Rule, Team,
    UpdateOrganizationParams, UpdateProjectKeyParams, UpdateRuleParams, UpdateTeamParams,
};
use crate::provider::ProviderService;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::types::ImportedResource;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =========================================================================
// Log Capture
// =========================================================================

/// In-memory log sink.
///
/// Clones share the same buffer, so a clone can be handed to a [`Logger`]
/// while the original is used to read what was written.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Create an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger writing every level into this capture.
    pub fn logger(&self) -> Logger {
        Logger::new(self.clone())
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.buffer)).into_owned()
    }

    /// Discard everything written so far.
    pub fn clear(&self) {
        lock(&self.buffer).clear();
    }
}

/// Writer handed out by [`LogCapture`].
#[derive(Debug)]
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.buffer).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

// =========================================================================
// Mock Sentry
// =========================================================================

/// A request received by [`MockSentry`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method the call maps to.
    pub method: Method,
    /// Path relative to the API root, e.g. `0/projects/acme/web/keys/`.
    pub path: String,
    /// JSON body, if the call sends one.
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct MockPlugin {
    enabled: bool,
    options: BTreeMap<String, Value>,
}

type ProjectId = (String, String);

#[derive(Debug, Default)]
struct MockState {
    organizations: BTreeMap<String, Organization>,
    teams: BTreeMap<ProjectId, Team>,
    projects: BTreeSet<ProjectId>,
    keys: BTreeMap<ProjectId, Vec<ProjectKey>>,
    plugins: BTreeMap<(String, String, String), MockPlugin>,
    rules: BTreeMap<ProjectId, Vec<Rule>>,
    requests: Vec<RecordedRequest>,
    failure: Option<(StatusCode, String)>,
    sequence: u64,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Creation time of the next object: one second per id from 2024-01-01.
    fn clock(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(1_704_067_200 + self.sequence as i64, 0).unwrap_or_default()
    }

    fn has_project(&self, org: &str, project: &str) -> bool {
        self.projects.contains(&(org.to_string(), project.to_string()))
    }

    fn seed_project(&mut self, org: &str, project: &str) {
        self.projects.insert((org.to_string(), project.to_string()));
    }

    fn new_key(
        &mut self,
        org: &str,
        project: &str,
        name: &str,
        date_created: DateTime<Utc>,
    ) -> ProjectKey {
        let n = self.next_id();
        let public = format!("{:032x}", n);
        let secret = format!("{:032x}", n + 0x5ec);
        let project_id = self
            .projects
            .iter()
            .position(|(o, p)| o == org && p == project)
            .map_or(0, |i| i as i64 + 1);
        let host = format!("o1.ingest.sentry.test/{}", project_id);
        ProjectKey {
            id: public.clone(),
            name: name.to_string(),
            dsn: Dsn {
                secret: format!("https://{}:{}@{}", public, secret, host),
                public: format!("https://{}@{}", public, host),
                csp: format!("https://{}/csp-report/?sentry_key={}", host, public),
            },
            public,
            secret,
            project_id,
            is_active: true,
            rate_limit: None,
            date_created,
        }
    }
}

/// In-memory Sentry.
///
/// Every call is recorded (see [`requests`](Self::requests)) and produces an
/// [`HttpExchange`] carrying the same headers a real request would, including
/// the bearer [`TOKEN`](Self::TOKEN).
#[derive(Debug, Default)]
pub struct MockSentry {
    state: Mutex<MockState>,
}

impl MockSentry {
    /// Token placed in the `Authorization` header of every exchange.
    pub const TOKEN: &'static str = "4f8e0c1d2b3a49f6a7e8d9c0b1a2f3e4";

    const AUTHORIZATION: &'static str = "Bearer 4f8e0c1d2b3a49f6a7e8d9c0b1a2f3e4";

    /// API root used in exchange URLs.
    pub const BASE_URL: &'static str = "https://sentry.test/api/";

    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Answer the next call with `status` and `detail`, whatever it is.
    pub fn fail_next(&self, status: StatusCode, detail: impl Into<String>) {
        lock(&self.state).failure = Some((status, detail.into()));
    }

    /// Add an organization.
    pub fn seed_organization(&self, slug: &str, name: &str) {
        let mut state = lock(&self.state);
        let id = state.next_id().to_string();
        state.organizations.insert(
            slug.to_string(),
            Organization {
                id,
                slug: slug.to_string(),
                name: name.to_string(),
            },
        );
    }

    /// Add a team.
    pub fn seed_team(&self, org: &str, slug: &str, name: &str) {
        let mut state = lock(&self.state);
        let id = state.next_id().to_string();
        state.teams.insert(
            (org.to_string(), slug.to_string()),
            Team {
                id,
                slug: slug.to_string(),
                name: name.to_string(),
                has_access: true,
                is_pending: false,
                is_member: true,
            },
        );
    }

    /// Add an empty project.
    pub fn seed_project(&self, org: &str, project: &str) {
        lock(&self.state).seed_project(org, project);
    }

    /// Add a client key to a project, creating the project if needed.
    ///
    /// `date_created` is RFC 3339; anything else seeds the Unix epoch.
    /// Returns the key id.
    pub fn seed_key(&self, org: &str, project: &str, name: &str, date_created: &str) -> String {
        let mut state = lock(&self.state);
        state.seed_project(org, project);
        let date_created = date_created.parse::<DateTime<Utc>>().unwrap_or_default();
        let key = state.new_key(org, project, name, date_created);
        let id = key.id.clone();
        state
            .keys
            .entry((org.to_string(), project.to_string()))
            .or_default()
            .push(key);
        id
    }

    /// Number of client keys of a project.
    pub fn key_count(&self, org: &str, project: &str) -> usize {
        lock(&self.state)
            .keys
            .get(&(org.to_string(), project.to_string()))
            .map_or(0, Vec::len)
    }

    /// Add an enabled plugin with the given options, creating the project if needed.
    pub fn seed_plugin(&self, org: &str, project: &str, id: &str, options: &[(&str, Value)]) {
        let mut state = lock(&self.state);
        state.seed_project(org, project);
        state.plugins.insert(
            (org.to_string(), project.to_string(), id.to_string()),
            MockPlugin {
                enabled: true,
                options: options
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            },
        );
    }

    /// Whether a plugin is currently enabled.
    pub fn plugin_enabled(&self, org: &str, project: &str, id: &str) -> bool {
        lock(&self.state)
            .plugins
            .get(&(org.to_string(), project.to_string(), id.to_string()))
            .map_or(false, |plugin| plugin.enabled)
    }

    /// A stored rule, in the shape Sentry returns it.
    pub fn rule(&self, id: &str) -> Option<Rule> {
        lock(&self.state)
            .rules
            .values()
            .flatten()
            .find(|rule| rule.id == id)
            .cloned()
    }

    fn exchange(method: Method, path: &str, status: StatusCode) -> HttpExchange {
        let mut request = HeaderMap::new();
        request.insert(AUTHORIZATION, HeaderValue::from_static(Self::AUTHORIZATION));
        request.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut response = HeaderMap::new();
        response.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        HttpExchange::new(method, format!("{}{}", Self::BASE_URL, path), status)
            .with_request_headers(request)
            .with_response_headers(response)
    }

    /// Record a call and answer it from `handler`; `None` means 404.
    fn call<B, T, F>(&self, method: Method, path: String, body: Option<&B>, handler: F) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        F: FnOnce(&mut MockState) -> Option<T>,
    {
        let body = body.map(serde_json::to_value).transpose()?;
        let mut state = lock(&self.state);
        state.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            body,
        });

        if let Some((status, detail)) = state.failure.take() {
            return Ok(ApiResponse::failure(Self::exchange(method, &path, status), detail));
        }

        let success = match method {
            Method::POST => StatusCode::CREATED,
            Method::DELETE => StatusCode::NO_CONTENT,
            _ => StatusCode::OK,
        };
        match handler(&mut *state) {
            Some(data) => {
                let data = (success != StatusCode::NO_CONTENT).then_some(data);
                Ok(ApiResponse::new(Self::exchange(method, &path, success), data))
            },
            None => Ok(ApiResponse::failure(
                Self::exchange(method, &path, StatusCode::NOT_FOUND),
                "The requested resource does not exist",
            )),
        }
    }
}

/// Derive a slug from a display name the way Sentry does for teams and organizations.
fn slugify(name: &str) -> String {
    let mut slug = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Sentry stores numeric rule values as numbers whatever type they were sent as.
fn stored_components<T: Serialize>(components: &[T]) -> Vec<Map<String, Value>> {
    components
        .iter()
        .filter_map(|component| match serde_json::to_value(component) {
            Ok(Value::Object(mut map)) => {
                if let Some(Value::String(s)) = map.get("value") {
                    if let Ok(n) = s.parse::<i64>() {
                        map.insert("value".to_string(), Value::from(n));
                    }
                }
                Some(map)
            },
            _ => None,
        })
        .collect()
}

fn stored_rule(id: String, params: &CreateRuleParams, date_created: DateTime<Utc>) -> Rule {
    Rule {
        id,
        name: params.name.clone(),
        action_match: params.action_match.clone(),
        filter_match: params.filter_match.clone(),
        frequency: params.frequency,
        environment: params.environment.clone(),
        conditions: stored_components(&params.conditions),
        actions: stored_components(&params.actions),
        filters: stored_components(&params.filters),
        date_created,
    }
}

fn plugin_view(id: &str, plugin: &MockPlugin) -> Plugin {
    Plugin {
        id: id.to_string(),
        name: id.to_string(),
        enabled: plugin.enabled,
        config: plugin
            .options
            .iter()
            .map(|(name, value)| PluginConfigEntry {
                name: name.clone(),
                value: value.clone(),
            })
            .collect(),
    }
}

#[async_trait]
impl SentryApi for MockSentry {
    async fn get_organization(&self, slug: &str) -> ApiResult<Organization> {
        self.call::<(), _, _>(Method::GET, format!("0/organizations/{}/", slug), None, |state| {
            state.organizations.get(slug).cloned()
        })
    }

    async fn create_organization(
        &self,
        params: &CreateOrganizationParams,
    ) -> ApiResult<Organization> {
        self.call(Method::POST, "0/organizations/".to_string(), Some(params), |state| {
            let slug = if params.slug.is_empty() {
                slugify(&params.name)
            } else {
                params.slug.clone()
            };
            let org = Organization {
                id: state.next_id().to_string(),
                slug: slug.clone(),
                name: params.name.clone(),
            };
            state.organizations.insert(slug, org.clone());
            Some(org)
        })
    }

    async fn update_organization(
        &self,
        slug: &str,
        params: &UpdateOrganizationParams,
    ) -> ApiResult<Organization> {
        self.call(Method::PUT, format!("0/organizations/{}/", slug), Some(params), |state| {
            let mut org = state.organizations.remove(slug)?;
            org.name = params.name.clone();
            if !params.slug.is_empty() {
                org.slug = params.slug.clone();
            }
            state.organizations.insert(org.slug.clone(), org.clone());
            Some(org)
        })
    }

    async fn delete_organization(&self, slug: &str) -> ApiResult<()> {
        self.call::<(), _, _>(Method::DELETE, format!("0/organizations/{}/", slug), None, |state| {
            state.organizations.remove(slug).map(|_| ())
        })
    }

    async fn get_team(&self, org: &str, slug: &str) -> ApiResult<Team> {
        self.call::<(), _, _>(Method::GET, format!("0/teams/{}/{}/", org, slug), None, |state| {
            state.teams.get(&(org.to_string(), slug.to_string())).cloned()
        })
    }

    async fn create_team(&self, org: &str, params: &CreateTeamParams) -> ApiResult<Team> {
        self.call(
            Method::POST,
            format!("0/organizations/{}/teams/", org),
            Some(params),
            |state| {
                let slug = if params.slug.is_empty() {
                    slugify(&params.name)
                } else {
                    params.slug.clone()
                };
                let team = Team {
                    id: state.next_id().to_string(),
                    slug: slug.clone(),
                    name: params.name.clone(),
                    has_access: true,
                    is_pending: false,
                    is_member: true,
                };
                state.teams.insert((org.to_string(), slug), team.clone());
                Some(team)
            },
        )
    }

    async fn update_team(
        &self,
        org: &str,
        slug: &str,
        params: &UpdateTeamParams,
    ) -> ApiResult<Team> {
        self.call(Method::PUT, format!("0/teams/{}/{}/", org, slug), Some(params), |state| {
            let mut team = state.teams.remove(&(org.to_string(), slug.to_string()))?;
            team.name = params.name.clone();
            if !params.slug.is_empty() {
                team.slug = params.slug.clone();
            }
            state
                .teams
                .insert((org.to_string(), team.slug.clone()), team.clone());
            Some(team)
        })
    }

    async fn delete_team(&self, org: &str, slug: &str) -> ApiResult<()> {
        self.call::<(), _, _>(Method::DELETE, format!("0/teams/{}/{}/", org, slug), None, |state| {
            state.teams.remove(&(org.to_string(), slug.to_string())).map(|_| ())
        })
    }

    async fn get_project(&self, org: &str, project: &str) -> ApiResult<Project> {
        self.call::<(), _, _>(
            Method::GET,
            format!("0/projects/{}/{}/", org, project),
            None,
            |state| {
                let index = state
                    .projects
                    .iter()
                    .position(|(o, p)| o == org && p == project)?;
                Some(Project {
                    id: (index + 1).to_string(),
                    slug: project.to_string(),
                    name: project.to_string(),
                })
            },
        )
    }

    async fn list_project_keys(&self, org: &str, project: &str) -> ApiResult<Vec<ProjectKey>> {
        self.call::<(), _, _>(
            Method::GET,
            format!("0/projects/{}/{}/keys/", org, project),
            None,
            |state| {
                if !state.has_project(org, project) {
                    return None;
                }
                Some(
                    state
                        .keys
                        .get(&(org.to_string(), project.to_string()))
                        .cloned()
                        .unwrap_or_default(),
                )
            },
        )
    }

    async fn create_project_key(
        &self,
        org: &str,
        project: &str,
        params: &CreateProjectKeyParams,
    ) -> ApiResult<ProjectKey> {
        self.call(
            Method::POST,
            format!("0/projects/{}/{}/keys/", org, project),
            Some(params),
            |state| {
                if !state.has_project(org, project) {
                    return None;
                }
                let date_created = state.clock();
                let mut key = state.new_key(org, project, &params.name, date_created);
                key.rate_limit = params.rate_limit;
                state
                    .keys
                    .entry((org.to_string(), project.to_string()))
                    .or_default()
                    .push(key.clone());
                Some(key)
            },
        )
    }

    async fn update_project_key(
        &self,
        org: &str,
        project: &str,
        id: &str,
        params: &UpdateProjectKeyParams,
    ) -> ApiResult<ProjectKey> {
        self.call(
            Method::PUT,
            format!("0/projects/{}/{}/keys/{}/", org, project, id),
            Some(params),
            |state| {
                let key = state
                    .keys
                    .get_mut(&(org.to_string(), project.to_string()))?
                    .iter_mut()
                    .find(|key| key.id == id)?;
                key.name = params.name.clone();
                if params.rate_limit.is_some() {
                    key.rate_limit = params.rate_limit;
                }
                Some(key.clone())
            },
        )
    }

    async fn delete_project_key(&self, org: &str, project: &str, id: &str) -> ApiResult<()> {
        self.call::<(), _, _>(
            Method::DELETE,
            format!("0/projects/{}/{}/keys/{}/", org, project, id),
            None,
            |state| {
                let keys = state.keys.get_mut(&(org.to_string(), project.to_string()))?;
                let index = keys.iter().position(|key| key.id == id)?;
                keys.remove(index);
                Some(())
            },
        )
    }

    async fn get_plugin(&self, org: &str, project: &str, id: &str) -> ApiResult<Plugin> {
        self.call::<(), _, _>(
            Method::GET,
            format!("0/projects/{}/{}/plugins/{}/", org, project, id),
            None,
            |state| {
                state
                    .plugins
                    .get(&(org.to_string(), project.to_string(), id.to_string()))
                    .map(|plugin| plugin_view(id, plugin))
            },
        )
    }

    async fn enable_plugin(&self, org: &str, project: &str, id: &str) -> ApiResult<()> {
        self.call::<(), _, _>(
            Method::POST,
            format!("0/projects/{}/{}/plugins/{}/", org, project, id),
            None,
            |state| {
                if !state.has_project(org, project) {
                    return None;
                }
                state
                    .plugins
                    .entry((org.to_string(), project.to_string(), id.to_string()))
                    .or_default()
                    .enabled = true;
                Some(())
            },
        )
    }

    async fn disable_plugin(&self, org: &str, project: &str, id: &str) -> ApiResult<()> {
        self.call::<(), _, _>(
            Method::DELETE,
            format!("0/projects/{}/{}/plugins/{}/", org, project, id),
            None,
            |state| {
                state
                    .plugins
                    .get_mut(&(org.to_string(), project.to_string(), id.to_string()))?
                    .enabled = false;
                Some(())
            },
        )
    }

    async fn update_plugin(
        &self,
        org: &str,
        project: &str,
        id: &str,
        config: &BTreeMap<String, String>,
    ) -> ApiResult<Plugin> {
        self.call(
            Method::PUT,
            format!("0/projects/{}/{}/plugins/{}/", org, project, id),
            Some(config),
            |state| {
                let plugin = state
                    .plugins
                    .get_mut(&(org.to_string(), project.to_string(), id.to_string()))?;
                for (key, value) in config {
                    plugin.options.insert(key.clone(), Value::String(value.clone()));
                }
                Some(plugin_view(id, plugin))
            },
        )
    }

    async fn list_rules(&self, org: &str, project: &str) -> ApiResult<Vec<Rule>> {
        self.call::<(), _, _>(
            Method::GET,
            format!("0/projects/{}/{}/rules/", org, project),
            None,
            |state| {
                if !state.has_project(org, project) {
                    return None;
                }
                Some(
                    state
                        .rules
                        .get(&(org.to_string(), project.to_string()))
                        .cloned()
                        .unwrap_or_default(),
                )
            },
        )
    }

    async fn create_rule(
        &self,
        org: &str,
        project: &str,
        params: &CreateRuleParams,
    ) -> ApiResult<Rule> {
        self.call(
            Method::POST,
            format!("0/projects/{}/{}/rules/", org, project),
            Some(params),
            |state| {
                if !state.has_project(org, project) {
                    return None;
                }
                let id = state.next_id().to_string();
                let rule = stored_rule(id, params, state.clock());
                state
                    .rules
                    .entry((org.to_string(), project.to_string()))
                    .or_default()
                    .push(rule.clone());
                Some(rule)
            },
        )
    }

    async fn update_rule(
        &self,
        org: &str,
        project: &str,
        id: &str,
        params: &UpdateRuleParams,
    ) -> ApiResult<Rule> {
        self.call(
            Method::PUT,
            format!("0/projects/{}/{}/rules/{}/", org, project, id),
            Some(params),
            |state| {
                let rule = state
                    .rules
                    .get_mut(&(org.to_string(), project.to_string()))?
                    .iter_mut()
                    .find(|rule| rule.id == id)?;
                *rule = stored_rule(id.to_string(), params, rule.date_created);
                Some(rule.clone())
            },
        )
    }

    async fn delete_rule(&self, org: &str, project: &str, id: &str) -> ApiResult<()> {
        self.call::<(), _, _>(
            Method::DELETE,
            format!("0/projects/{}/{}/rules/{}/", org, project, id),
            None,
            |state| {
                let rules = state.rules.get_mut(&(org.to_string(), project.to_string()))?;
                let index = rules.iter().position(|rule| rule.id == id)?;
                rules.remove(index);
                Some(())
            },
        )
    }
}

// =========================================================================
// Provider Tester
// =========================================================================

/// A test harness for provider implementations.
///
/// This wraps a [`ProviderService`] and provides simplified methods that
/// turn error diagnostics into a [`TestError`].
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of resource type names.
    pub fn resource_types(&self) -> Vec<String> {
        self.provider.metadata().resources
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate provider configuration.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource configuration.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Create a new resource.
    pub async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Read the current state of a resource; `None` if it is gone.
    pub async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Update an existing resource.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import an existing resource.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Read data from a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    // =========================================================================
    // Lifecycle Helpers
    // =========================================================================

    /// Run a full CRUD lifecycle: create → read → update → read → delete.
    ///
    /// Returns the state read after the update (before delete).
    pub async fn lifecycle_crud(
        &self,
        resource_type: &str,
        initial_config: Value,
        updated_config: Value,
    ) -> Result<Value, ProviderError> {
        let created = self.create(resource_type, initial_config).await?;
        let created = self.read_existing(resource_type, created).await?;

        let updated = self
            .update(resource_type, created, updated_config)
            .await?;
        let updated = self.read_existing(resource_type, updated).await?;

        self.delete(resource_type, updated.clone()).await?;
        Ok(updated)
    }

    async fn read_existing(&self, resource_type: &str, state: Value) -> Result<Value, ProviderError> {
        self.read(resource_type, state).await?.ok_or_else(|| {
            ProviderError::NotFound(format!("{} disappeared during the lifecycle", resource_type))
        })
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

/// Check diagnostics and return an error if there are any errors.
fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics
        .into_iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics
        .iter()
        .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
        .collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    let has_errors = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error));

    assert!(has_errors, "Expected at least one error, but got none");
}

/// Assert that diagnostics contain an error with the given summary substring.
///
/// # Panics
///
/// Panics if no error diagnostic contains the given substring.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| matches!(d.severity, DiagnosticSeverity::Error) && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| matches!(d.severity, DiagnosticSeverity::Error))
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
