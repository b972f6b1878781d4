//! [`SentryApi`] over HTTP, using `reqwest`.
//!
//! Every call produces an [`HttpExchange`] from the request as actually
//! built (so the bearer token is visible to, and redacted by, the logger)
//! and the response as received. List endpoints follow Sentry's cursor
//! pagination through the `Link` header.

use async_trait::async_trait;
use http::header::{ACCEPT, LINK};
use http::{HeaderMap, Method, StatusCode};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::api::{ApiResponse, ApiResult, SentryApi};
use crate::error::ProviderError;
use crate::http_log::HttpExchange;
use crate::models::{
    CreateOrganizationParams, CreateProjectKeyParams, CreateRuleParams, CreateTeamParams,
    Organization, Plugin, Project, ProjectKey, Rule, Team, UpdateOrganizationParams,
    UpdateProjectKeyParams, UpdateRuleParams, UpdateTeamParams,
};

const USER_AGENT: &str = concat!("sentry-provider/", env!("CARGO_PKG_VERSION"));

/// Sentry API client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl HttpClient {
    /// Create a client for the API rooted at `base_url` (ending in `/`).
    pub fn new(base_url: Url, token: impl Into<String>) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    /// The API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Configuration(format!("invalid API path '{}': {}", path, e)))
    }

    fn build_request<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Request, ProviderError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }

    /// Send one request, returning the exchange, the raw body and the next page URL if any.
    async fn execute<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<(HttpExchange, Vec<u8>, Option<Url>), ProviderError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(method, url, body)?;
        let mut exchange = HttpExchange::new(
            request.method().clone(),
            request.url().as_str(),
            StatusCode::OK,
        )
        .with_request_headers(request.headers().clone());

        let response = self.http.execute(request).await?;
        exchange.status = response.status();
        exchange.response_headers = response.headers().clone();
        let next = next_page_url(&exchange.response_headers);
        let bytes = response.bytes().await?;
        Ok((exchange, bytes.to_vec(), next))
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let (exchange, bytes, _) = self.execute(method, url, body).await?;
        Ok(decode_response(exchange, &bytes))
    }

    /// Send a request whose response body is not used.
    async fn send_discarding<B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.url(path)?;
        let (exchange, bytes, _) = self.execute(method, url, body).await?;
        if exchange.status.is_success() {
            return Ok(ApiResponse::new(exchange, None));
        }
        Ok(decode_response(exchange, &bytes))
    }

    /// GET every page of a list endpoint.
    ///
    /// The returned exchange is the last one made.
    async fn list<T>(&self, path: &str) -> ApiResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut url = self.url(path)?;
        let mut items = Vec::new();
        loop {
            let (exchange, bytes, next) = self.execute::<()>(Method::GET, url, None).await?;
            let page: ApiResponse<Vec<T>> = decode_response(exchange, &bytes);
            if !page.is_success() || page.decode_error.is_some() {
                return Ok(page);
            }
            items.extend(page.data.unwrap_or_default());
            match next {
                Some(next) => url = next,
                None => return Ok(ApiResponse::new(page.exchange, Some(items))),
            }
        }
    }
}

/// Decode a response body against its status.
///
/// An empty 2xx body decodes to no data; a 2xx body that is not the expected
/// JSON is kept as [`ApiResponse::undecodable`].
fn decode_response<T>(exchange: HttpExchange, body: &[u8]) -> ApiResponse<T>
where
    T: DeserializeOwned,
{
    if !exchange.status.is_success() {
        return ApiResponse {
            exchange,
            data: None,
            detail: error_detail(body),
            decode_error: None,
        };
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return ApiResponse::new(exchange, None);
    }
    match serde_json::from_slice(body) {
        Ok(data) => ApiResponse::new(exchange, Some(data)),
        Err(err) => ApiResponse::undecodable(exchange, err.to_string()),
    }
}

/// Extract the `detail` message of an error body, or the raw body text.
fn error_detail(body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(detail) = value.get("detail").and_then(Value::as_str) {
            return Some(detail.to_string());
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Find the next page in a Sentry `Link` header.
///
/// Sentry always sends a `rel="next"` link; `results="true"` says whether it
/// leads anywhere.
pub fn next_page_url(headers: &HeaderMap) -> Option<Url> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(parse_link)
        .find(|(_, params)| {
            params.get("rel") == Some(&"next") && params.get("results") == Some(&"true")
        })
        .and_then(|(target, _)| Url::parse(target).ok())
}

fn parse_link(link: &str) -> Option<(&str, BTreeMap<&str, &str>)> {
    let (target, params) = link.trim().strip_prefix('<')?.split_once('>')?;
    let params = params
        .split(';')
        .filter_map(|param| {
            let (key, value) = param.trim().split_once('=')?;
            Some((key.trim(), value.trim().trim_matches('"')))
        })
        .collect();
    Some((target, params))
}

#[async_trait]
impl SentryApi for HttpClient {
    async fn get_organization(&self, slug: &str) -> ApiResult<Organization> {
        self.send::<(), _>(Method::GET, &format!("0/organizations/{}/", slug), None)
            .await
    }

    async fn create_organization(
        &self,
        params: &CreateOrganizationParams,
    ) -> ApiResult<Organization> {
        self.send(Method::POST, "0/organizations/", Some(params)).await
    }

    async fn update_organization(
        &self,
        slug: &str,
        params: &UpdateOrganizationParams,
    ) -> ApiResult<Organization> {
        self.send(Method::PUT, &format!("0/organizations/{}/", slug), Some(params))
            .await
    }

    async fn delete_organization(&self, slug: &str) -> ApiResult<()> {
        self.send_discarding::<()>(Method::DELETE, &format!("0/organizations/{}/", slug), None)
            .await
    }

    async fn get_team(&self, org: &str, slug: &str) -> ApiResult<Team> {
        self.send::<(), _>(Method::GET, &format!("0/teams/{}/{}/", org, slug), None)
            .await
    }

    async fn create_team(&self, org: &str, params: &CreateTeamParams) -> ApiResult<Team> {
        self.send(
            Method::POST,
            &format!("0/organizations/{}/teams/", org),
            Some(params),
        )
        .await
    }

    async fn update_team(
        &self,
        org: &str,
        slug: &str,
        params: &UpdateTeamParams,
    ) -> ApiResult<Team> {
        self.send(Method::PUT, &format!("0/teams/{}/{}/", org, slug), Some(params))
            .await
    }

    async fn delete_team(&self, org: &str, slug: &str) -> ApiResult<()> {
        self.send_discarding::<()>(Method::DELETE, &format!("0/teams/{}/{}/", org, slug), None)
            .await
    }

    async fn get_project(&self, org: &str, project: &str) -> ApiResult<Project> {
        self.send::<(), _>(Method::GET, &format!("0/projects/{}/{}/", org, project), None)
            .await
    }

    async fn list_project_keys(&self, org: &str, project: &str) -> ApiResult<Vec<ProjectKey>> {
        self.list(&format!("0/projects/{}/{}/keys/", org, project))
            .await
    }

    async fn create_project_key(
        &self,
        org: &str,
        project: &str,
        params: &CreateProjectKeyParams,
    ) -> ApiResult<ProjectKey> {
        self.send(
            Method::POST,
            &format!("0/projects/{}/{}/keys/", org, project),
            Some(params),
        )
        .await
    }

    async fn update_project_key(
        &self,
        org: &str,
        project: &str,
        id: &str,
        params: &UpdateProjectKeyParams,
    ) -> ApiResult<ProjectKey> {
        self.send(
            Method::PUT,
            &format!("0/projects/{}/{}/keys/{}/", org, project, id),
            Some(params),
        )
        .await
    }

    async fn delete_project_key(&self, org: &str, project: &str, id: &str) -> ApiResult<()> {
        self.send_discarding::<()>(
            Method::DELETE,
            &format!("0/projects/{}/{}/keys/{}/", org, project, id),
            None,
        )
        .await
    }

    async fn get_plugin(&self, org: &str, project: &str, id: &str) -> ApiResult<Plugin> {
        self.send::<(), _>(
            Method::GET,
            &format!("0/projects/{}/{}/plugins/{}/", org, project, id),
            None,
        )
        .await
    }

    async fn enable_plugin(&self, org: &str, project: &str, id: &str) -> ApiResult<()> {
        self.send_discarding::<()>(
            Method::POST,
            &format!("0/projects/{}/{}/plugins/{}/", org, project, id),
            None,
        )
        .await
    }

    async fn disable_plugin(&self, org: &str, project: &str, id: &str) -> ApiResult<()> {
        self.send_discarding::<()>(
            Method::DELETE,
            &format!("0/projects/{}/{}/plugins/{}/", org, project, id),
            None,
        )
        .await
    }

    async fn update_plugin(
        &self,
        org: &str,
        project: &str,
        id: &str,
        config: &BTreeMap<String, String>,
    ) -> ApiResult<Plugin> {
        self.send(
            Method::PUT,
            &format!("0/projects/{}/{}/plugins/{}/", org, project, id),
            Some(config),
        )
        .await
    }

    async fn list_rules(&self, org: &str, project: &str) -> ApiResult<Vec<Rule>> {
        self.list(&format!("0/projects/{}/{}/rules/", org, project))
            .await
    }

    async fn create_rule(
        &self,
        org: &str,
        project: &str,
        params: &CreateRuleParams,
    ) -> ApiResult<Rule> {
        self.send(
            Method::POST,
            &format!("0/projects/{}/{}/rules/", org, project),
            Some(params),
        )
        .await
    }

    async fn update_rule(
        &self,
        org: &str,
        project: &str,
        id: &str,
        params: &UpdateRuleParams,
    ) -> ApiResult<Rule> {
        self.send(
            Method::PUT,
            &format!("0/projects/{}/{}/rules/{}/", org, project, id),
            Some(params),
        )
        .await
    }

    async fn delete_rule(&self, org: &str, project: &str, id: &str) -> ApiResult<()> {
        self.send_discarding::<()>(
            Method::DELETE,
            &format!("0/projects/{}/{}/rules/{}/", org, project, id),
            None,
        )
        .await
    }
}
