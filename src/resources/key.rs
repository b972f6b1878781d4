//! `sentry_key`: a client key (DSN) of a project.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_state, encode_state, found, vanished, Ctx};
use crate::error::{ProviderError, ResultExt};
use crate::models::{CreateProjectKeyParams, ProjectKey, RateLimit, UpdateProjectKeyParams};
use crate::schema::{Attribute, Schema};
use crate::types::split_import_id;

/// Resource type name.
pub const NAME: &str = "sentry_key";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct KeyState {
    pub(crate) id: String,
    pub(crate) organization: String,
    pub(crate) project: String,
    pub(crate) name: String,
    pub(crate) public: String,
    pub(crate) secret: String,
    pub(crate) project_id: i64,
    pub(crate) is_active: bool,
    pub(crate) rate_limit_window: Option<i64>,
    pub(crate) rate_limit_count: Option<i64>,
    pub(crate) dsn_secret: String,
    pub(crate) dsn_public: String,
    pub(crate) dsn_csp: String,
}

impl KeyState {
    /// Rate limit to send; unlimited when neither half is configured.
    pub(crate) fn rate_limit(&self) -> Option<RateLimit> {
        if self.rate_limit_window.is_none() && self.rate_limit_count.is_none() {
            return None;
        }
        Some(RateLimit {
            window: self.rate_limit_window.unwrap_or_default(),
            count: self.rate_limit_count.unwrap_or_default(),
        })
    }

    fn apply(&mut self, key: ProjectKey) {
        self.id = key.id;
        self.name = key.name;
        self.public = key.public;
        self.secret = key.secret;
        self.project_id = key.project_id;
        self.is_active = key.is_active;
        if let Some(rate_limit) = key.rate_limit {
            self.rate_limit_window = Some(rate_limit.window);
            self.rate_limit_count = Some(rate_limit.count);
        }
        self.dsn_secret = key.dsn.secret;
        self.dsn_public = key.dsn.public;
        self.dsn_csp = key.dsn.csp;
    }
}

/// Schema of the resource.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("A client key of a Sentry project.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "organization",
            Attribute::required_string()
                .with_description("The slug of the organization the key should be created for")
                .with_force_new(),
        )
        .with_attribute(
            "project",
            Attribute::required_string()
                .with_description("The slug of the project the key should be created for")
                .with_force_new(),
        )
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The name of the key"),
        )
        .with_attribute("public", Attribute::computed_string())
        .with_attribute("secret", Attribute::computed_string().sensitive())
        .with_attribute("project_id", Attribute::computed_int64())
        .with_attribute("is_active", Attribute::computed_bool())
        .with_attribute("rate_limit_window", Attribute::optional_computed_int64())
        .with_attribute("rate_limit_count", Attribute::optional_computed_int64())
        .with_attribute("dsn_secret", Attribute::computed_string().sensitive())
        .with_attribute("dsn_public", Attribute::computed_string())
        .with_attribute("dsn_csp", Attribute::computed_string())
}

/// Create the key after checking that the project exists.
pub async fn create(ctx: &Ctx<'_>, planned: Value) -> Result<Value, ProviderError> {
    let mut state: KeyState = decode_state(&planned)?;
    let (org, project) = (state.organization.clone(), state.project.clone());

    let context = || format!("creating {} {} in {}/{}", NAME, state.name, org, project);
    let response = ctx
        .api
        .get_project(&org, &project)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    if found(response.into_value())
        .with_context(context)?
        .is_none()
    {
        return Err(ProviderError::NotFound(format!("project \"{}\"", project))
            .context(context()));
    }

    let params = CreateProjectKeyParams {
        name: state.name.clone(),
        rate_limit: state.rate_limit(),
    };
    ctx.log.debugf(format_args!(
        "Creating Sentry key named {} in org {} for project {}",
        params.name, org, project
    ));
    let response = ctx
        .api
        .create_project_key(&org, &project, &params)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let key = response.into_value().with_context(context)?;
    ctx.log.debugf(format_args!(
        "Created Sentry key named {} in org {} for project {}",
        key.name, org, project
    ));

    state.id = key.id;
    read_back(ctx, state).await
}

/// Refresh the key; `None` when the project no longer lists it.
pub async fn read(ctx: &Ctx<'_>, current: Value) -> Result<Option<Value>, ProviderError> {
    let state: KeyState = decode_state(&current)?;
    match read_state(ctx, state).await? {
        Some(state) => Ok(Some(encode_state(&state)?)),
        None => Ok(None),
    }
}

pub(crate) async fn read_state(
    ctx: &Ctx<'_>,
    mut state: KeyState,
) -> Result<Option<KeyState>, ProviderError> {
    let id = state.id.clone();
    let (org, project) = (state.organization.clone(), state.project.clone());

    let context = || format!("reading {} {} in {}/{}", NAME, id, org, project);
    ctx.log.debugf(format_args!(
        "Reading Sentry key with ID {} in org {} for project {}",
        id, org, project
    ));
    let response = ctx
        .api
        .list_project_keys(&org, &project)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let Some(keys) = found(response.into_value()).with_context(context)? else {
        return Ok(None);
    };

    match keys.into_iter().find(|key| key.id == id) {
        Some(key) => {
            ctx.log.debugf(format_args!("Read the Sentry key with ID {}", id));
            state.apply(key);
            Ok(Some(state))
        },
        None => {
            ctx.log.debugf(format_args!("Sentry key with ID {} could not be found", id));
            Ok(None)
        },
    }
}

pub(crate) async fn read_back(ctx: &Ctx<'_>, state: KeyState) -> Result<Value, ProviderError> {
    let id = state.id.clone();
    let state = read_state(ctx, state)
        .await?
        .ok_or_else(|| vanished(NAME, &id))?;
    encode_state(&state)
}

/// Rename the key or change its rate limit.
pub async fn update(ctx: &Ctx<'_>, prior: Value, planned: Value) -> Result<Value, ProviderError> {
    let prior: KeyState = decode_state(&prior)?;
    let mut state: KeyState = decode_state(&planned)?;
    state.id = prior.id;
    update_key(ctx, state).await
}

/// Send `state`'s name and rate limit to the key it identifies, then read it back.
pub(crate) async fn update_key(ctx: &Ctx<'_>, mut state: KeyState) -> Result<Value, ProviderError> {
    let id = state.id.clone();
    let (org, project) = (state.organization.clone(), state.project.clone());
    let params = UpdateProjectKeyParams {
        name: state.name.clone(),
        rate_limit: state.rate_limit(),
    };

    let context = || format!("updating {} {} in {}/{}", NAME, id, org, project);
    ctx.log.debugf(format_args!("Updating Sentry key with ID {}", id));
    let response = ctx
        .api
        .update_project_key(&org, &project, &id, &params)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let key = response.into_value().with_context(context)?;
    ctx.log.debugf(format_args!("Updated Sentry key ID to {}", key.id));

    state.id = key.id;
    read_back(ctx, state).await
}

/// Delete the key.
pub async fn delete(ctx: &Ctx<'_>, current: Value) -> Result<(), ProviderError> {
    let state: KeyState = decode_state(&current)?;
    let (id, org, project) = (state.id, state.organization, state.project);

    let context = || format!("deleting {} {} in {}/{}", NAME, id, org, project);
    ctx.log.debugf(format_args!("Deleting Sentry key with ID {}", id));
    let response = ctx
        .api
        .delete_project_key(&org, &project, &id)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    response.check().with_context(context)?;
    ctx.log.debugf(format_args!("Deleted Sentry key with ID {}", id));
    Ok(())
}

/// Import from `organization/project/key-id`.
pub async fn import(ctx: &Ctx<'_>, id: &str) -> Result<Value, ProviderError> {
    let parts = split_import_id(id, &["organization", "project", "key-id"])?;
    let state = KeyState {
        id: parts[2].to_string(),
        organization: parts[0].to_string(),
        project: parts[1].to_string(),
        ..Default::default()
    };
    read_state(ctx, state)
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("key {}", id)))
        .and_then(|state| encode_state(&state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LogCapture, MockSentry};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_checks_project_first() {
        let api = MockSentry::new();
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let err = create(
            &ctx,
            json!({"organization": "acme", "project": "missing", "name": "ci"}),
        )
        .await
        .unwrap_err();

        assert!(err.is_not_found());
        assert!(err
            .to_string()
            .starts_with("creating sentry_key ci in acme/missing: "));
        assert!(err.to_string().contains("project \"missing\""));
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_create_with_rate_limit() {
        let api = MockSentry::new();
        api.seed_project("acme", "web");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let state = create(
            &ctx,
            json!({
                "organization": "acme",
                "project": "web",
                "name": "ci",
                "rate_limit_window": 60,
                "rate_limit_count": 1000
            }),
        )
        .await
        .unwrap();

        assert_eq!(state["name"], "ci");
        assert_eq!(state["rate_limit_window"], 60);
        assert_eq!(state["rate_limit_count"], 1000);
        assert!(state["dsn_public"].as_str().unwrap().starts_with("https://"));

        let create_request = &api.requests()[1];
        assert_eq!(create_request.path, "0/projects/acme/web/keys/");
        assert_eq!(
            create_request.body.as_ref().unwrap()["rateLimit"],
            json!({"window": 60, "count": 1000})
        );
    }

    #[tokio::test]
    async fn test_create_without_rate_limit_sends_none() {
        let api = MockSentry::new();
        api.seed_project("acme", "web");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let state = create(&ctx, json!({"organization": "acme", "project": "web", "name": "ci"}))
            .await
            .unwrap();

        assert!(state["rate_limit_window"].is_null());
        let body = api.requests()[1].body.clone().unwrap();
        assert!(body.get("rateLimit").is_none());
    }

    #[tokio::test]
    async fn test_read_clears_missing_key() {
        let api = MockSentry::new();
        api.seed_project("acme", "web");
        let capture = LogCapture::new();
        let logger = capture.logger();
        let ctx = Ctx::new(&api, &logger);

        let state = read(
            &ctx,
            json!({"id": "deadbeef", "organization": "acme", "project": "web"}),
        )
        .await
        .unwrap();

        assert!(state.is_none());
        assert!(capture
            .contents()
            .contains("[DEBUG] Sentry key with ID deadbeef could not be found\n"));
    }

    #[tokio::test]
    async fn test_update_delete_import() {
        let api = MockSentry::new();
        let key_id = api.seed_key("acme", "web", "Default", "2021-01-01T00:00:00Z");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let prior = import(&ctx, &format!("acme/web/{}", key_id)).await.unwrap();
        assert_eq!(prior["name"], "Default");

        let mut planned = prior.clone();
        planned["name"] = json!("Renamed");
        let state = update(&ctx, prior, planned).await.unwrap();
        assert_eq!(state["name"], "Renamed");
        assert_eq!(state["id"], key_id.as_str());

        delete(&ctx, state.clone()).await.unwrap();
        assert!(read(&ctx, state).await.unwrap().is_none());
    }
}
