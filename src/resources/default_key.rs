//! `sentry_default_key`: adopts the key Sentry creates with every project.
//!
//! Reads, updates and imports behave like `sentry_key`. Creating adopts the
//! oldest existing key instead of making a new one, and destroying only
//! forgets it.

use serde_json::Value;

use super::key::{self, KeyState};
use super::{decode_state, found, Ctx};
use crate::error::{ProviderError, ResultExt};
use crate::schema::{Attribute, Schema};

/// Resource type name.
pub const NAME: &str = "sentry_default_key";

/// Schema of the resource: a key whose name may be left to Sentry.
pub fn schema() -> Schema {
    key::schema()
        .with_description("The default client key of a Sentry project.")
        .with_attribute(
            "name",
            Attribute::optional_computed_string().with_description("The name of the key"),
        )
}

/// Adopt the project's oldest key and apply the configured name and rate limit.
pub async fn create(ctx: &Ctx<'_>, planned: Value) -> Result<Value, ProviderError> {
    let mut state: KeyState = decode_state(&planned)?;
    let (org, project) = (state.organization.clone(), state.project.clone());

    let context = || format!("creating {} in {}/{}", NAME, org, project);

    let response = ctx
        .api
        .list_project_keys(&org, &project)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let keys = found(response.into_value())
        .with_context(context)?
        .unwrap_or_default();

    let oldest = keys
        .into_iter()
        .min_by_key(|key| key.date_created)
        .ok_or_else(|| {
            ProviderError::NotFound("Default key not found on the project".to_string())
                .context(context())
        })?;

    if state.name.is_empty() {
        state.name = oldest.name.clone();
    }
    state.id = oldest.id;

    ctx.log.debugf(format_args!(
        "Creating Sentry default key in org {} for project {} with ID {}",
        org, project, state.id
    ));
    let id = state.id.clone();
    let result = key::update_key(ctx, state).await?;
    ctx.log.debugf(format_args!(
        "Created Sentry default key in org {} for project {} with ID {}",
        org, project, id
    ));
    Ok(result)
}

/// Forget the key without deleting it.
pub async fn delete(ctx: &Ctx<'_>, _current: Value) -> Result<(), ProviderError> {
    ctx.log.warning(&[&"Cannot destroy Default Key. The resource is removed from state, however the key remains in Sentry."]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LogCapture, MockSentry};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_adopts_oldest_key() {
        let api = MockSentry::new();
        api.seed_key("acme", "web", "Later", "2021-06-01T00:00:00Z");
        let oldest = api.seed_key("acme", "web", "Default", "2020-01-01T00:00:00Z");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let state = create(
            &ctx,
            json!({"organization": "acme", "project": "web", "rate_limit_window": 60, "rate_limit_count": 10}),
        )
        .await
        .unwrap();

        assert_eq!(state["id"], oldest.as_str());
        assert_eq!(state["name"], "Default");
        assert_eq!(state["rate_limit_count"], 10);
        assert_eq!(api.key_count("acme", "web"), 2);
    }

    #[tokio::test]
    async fn test_create_compares_creation_instants() {
        let api = MockSentry::new();
        let oldest = api.seed_key("acme", "web", "Default", "2020-01-01T00:00:00Z");
        api.seed_key("acme", "web", "Later", "2020-01-01T00:00:00.500Z");
        api.seed_key("acme", "web", "Offset", "2019-12-31T23:30:00-01:00");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let state = create(&ctx, json!({"organization": "acme", "project": "web"}))
            .await
            .unwrap();

        assert_eq!(state["id"], oldest.as_str());
        assert_eq!(state["name"], "Default");
    }

    #[tokio::test]
    async fn test_create_renames_when_configured() {
        let api = MockSentry::new();
        api.seed_key("acme", "web", "Default", "2020-01-01T00:00:00Z");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let state = create(&ctx, json!({"organization": "acme", "project": "web", "name": "Browser"}))
            .await
            .unwrap();
        assert_eq!(state["name"], "Browser");
    }

    #[tokio::test]
    async fn test_create_fails_without_keys() {
        let api = MockSentry::new();
        api.seed_project("acme", "web");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let err = create(&ctx, json!({"organization": "acme", "project": "web"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Default key not found on the project"));
    }

    #[tokio::test]
    async fn test_delete_only_warns() {
        let api = MockSentry::new();
        let id = api.seed_key("acme", "web", "Default", "2020-01-01T00:00:00Z");
        let capture = LogCapture::new();
        let logger = capture.logger();
        let ctx = Ctx::new(&api, &logger);

        delete(&ctx, json!({"id": id, "organization": "acme", "project": "web"}))
            .await
            .unwrap();

        assert!(capture.contents().starts_with("[WARN] Cannot destroy Default Key."));
        assert_eq!(api.key_count("acme", "web"), 1);
        assert!(api.requests().is_empty());
    }
}
