//! `sentry_team`: a team inside an organization, identified by its slug.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_state, encode_state, found, vanished, Ctx};
use crate::error::{ProviderError, ResultExt};
use crate::models::{CreateTeamParams, Team, UpdateTeamParams};
use crate::schema::{Attribute, Schema};
use crate::types::split_import_id;

/// Resource type name.
pub const NAME: &str = "sentry_team";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct TeamState {
    id: String,
    organization: String,
    name: String,
    slug: String,
    team_id: String,
    has_access: bool,
    is_pending: bool,
    is_member: bool,
}

impl TeamState {
    fn apply(&mut self, team: Team) {
        self.id = team.slug.clone();
        self.team_id = team.id;
        self.name = team.name;
        self.slug = team.slug;
        self.has_access = team.has_access;
        self.is_pending = team.is_pending;
        self.is_member = team.is_member;
    }
}

/// Schema of the resource.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("A Sentry team.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "organization",
            Attribute::required_string()
                .with_description("The slug of the organization the team should be created for")
                .with_force_new(),
        )
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The name of the team"),
        )
        .with_attribute(
            "slug",
            Attribute::optional_computed_string().with_description("The optional slug for this team"),
        )
        .with_attribute("team_id", Attribute::computed_string())
        .with_attribute("has_access", Attribute::computed_bool())
        .with_attribute("is_pending", Attribute::computed_bool())
        .with_attribute("is_member", Attribute::computed_bool())
}

/// Create the team, then read it back.
pub async fn create(ctx: &Ctx<'_>, planned: Value) -> Result<Value, ProviderError> {
    let mut state: TeamState = decode_state(&planned)?;
    let org = state.organization.clone();
    let params = CreateTeamParams {
        name: state.name.clone(),
        slug: state.slug.clone(),
    };

    let context = || format!("creating {} {} in {}", NAME, params.name, org);
    ctx.log.debugf(format_args!("Creating Sentry team {} in org {}", params.name, org));
    let response = ctx
        .api
        .create_team(&org, &params)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let team = response.into_value().with_context(context)?;
    ctx.log.debugf(format_args!("Created Sentry team {} in org {}", team.name, org));

    state.id = team.slug;
    read_back(ctx, state).await
}

/// Refresh the team; `None` when it no longer exists.
pub async fn read(ctx: &Ctx<'_>, current: Value) -> Result<Option<Value>, ProviderError> {
    let state: TeamState = decode_state(&current)?;
    match read_state(ctx, state).await? {
        Some(state) => Ok(Some(encode_state(&state)?)),
        None => Ok(None),
    }
}

async fn read_state(ctx: &Ctx<'_>, mut state: TeamState) -> Result<Option<TeamState>, ProviderError> {
    let slug = state.id.clone();
    let org = state.organization.clone();

    let context = || format!("reading {} {} in {}", NAME, slug, org);
    ctx.log.debugf(format_args!("Reading Sentry team {} in org {}", slug, org));
    let response = ctx
        .api
        .get_team(&org, &slug)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let Some(team) = found(response.into_value()).with_context(context)? else {
        return Ok(None);
    };
    ctx.log.debugf(format_args!("Read Sentry team {} in org {}", team.slug, org));

    state.apply(team);
    Ok(Some(state))
}

async fn read_back(ctx: &Ctx<'_>, state: TeamState) -> Result<Value, ProviderError> {
    let id = state.id.clone();
    let state = read_state(ctx, state)
        .await?
        .ok_or_else(|| vanished(NAME, &id))?;
    encode_state(&state)
}

/// Rename the team or change its slug.
pub async fn update(ctx: &Ctx<'_>, prior: Value, planned: Value) -> Result<Value, ProviderError> {
    let prior: TeamState = decode_state(&prior)?;
    let mut state: TeamState = decode_state(&planned)?;
    let slug = prior.id;
    let org = state.organization.clone();
    let params = UpdateTeamParams {
        name: state.name.clone(),
        slug: state.slug.clone(),
    };

    let context = || format!("updating {} {} in {}", NAME, slug, org);
    ctx.log.debugf(format_args!("Updating Sentry team {} in org {}", slug, org));
    let response = ctx
        .api
        .update_team(&org, &slug, &params)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let team = response.into_value().with_context(context)?;
    ctx.log.debugf(format_args!("Updated Sentry team {} in org {}", team.slug, org));

    state.id = team.slug;
    read_back(ctx, state).await
}

/// Delete the team.
pub async fn delete(ctx: &Ctx<'_>, current: Value) -> Result<(), ProviderError> {
    let state: TeamState = decode_state(&current)?;
    let (slug, org) = (state.id, state.organization);

    let context = || format!("deleting {} {} in {}", NAME, slug, org);
    ctx.log.debugf(format_args!("Deleting Sentry team {} in org {}", slug, org));
    let response = ctx
        .api
        .delete_team(&org, &slug)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    response.check().with_context(context)?;
    ctx.log.debugf(format_args!("Deleted Sentry team {} in org {}", slug, org));
    Ok(())
}

/// Import from `organization/team-slug`.
pub async fn import(ctx: &Ctx<'_>, id: &str) -> Result<Value, ProviderError> {
    let parts = split_import_id(id, &["organization", "team-slug"])?;
    let state = TeamState {
        id: parts[1].to_string(),
        organization: parts[0].to_string(),
        ..Default::default()
    };
    read_state(ctx, state)
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("team {}", id)))
        .and_then(|state| encode_state(&state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LogCapture, MockSentry};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_derives_slug() {
        let api = MockSentry::new();
        let capture = LogCapture::new();
        let logger = capture.logger();
        let ctx = Ctx::new(&api, &logger);

        let state = create(&ctx, json!({"organization": "acme", "name": "Backend Team"}))
            .await
            .unwrap();

        assert_eq!(state["id"], "backend-team");
        assert_eq!(state["organization"], "acme");
        assert_eq!(state["has_access"], true);
        assert_eq!(api.requests()[0].path, "0/organizations/acme/teams/");
        assert!(capture
            .contents()
            .contains("[DEBUG] Created Sentry team Backend Team in org acme\n"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let api = MockSentry::new();
        api.seed_team("acme", "backend", "Backend");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let prior = import(&ctx, "acme/backend").await.unwrap();
        let mut planned = prior.clone();
        planned["name"] = json!("Platform");
        planned["slug"] = json!("platform");

        let state = update(&ctx, prior, planned).await.unwrap();
        assert_eq!(state["id"], "platform");
        assert_eq!(state["name"], "Platform");

        delete(&ctx, state.clone()).await.unwrap();
        assert!(read(&ctx, state).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_import_rejects_bad_id() {
        let api = MockSentry::new();
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let err = import(&ctx, "backend").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidImportId(_)));
    }

    #[tokio::test]
    async fn test_api_failure_carries_context() {
        let api = MockSentry::new();
        api.fail_next(http::StatusCode::FORBIDDEN, "You do not have permission to perform this action.");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let err = create(&ctx, json!({"organization": "acme", "name": "Backend"}))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "creating sentry_team Backend in acme: API error (403): You do not have permission to perform this action."
        );
    }
}
