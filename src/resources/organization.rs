//! `sentry_organization`: an organization, identified by its slug.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_state, encode_state, found, vanished, Ctx};
use crate::error::{ProviderError, ResultExt};
use crate::models::{CreateOrganizationParams, Organization, UpdateOrganizationParams};
use crate::schema::{Attribute, Schema};

/// Resource type name.
pub const NAME: &str = "sentry_organization";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct OrganizationState {
    id: String,
    name: String,
    slug: String,
    agree_terms: bool,
    internal_id: String,
}

impl OrganizationState {
    fn apply(&mut self, org: Organization) {
        self.id = org.slug.clone();
        self.internal_id = org.id;
        self.name = org.name;
        self.slug = org.slug;
    }
}

/// Schema of the resource.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("A Sentry organization.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The human readable name for the organization"),
        )
        .with_attribute(
            "slug",
            Attribute::optional_computed_string()
                .with_description("The unique URL slug for this organization"),
        )
        .with_attribute(
            "agree_terms",
            Attribute::required_bool()
                .with_description("You agree to the applicable terms of service and privacy policy"),
        )
        .with_attribute("internal_id", Attribute::computed_string())
}

/// Create the organization, then read it back.
pub async fn create(ctx: &Ctx<'_>, planned: Value) -> Result<Value, ProviderError> {
    let mut state: OrganizationState = decode_state(&planned)?;
    let params = CreateOrganizationParams {
        name: state.name.clone(),
        slug: state.slug.clone(),
        agree_terms: Some(state.agree_terms),
    };

    let context = || format!("creating {} {}", NAME, params.name);
    ctx.log.debugf(format_args!("Creating Sentry organization {}", params.name));
    let response = ctx
        .api
        .create_organization(&params)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let org = response.into_value().with_context(context)?;
    ctx.log.debugf(format_args!("Created Sentry organization {}", org.name));

    state.id = org.slug;
    read_back(ctx, state).await
}

/// Refresh the organization; `None` when it no longer exists.
pub async fn read(ctx: &Ctx<'_>, current: Value) -> Result<Option<Value>, ProviderError> {
    let state: OrganizationState = decode_state(&current)?;
    match read_state(ctx, state).await? {
        Some(state) => Ok(Some(encode_state(&state)?)),
        None => Ok(None),
    }
}

async fn read_state(
    ctx: &Ctx<'_>,
    mut state: OrganizationState,
) -> Result<Option<OrganizationState>, ProviderError> {
    let slug = state.id.clone();

    let context = || format!("reading {} {}", NAME, slug);
    ctx.log.debugf(format_args!("Reading Sentry organization {}", slug));
    let response = ctx
        .api
        .get_organization(&slug)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let Some(org) = found(response.into_value()).with_context(context)? else {
        return Ok(None);
    };
    ctx.log.debugf(format_args!("Read Sentry organization {}", org.slug));

    state.apply(org);
    Ok(Some(state))
}

async fn read_back(ctx: &Ctx<'_>, state: OrganizationState) -> Result<Value, ProviderError> {
    let id = state.id.clone();
    let state = read_state(ctx, state)
        .await?
        .ok_or_else(|| vanished(NAME, &id))?;
    encode_state(&state)
}

/// Rename the organization or change its slug.
pub async fn update(ctx: &Ctx<'_>, prior: Value, planned: Value) -> Result<Value, ProviderError> {
    let prior: OrganizationState = decode_state(&prior)?;
    let mut state: OrganizationState = decode_state(&planned)?;
    let slug = prior.id;
    let params = UpdateOrganizationParams {
        name: state.name.clone(),
        slug: state.slug.clone(),
    };

    let context = || format!("updating {} {}", NAME, slug);
    ctx.log.debugf(format_args!("Updating Sentry organization {}", slug));
    let response = ctx
        .api
        .update_organization(&slug, &params)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let org = response.into_value().with_context(context)?;
    ctx.log.debugf(format_args!("Updated Sentry organization {}", org.slug));

    state.id = org.slug;
    read_back(ctx, state).await
}

/// Delete the organization.
pub async fn delete(ctx: &Ctx<'_>, current: Value) -> Result<(), ProviderError> {
    let state: OrganizationState = decode_state(&current)?;
    let slug = state.id;

    let context = || format!("deleting {} {}", NAME, slug);
    ctx.log.debugf(format_args!("Deleting Sentry organization {}", slug));
    let response = ctx
        .api
        .delete_organization(&slug)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    response.check().with_context(context)?;
    ctx.log.debugf(format_args!("Deleted Sentry organization {}", slug));
    Ok(())
}

/// Import by slug.
pub async fn import(ctx: &Ctx<'_>, id: &str) -> Result<Value, ProviderError> {
    let state = OrganizationState {
        id: id.to_string(),
        ..Default::default()
    };
    read_state(ctx, state)
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("organization {}", id)))
        .and_then(|state| encode_state(&state))
}
