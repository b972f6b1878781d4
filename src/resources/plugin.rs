//! `sentry_plugin`: a legacy project plugin and the options the user tracks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{decode_state, encode_state, found, vanished, Ctx};
use crate::error::{ProviderError, ResultExt};
use crate::normalize::{plugin_config_params, project_plugin_config};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};
use crate::types::split_import_id;

/// Resource type name.
pub const NAME: &str = "sentry_plugin";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PluginState {
    id: String,
    organization: String,
    project: String,
    plugin: String,
    config: Map<String, Value>,
}

/// Schema of the resource.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("A plugin enabled on a Sentry project.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "organization",
            Attribute::required_string()
                .with_description("The slug of the organization the project belongs to")
                .with_force_new(),
        )
        .with_attribute(
            "project",
            Attribute::required_string()
                .with_description("The slug of the project to create the plugin for")
                .with_force_new(),
        )
        .with_attribute(
            "plugin",
            Attribute::required_string()
                .with_description("Plugin ID")
                .with_force_new(),
        )
        .with_attribute(
            "config",
            Attribute::new(
                AttributeType::map(AttributeType::Dynamic),
                AttributeFlags::optional(),
            )
            .with_description("Plugin config"),
        )
}

/// Enable the plugin and apply its options.
pub async fn create(ctx: &Ctx<'_>, planned: Value) -> Result<Value, ProviderError> {
    let mut state: PluginState = decode_state(&planned)?;
    let (org, project, plugin) = (
        state.organization.clone(),
        state.project.clone(),
        state.plugin.clone(),
    );
    let creating = || format!("creating {} {} in {}/{}", NAME, plugin, org, project);
    let configuring = || format!("configuring {} {} in {}/{}", NAME, plugin, org, project);
    let params = plugin_config_params(&state.config).with_context(creating)?;

    ctx.log.debugf(format_args!(
        "Creating plugin {} in org {} for project {}",
        plugin, org, project
    ));
    let response = ctx
        .api
        .enable_plugin(&org, &project, &plugin)
        .await
        .with_context(creating)?;
    response.log(ctx.log);
    response.check().with_context(creating)?;
    ctx.log.debugf(format_args!(
        "Created plugin {} in org {} for project {}",
        plugin, org, project
    ));

    state.id = plugin.clone();
    let response = ctx
        .api
        .update_plugin(&org, &project, &plugin, &params)
        .await
        .with_context(configuring)?;
    response.log(ctx.log);
    response.check().with_context(configuring)?;

    read_back(ctx, state).await
}

/// Refresh the plugin; tracked options are projected from the remote listing.
pub async fn read(ctx: &Ctx<'_>, current: Value) -> Result<Option<Value>, ProviderError> {
    let state: PluginState = decode_state(&current)?;
    match read_state(ctx, state).await? {
        Some(state) => Ok(Some(encode_state(&state)?)),
        None => Ok(None),
    }
}

async fn read_state(
    ctx: &Ctx<'_>,
    mut state: PluginState,
) -> Result<Option<PluginState>, ProviderError> {
    let id = state.id.clone();
    let (org, project) = (state.organization.clone(), state.project.clone());

    let context = || format!("reading {} {} in {}/{}", NAME, id, org, project);
    ctx.log.debugf(format_args!(
        "Reading plugin with ID {} in org {} for project {}",
        id, org, project
    ));
    let response = ctx
        .api
        .get_plugin(&org, &project, &id)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let Some(plugin) = found(response.into_value()).with_context(context)? else {
        return Ok(None);
    };
    ctx.log.debugf(format_args!(
        "Read plugin with ID {} in org {} for project {}",
        plugin.id, org, project
    ));

    let projected = project_plugin_config(&plugin.config, state.config.keys().map(String::as_str));
    state.config = projected
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    state.plugin = plugin.id.clone();
    state.id = plugin.id;
    Ok(Some(state))
}

async fn read_back(ctx: &Ctx<'_>, state: PluginState) -> Result<Value, ProviderError> {
    let id = state.id.clone();
    let state = read_state(ctx, state)
        .await?
        .ok_or_else(|| vanished(NAME, &id))?;
    encode_state(&state)
}

/// Replace the plugin's options.
pub async fn update(ctx: &Ctx<'_>, prior: Value, planned: Value) -> Result<Value, ProviderError> {
    let prior: PluginState = decode_state(&prior)?;
    let mut state: PluginState = decode_state(&planned)?;
    state.id = prior.id;
    let id = state.id.clone();
    let (org, project) = (state.organization.clone(), state.project.clone());
    let context = || format!("updating {} {} in {}/{}", NAME, id, org, project);
    let params = plugin_config_params(&state.config).with_context(context)?;

    ctx.log.debugf(format_args!(
        "Updating plugin with ID {} in org {} for project {}",
        id, org, project
    ));
    let response = ctx
        .api
        .update_plugin(&org, &project, &id, &params)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    response.check().with_context(context)?;
    ctx.log.debugf(format_args!(
        "Updated plugin with ID {} in org {} for project {}",
        id, org, project
    ));

    read_back(ctx, state).await
}

/// Disable the plugin.
pub async fn delete(ctx: &Ctx<'_>, current: Value) -> Result<(), ProviderError> {
    let state: PluginState = decode_state(&current)?;
    let (id, org, project) = (state.id, state.organization, state.project);

    let context = || format!("deleting {} {} in {}/{}", NAME, id, org, project);
    ctx.log.debugf(format_args!(
        "Deleting plugin with ID {} in org {} for project {}",
        id, org, project
    ));
    let response = ctx
        .api
        .disable_plugin(&org, &project, &id)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    response.check().with_context(context)?;
    ctx.log.debugf(format_args!(
        "Deleted plugin with ID {} in org {} for project {}",
        id, org, project
    ));
    Ok(())
}

/// Import from `organization/project/plugin-id`. No options are tracked yet.
pub async fn import(ctx: &Ctx<'_>, id: &str) -> Result<Value, ProviderError> {
    let parts = split_import_id(id, &["organization", "project", "plugin-id"])?;
    let state = PluginState {
        id: parts[2].to_string(),
        organization: parts[0].to_string(),
        project: parts[1].to_string(),
        plugin: parts[2].to_string(),
        config: Map::new(),
    };
    read_state(ctx, state)
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("plugin {}", id)))
        .and_then(|state| encode_state(&state))
}
