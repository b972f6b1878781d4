//! `sentry_rule`: an issue alert rule of a project.
//!
//! Conditions, actions and filters are free-form maps in configuration. They
//! are decoded into typed components on the way out (with the defaults and
//! coercions of [`crate::normalize`]) and their numeric leaves are turned
//! back into strings on the way in, so a refresh matches what was written.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_state, encode_state, found, vanished, Ctx};
use crate::error::{ProviderError, ResultExt};
use crate::models::{Rule, RuleParams};
use crate::normalize::{from_remote, rule_params, RuleInput};
use crate::schema::{Attribute, AttributeFlags, AttributeType, Schema};
use crate::types::split_import_id;

/// Resource type name.
pub const NAME: &str = "sentry_rule";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct RuleState {
    id: String,
    organization: String,
    project: String,
    name: String,
    action_match: String,
    filter_match: String,
    frequency: i64,
    environment: String,
    conditions: Vec<Value>,
    actions: Vec<Value>,
    filters: Vec<Value>,
}

impl RuleState {
    fn params(&self) -> Result<RuleParams, ProviderError> {
        Ok(rule_params(&RuleInput {
            name: &self.name,
            environment: &self.environment,
            action_match: &self.action_match,
            filter_match: &self.filter_match,
            frequency: self.frequency,
            conditions: &self.conditions,
            actions: &self.actions,
            filters: &self.filters,
        })?)
    }

    fn apply(&mut self, rule: Rule) {
        self.id = rule.id;
        self.name = rule.name;
        self.frequency = rule.frequency;
        self.environment = rule.environment.unwrap_or_default();
        self.action_match = rule.action_match;
        self.filter_match = rule.filter_match;
        self.conditions = components(rule.conditions);
        self.actions = components(rule.actions);
        self.filters = components(rule.filters);
    }
}

fn components(remote: Vec<serde_json::Map<String, Value>>) -> Vec<Value> {
    from_remote(remote).into_iter().map(Value::Object).collect()
}

fn component_list() -> AttributeType {
    AttributeType::list(AttributeType::map(AttributeType::Dynamic))
}

/// Schema of the resource.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("An issue alert rule of a Sentry project.")
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
                .with_description("The slug of the project to create the rule for")
                .with_force_new(),
        )
        .with_attribute(
            "name",
            Attribute::required_string().with_description("The rule name"),
        )
        .with_attribute("action_match", Attribute::optional_computed_string())
        .with_attribute("filter_match", Attribute::optional_computed_string())
        .with_attribute(
            "actions",
            Attribute::new(component_list(), AttributeFlags::required()),
        )
        .with_attribute(
            "conditions",
            Attribute::new(component_list(), AttributeFlags::required()),
        )
        .with_attribute(
            "filters",
            Attribute::new(component_list(), AttributeFlags::optional()),
        )
        .with_attribute(
            "frequency",
            Attribute::optional_computed_int64()
                .with_description("Perform actions at most once every X minutes"),
        )
        .with_attribute(
            "environment",
            Attribute::optional_computed_string()
                .with_description("Perform rule in a specific environment"),
        )
}

/// Create the rule, then read it back.
pub async fn create(ctx: &Ctx<'_>, planned: Value) -> Result<Value, ProviderError> {
    let mut state: RuleState = decode_state(&planned)?;
    let (org, project) = (state.organization.clone(), state.project.clone());
    let context = || format!("creating {} {} in {}/{}", NAME, state.name, org, project);
    let params = state.params().with_context(context)?;

    ctx.log.debugf(format_args!(
        "Creating rule with name {} in org {} for project {}",
        params.name, org, project
    ));
    let response = ctx
        .api
        .create_rule(&org, &project, &params)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let rule = response.into_value().with_context(context)?;
    ctx.log.debugf(format_args!(
        "Created rule with name {} and ID {} in org {} for project {}",
        rule.name, rule.id, org, project
    ));

    state.id = rule.id;
    read_back(ctx, state).await
}

/// Refresh the rule.
///
/// `None` when the project's rule listing is gone. A listing that does not
/// contain the rule is an error.
pub async fn read(ctx: &Ctx<'_>, current: Value) -> Result<Option<Value>, ProviderError> {
    let state: RuleState = decode_state(&current)?;
    match read_state(ctx, state).await? {
        Some(state) => Ok(Some(encode_state(&state)?)),
        None => Ok(None),
    }
}

async fn read_state(ctx: &Ctx<'_>, mut state: RuleState) -> Result<Option<RuleState>, ProviderError> {
    let id = state.id.clone();
    let (org, project) = (state.organization.clone(), state.project.clone());

    let context = || format!("reading {} {} in {}/{}", NAME, id, org, project);
    ctx.log.debugf(format_args!(
        "Reading rule with ID {} in org {} for project {}",
        id, org, project
    ));
    let response = ctx
        .api
        .list_rules(&org, &project)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let Some(rules) = found(response.into_value()).with_context(context)? else {
        return Ok(None);
    };

    let Some(rule) = rules.into_iter().find(|rule| rule.id == id) else {
        if id.is_empty() {
            ctx.log.error(&[&"The rule ID was never set (ID was '')"]);
        }
        return Err(ProviderError::NotFound(format!("Could not find rule with ID {}", id))
            .context(context()));
    };
    ctx.log.debugf(format_args!(
        "Read rule with ID {} in org {} for project {}",
        rule.id, org, project
    ));

    state.apply(rule);
    Ok(Some(state))
}

async fn read_back(ctx: &Ctx<'_>, state: RuleState) -> Result<Value, ProviderError> {
    let id = state.id.clone();
    let state = read_state(ctx, state)
        .await?
        .ok_or_else(|| vanished(NAME, &id))?;
    encode_state(&state)
}

/// Replace the rule's settings.
pub async fn update(ctx: &Ctx<'_>, prior: Value, planned: Value) -> Result<Value, ProviderError> {
    let prior: RuleState = decode_state(&prior)?;
    let mut state: RuleState = decode_state(&planned)?;
    state.id = prior.id;
    let id = state.id.clone();
    let (org, project) = (state.organization.clone(), state.project.clone());
    let context = || format!("updating {} {} in {}/{}", NAME, id, org, project);
    let params = state.params().with_context(context)?;

    ctx.log.debugf(format_args!(
        "Updating rule with ID {} in org {} for project {}",
        id, org, project
    ));
    let response = ctx
        .api
        .update_rule(&org, &project, &id, &params)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    response.check().with_context(context)?;
    ctx.log.debugf(format_args!(
        "Updated rule with ID {} in org {} for project {}",
        id, org, project
    ));

    read_back(ctx, state).await
}

/// Delete the rule.
pub async fn delete(ctx: &Ctx<'_>, current: Value) -> Result<(), ProviderError> {
    let state: RuleState = decode_state(&current)?;
    let (id, org, project) = (state.id, state.organization, state.project);

    let context = || format!("deleting {} {} in {}/{}", NAME, id, org, project);
    ctx.log.debugf(format_args!(
        "Deleting rule with ID {} in org {} for project {}",
        id, org, project
    ));
    let response = ctx
        .api
        .delete_rule(&org, &project, &id)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    response.check().with_context(context)?;
    ctx.log.debugf(format_args!(
        "Deleted rule with ID {} in org {} for project {}",
        id, org, project
    ));
    Ok(())
}

/// Import from `organization/project/rule-id`.
pub async fn import(ctx: &Ctx<'_>, id: &str) -> Result<Value, ProviderError> {
    let parts = split_import_id(id, &["organization", "project", "rule-id"])?;
    let state = RuleState {
        id: parts[2].to_string(),
        organization: parts[0].to_string(),
        project: parts[1].to_string(),
        ..Default::default()
    };
    read_state(ctx, state)
        .await?
        .ok_or_else(|| ProviderError::NotFound(format!("rule {}", id)))
        .and_then(|state| encode_state(&state))
}
