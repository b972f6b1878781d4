//! Remote Sentry objects and the typed parameters sent to the API.
//!
//! Remote objects only declare the fields the provider tracks; anything else
//! in a response is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Sentry organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Numeric identifier, as a string.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Display name.
    pub name: String,
}

/// Parameters for creating an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationParams {
    /// Display name.
    pub name: String,
    /// Requested slug; derived from the name when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub slug: String,
    /// Acceptance of the terms of service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agree_terms: Option<bool>,
}

/// Parameters for updating an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateOrganizationParams {
    /// Display name.
    pub name: String,
    /// New slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub slug: String,
}

/// A team inside an organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Numeric identifier, as a string.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Whether the token's user can access the team.
    #[serde(default)]
    pub has_access: bool,
    /// Whether membership is pending approval.
    #[serde(default)]
    pub is_pending: bool,
    /// Whether the token's user is a member.
    #[serde(default)]
    pub is_member: bool,
}

/// Parameters for creating a team.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateTeamParams {
    /// Display name.
    pub name: String,
    /// Requested slug; derived from the name when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub slug: String,
}

/// Parameters for updating a team.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateTeamParams {
    /// Display name.
    pub name: String,
    /// New slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub slug: String,
}

/// A project, only fetched to check that it exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Numeric identifier, as a string.
    pub id: String,
    /// URL slug.
    pub slug: String,
    /// Display name.
    pub name: String,
}

/// Rate limit applied to a client key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Window length in seconds.
    pub window: i64,
    /// Events accepted per window.
    pub count: i64,
}

/// DSNs of a client key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dsn {
    /// DSN including the secret.
    #[serde(default)]
    pub secret: String,
    /// Public DSN.
    #[serde(default)]
    pub public: String,
    /// CSP report endpoint.
    #[serde(default)]
    pub csp: String,
}

/// A project client key (DSN).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectKey {
    /// Key identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Public half of the key.
    #[serde(default)]
    pub public: String,
    /// Secret half of the key.
    #[serde(default)]
    pub secret: String,
    /// Numeric project identifier.
    #[serde(default)]
    pub project_id: i64,
    /// Whether the key accepts events.
    #[serde(default)]
    pub is_active: bool,
    /// Rate limit, absent when unlimited.
    #[serde(default)]
    pub rate_limit: Option<RateLimit>,
    /// DSNs built from the key.
    #[serde(default)]
    pub dsn: Dsn,
    /// Creation time.
    #[serde(default)]
    pub date_created: DateTime<Utc>,
}

/// Parameters for creating a client key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectKeyParams {
    /// Display name.
    pub name: String,
    /// Rate limit to apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
}

/// Parameters for updating a client key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectKeyParams {
    /// Display name.
    pub name: String,
    /// Rate limit to apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
}

/// One option of a project plugin, as listed by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfigEntry {
    /// Option key.
    pub name: String,
    /// Current value; any JSON type.
    #[serde(default)]
    pub value: Value,
}

/// A legacy project plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    /// Plugin identifier (e.g. `webhooks`).
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether the plugin is enabled for the project.
    #[serde(default)]
    pub enabled: bool,
    /// Full option listing.
    #[serde(default)]
    pub config: Vec<PluginConfigEntry>,
}

/// An alert rule as returned by the API.
///
/// Conditions, actions and filters stay loosely typed: the API emits their
/// leaves with whatever JSON type the rule kind uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Rule identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// How conditions combine (`any`, `all`).
    #[serde(default)]
    pub action_match: String,
    /// How filters combine (`any`, `all`, `none`).
    #[serde(default)]
    pub filter_match: String,
    /// Minimum minutes between two firings.
    #[serde(default)]
    pub frequency: i64,
    /// Environment the rule is limited to.
    #[serde(default)]
    pub environment: Option<String>,
    /// Trigger conditions.
    #[serde(default)]
    pub conditions: Vec<Map<String, Value>>,
    /// Actions run when the rule fires.
    #[serde(default)]
    pub actions: Vec<Map<String, Value>>,
    /// Filters narrowing the matched events.
    #[serde(default)]
    pub filters: Vec<Map<String, Value>>,
    /// Creation time.
    #[serde(default)]
    pub date_created: DateTime<Utc>,
}

/// A rule trigger condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// Condition class (e.g. `sentry.rules.conditions.event_frequency.EventFrequencyCondition`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Comparand; a count for frequency conditions, a tag value otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Frequency window (e.g. `1h`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    /// `count` or `percent`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_type: Option<String>,
    /// Window compared against for percent changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_interval: Option<String>,
    /// Event attribute for attribute conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Tag key for tagged-event conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Match operator (`eq`, `co`, `sw`, ...).
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    /// Event level for level conditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// A rule action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Action {
    /// Action class (e.g. `sentry.mail.actions.NotifyEmailAction`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Legacy notification service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Integration identifier for chat workspaces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<i64>,
    /// Channel name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Channel identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Comma-separated tags to include in notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// Recipient kind (`IssueOwners`, `Team`, `Member`).
    #[serde(rename = "targetType", skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    /// Recipient identifier.
    #[serde(rename = "targetIdentifier", skip_serializing_if = "Option::is_none")]
    pub target_identifier: Option<String>,
    /// Who is notified when there are no owners.
    #[serde(rename = "fallthroughType", skip_serializing_if = "Option::is_none")]
    pub fallthrough_type: Option<String>,
}

/// A rule filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
    /// Filter class (e.g. `sentry.rules.filters.age_comparison.AgeComparisonFilter`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Comparand.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// `older` or `newer`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_type: Option<String>,
    /// Time unit for age comparisons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Event attribute for attribute filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Tag key for tagged-event filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Match operator.
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    /// Event level for level filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Assignee kind for assigned-to filters.
    #[serde(rename = "targetType", skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    /// Assignee identifier.
    #[serde(rename = "targetIdentifier", skip_serializing_if = "Option::is_none")]
    pub target_identifier: Option<String>,
}

/// Parameters for creating or updating an alert rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleParams {
    /// Display name.
    pub name: String,
    /// How conditions combine.
    pub action_match: String,
    /// How filters combine.
    pub filter_match: String,
    /// Minimum minutes between two firings.
    pub frequency: i64,
    /// Environment the rule is limited to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Trigger conditions.
    pub conditions: Vec<Condition>,
    /// Actions run when the rule fires.
    pub actions: Vec<Action>,
    /// Filters narrowing the matched events.
    pub filters: Vec<Filter>,
}

/// Parameters for creating an alert rule.
pub type CreateRuleParams = RuleParams;
/// Parameters for updating an alert rule.
pub type UpdateRuleParams = RuleParams;
