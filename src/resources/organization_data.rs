//! `sentry_organization` data source: looks an organization up by slug.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_state, encode_state, Ctx};
use crate::error::{ProviderError, ResultExt};
use crate::schema::{Attribute, Schema};

/// Data source type name.
pub const NAME: &str = "sentry_organization";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct OrganizationData {
    id: String,
    slug: String,
    name: String,
    internal_id: String,
}

/// Schema of the data source.
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Look up a Sentry organization.")
        .with_attribute("id", Attribute::computed_string())
        .with_attribute(
            "slug",
            Attribute::required_string().with_description("The unique URL slug for this organization"),
        )
        .with_attribute(
            "name",
            Attribute::computed_string().with_description("The human readable name for this organization"),
        )
        .with_attribute("internal_id", Attribute::computed_string())
}

/// Read the organization named by `slug`. A missing organization is an error.
pub async fn read(ctx: &Ctx<'_>, config: Value) -> Result<Value, ProviderError> {
    let mut data: OrganizationData = decode_state(&config)?;
    let slug = data.slug.clone();

    let context = || format!("reading data source {} {}", NAME, slug);
    ctx.log.debugf(format_args!("Reading Sentry organization {}", slug));
    let response = ctx
        .api
        .get_organization(&slug)
        .await
        .with_context(context)?;
    response.log(ctx.log);
    let org = response.into_value().with_context(context)?;
    ctx.log.debugf(format_args!("Read Sentry organization {}", org.slug));

    data.id = org.slug.clone();
    data.slug = org.slug;
    data.internal_id = org.id;
    data.name = org.name;
    encode_state(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{LogCapture, MockSentry};
    use serde_json::json;

    #[tokio::test]
    async fn test_read_existing() {
        let api = MockSentry::new();
        api.seed_organization("acme", "Acme");
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let data = read(&ctx, json!({"slug": "acme"})).await.unwrap();
        assert_eq!(data["id"], "acme");
        assert_eq!(data["name"], "Acme");
        assert!(!data["internal_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_missing_is_error() {
        let api = MockSentry::new();
        let logger = LogCapture::new().logger();
        let ctx = Ctx::new(&api, &logger);

        let err = read(&ctx, json!({"slug": "nope"})).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("reading data source sentry_organization nope"));
    }
}
