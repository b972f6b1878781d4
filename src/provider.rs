//! The provider: the `ProviderService` trait hosts drive and its Sentry implementation.
//!
//! A host calls [`ProviderService::configure`] once, then any number of
//! resource operations. [`SentryProvider`] validates planned state against
//! the resource schema, then dispatches to the handler in
//! [`resources`](crate::resources) named by the resource type.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::api::SentryApi;
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::http_client::HttpClient;
use crate::logging::Logger;
use crate::resources::{
    default_key, key, organization, organization_data, plugin, rule, team, Ctx,
};
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::types::{ImportedResource, ProviderMetadata};
use crate::validation::validate;

/// Trait that provider implementations must implement.
///
/// State crosses this boundary as `serde_json::Value`, shaped by the
/// schema returned from [`schema`](Self::schema).
#[async_trait]
pub trait ProviderService: Send + Sync + 'static {
    // =========================================================================
    // Schema & Metadata
    // =========================================================================

    /// Return the provider's schema including all resources and data sources.
    fn schema(&self) -> ProviderSchema;

    /// Return provider metadata.
    /// By default, the type lists are derived from the schema.
    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.keys().cloned().collect();
        let mut data_sources: Vec<String> = schema.data_sources.keys().cloned().collect();
        resources.sort();
        data_sources.sort();
        ProviderMetadata {
            resources,
            data_sources,
            ..Default::default()
        }
    }

    // =========================================================================
    // Provider Lifecycle
    // =========================================================================

    /// Validate the provider configuration before configuring.
    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&self.schema().provider, &config))
    }

    /// Configure the provider with credentials and settings.
    /// Returns diagnostics (errors and warnings).
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError>;

    // =========================================================================
    // Resource Operations
    // =========================================================================

    /// Validate a resource's configuration against its schema.
    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self.schema();
        let resource = schema
            .resources
            .get(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))?;
        Ok(validate(resource, &config))
    }

    /// Create a new resource.
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError>;

    /// Read the current state of a resource. `None` means it no longer exists.
    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError>;

    /// Update an existing resource.
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete a resource.
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError>;

    /// Import existing infrastructure into management.
    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::Unsupported(format!(
            "Import not supported for resource type: {}",
            resource_type
        )))
    }

    // =========================================================================
    // Data Source Operations
    // =========================================================================

    /// Validate a data source's configuration against its schema.
    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self.schema();
        let data_source = schema
            .data_sources
            .get(data_source_type)
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))?;
        Ok(validate(data_source, &config))
    }

    /// Read data from an external source.
    async fn read_data_source(&self, data_source_type: &str, _config: Value) -> Result<Value, ProviderError> {
        Err(ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

/// The Sentry provider.
pub struct SentryProvider {
    api: RwLock<Option<Arc<dyn SentryApi>>>,
    logger: Logger,
}

impl SentryProvider {
    /// An unconfigured provider; resource operations fail until
    /// [`configure`](ProviderService::configure) succeeds.
    pub fn new(logger: Logger) -> Self {
        Self {
            api: RwLock::new(None),
            logger,
        }
    }

    /// A provider already bound to `api`.
    pub fn with_api(api: Arc<dyn SentryApi>, logger: Logger) -> Self {
        Self {
            api: RwLock::new(Some(api)),
            logger,
        }
    }

    /// The provider's log sink.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    async fn api(&self) -> Result<Arc<dyn SentryApi>, ProviderError> {
        self.api.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration("the provider has not been configured".to_string())
        })
    }

    /// Reject planned state that does not match the resource schema.
    fn check_planned(&self, resource_type: &str, planned: &Value) -> Result<(), ProviderError> {
        let schema = self.schema();
        let resource = schema
            .resources
            .get(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))?;

        let errors: Vec<String> = validate(resource, planned)
            .into_iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .map(|d| d.summary)
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::Validation(errors.join("; ")))
        }
    }
}

#[async_trait]
impl ProviderService for SentryProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(ProviderConfig::schema())
            .with_resource(organization::NAME, organization::schema())
            .with_resource(team::NAME, team::schema())
            .with_resource(key::NAME, key::schema())
            .with_resource(default_key::NAME, default_key::schema())
            .with_resource(plugin::NAME, plugin::schema())
            .with_resource(rule::NAME, rule::schema())
            .with_data_source(organization_data::NAME, organization_data::schema())
    }

    fn metadata(&self) -> ProviderMetadata {
        let schema = self.schema();
        let mut resources: Vec<String> = schema.resources.into_keys().collect();
        resources.sort();
        ProviderMetadata {
            name: "sentry".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            resources,
            data_sources: schema.data_sources.into_keys().collect(),
        }
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let resolved = match ProviderConfig::from_value(config)
            .and_then(|config| config.resolve(&self.logger))
        {
            Ok(resolved) => resolved,
            Err(err @ ProviderError::Configuration(_)) => return Ok(err.to_diagnostics()),
            Err(err) => return Err(err),
        };

        let client = HttpClient::new(resolved.base_url, resolved.token)?;
        self.logger
            .debugf(format_args!("Configured Sentry client for {}", client.base_url()));
        *self.api.write().await = Some(Arc::new(client));
        Ok(vec![])
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.check_planned(resource_type, &planned_state)?;
        let api = self.api().await?;
        let ctx = Ctx::new(api.as_ref(), &self.logger);

        match resource_type {
            organization::NAME => organization::create(&ctx, planned_state).await,
            team::NAME => team::create(&ctx, planned_state).await,
            key::NAME => key::create(&ctx, planned_state).await,
            default_key::NAME => default_key::create(&ctx, planned_state).await,
            plugin::NAME => plugin::create(&ctx, planned_state).await,
            rule::NAME => rule::create(&ctx, planned_state).await,
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let api = self.api().await?;
        let ctx = Ctx::new(api.as_ref(), &self.logger);

        match resource_type {
            organization::NAME => organization::read(&ctx, current_state).await,
            team::NAME => team::read(&ctx, current_state).await,
            key::NAME | default_key::NAME => key::read(&ctx, current_state).await,
            plugin::NAME => plugin::read(&ctx, current_state).await,
            rule::NAME => rule::read(&ctx, current_state).await,
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.check_planned(resource_type, &planned_state)?;
        let api = self.api().await?;
        let ctx = Ctx::new(api.as_ref(), &self.logger);

        match resource_type {
            organization::NAME => organization::update(&ctx, prior_state, planned_state).await,
            team::NAME => team::update(&ctx, prior_state, planned_state).await,
            key::NAME | default_key::NAME => key::update(&ctx, prior_state, planned_state).await,
            plugin::NAME => plugin::update(&ctx, prior_state, planned_state).await,
            rule::NAME => rule::update(&ctx, prior_state, planned_state).await,
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let api = self.api().await?;
        let ctx = Ctx::new(api.as_ref(), &self.logger);

        match resource_type {
            organization::NAME => organization::delete(&ctx, current_state).await,
            team::NAME => team::delete(&ctx, current_state).await,
            key::NAME => key::delete(&ctx, current_state).await,
            default_key::NAME => default_key::delete(&ctx, current_state).await,
            plugin::NAME => plugin::delete(&ctx, current_state).await,
            rule::NAME => rule::delete(&ctx, current_state).await,
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let api = self.api().await?;
        let ctx = Ctx::new(api.as_ref(), &self.logger);

        let state = match resource_type {
            organization::NAME => organization::import(&ctx, id).await?,
            team::NAME => team::import(&ctx, id).await?,
            key::NAME | default_key::NAME => key::import(&ctx, id).await?,
            plugin::NAME => plugin::import(&ctx, id).await?,
            rule::NAME => rule::import(&ctx, id).await?,
            other => return Err(ProviderError::UnknownResource(other.to_string())),
        };
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn read_data_source(&self, data_source_type: &str, config: Value) -> Result<Value, ProviderError> {
        let api = self.api().await?;
        let ctx = Ctx::new(api.as_ref(), &self.logger);

        match data_source_type {
            organization_data::NAME => organization_data::read(&ctx, config).await,
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }
}
