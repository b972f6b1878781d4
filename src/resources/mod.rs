//! Sentry resource and data source handlers.
//!
//! Each submodule owns one resource type: its name, its schema and its
//! lifecycle operations. Handlers are plain async functions over a [`Ctx`];
//! the provider dispatches to them by type name.
//!
//! State crosses the boundary as `serde_json::Value` and is decoded into a
//! typed struct per resource. `null` attributes are treated as absent.

pub mod default_key;
pub mod key;
pub mod organization;
pub mod organization_data;
pub mod plugin;
pub mod rule;
pub mod team;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::SentryApi;
use crate::error::ProviderError;
use crate::logging::Logger;

/// Everything a handler needs: the API and the log sink.
#[derive(Clone, Copy)]
pub struct Ctx<'a> {
    /// Sentry API.
    pub api: &'a dyn SentryApi,
    /// Log sink.
    pub log: &'a Logger,
}

impl<'a> Ctx<'a> {
    /// Create a context.
    pub fn new(api: &'a dyn SentryApi, log: &'a Logger) -> Self {
        Self { api, log }
    }
}

/// Decode resource state, ignoring `null` attributes.
pub(crate) fn decode_state<T: DeserializeOwned>(value: &Value) -> Result<T, ProviderError> {
    let value = match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        Value::Null => Value::Object(Default::default()),
        other => {
            return Err(ProviderError::Validation(format!(
                "expected an object for resource state, got {}",
                other
            )))
        },
    };
    Ok(serde_json::from_value(value)?)
}

/// Encode resource state.
pub(crate) fn encode_state<T: Serialize>(state: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(state)?)
}

/// Turn a missing remote object into `None`.
pub(crate) fn found<T>(result: Result<T, ProviderError>) -> Result<Option<T>, ProviderError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Error for an object that vanished between a write and the read that follows it.
pub(crate) fn vanished(kind: &str, id: &str) -> ProviderError {
    ProviderError::NotFound(format!("{} {} disappeared right after being written", kind, id))
}
