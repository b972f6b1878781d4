//! Error types for the Sentry provider.

use std::fmt;

use thiserror::Error;

use crate::normalize::DecodeError;
use crate::schema::Diagnostic;

/// Errors that can occur while managing Sentry resources.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested remote object was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource configuration does not match its schema.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// The operation is not supported for this resource type.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// An import identifier did not have the expected shape.
    #[error("Invalid import id: {0}")]
    InvalidImportId(String),

    /// A dynamic configuration entry could not be decoded into API parameters.
    #[error("Invalid configuration: {0}")]
    Decode(#[from] DecodeError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP request could not be sent or its response could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Detail message extracted from the response body.
        message: String,
    },

    /// An error annotated with the operation and resource it happened in.
    #[error("{context}: {source}")]
    Context {
        /// Operation, resource kind, scope and identifier.
        context: String,
        /// The underlying error.
        source: Box<ProviderError>,
    },
}

impl ProviderError {
    /// Get the error message as a string.
    ///
    /// For [`ProviderError::Context`] this is the message of the innermost error.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::UnknownResource(msg)
            | Self::Unsupported(msg)
            | Self::InvalidImportId(msg)
            | Self::Transport(msg) => msg.clone(),
            Self::Decode(err) => err.to_string(),
            Self::Serialization(err) => err.to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Context { source, .. } => source.message(),
        }
    }

    /// Strip any [`ProviderError::Context`] layers.
    pub fn root(&self) -> &ProviderError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the root cause is a missing remote object.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound(_))
    }

    /// Whether the root cause is a configuration decoding problem rather than
    /// a remote failure.
    pub fn is_decode(&self) -> bool {
        matches!(self.root(), Self::Decode(_))
    }

    /// Wrap this error with a description of the failing operation.
    pub fn context(self, context: impl fmt::Display) -> Self {
        Self::Context {
            context: context.to_string(),
            source: Box::new(self),
        }
    }

    /// Convert this error into diagnostics the host can show to the user.
    ///
    /// Decode errors produce one diagnostic per rejected entry, pointing at
    /// the offending attribute path.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self.root() {
            Self::Decode(err) => err
                .entries
                .iter()
                .map(|entry| {
                    Diagnostic::error(format!("Invalid {} configuration", entry.component))
                        .with_detail(entry.to_string())
                        .with_attribute(entry.attribute_path())
                })
                .collect(),
            _ => vec![Diagnostic::error(self.to_string())],
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Extension trait to attach operation context to fallible results.
pub trait ResultExt<T> {
    /// Wrap the error, if any, with the context produced by `f`.
    fn with_context<C, F>(self, f: F) -> Result<T, ProviderError>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<ProviderError>,
{
    fn with_context<C, F>(self, f: F) -> Result<T, ProviderError>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.into().context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{EntryError, EntryFailure, FieldError, ScalarKind};
    use crate::schema::DiagnosticSeverity;

    fn decode_error() -> DecodeError {
        DecodeError {
            entries: vec![EntryError {
                component: "conditions",
                index: 1,
                failure: EntryFailure::Fields(vec![FieldError {
                    field: "value".to_string(),
                    expected: ScalarKind::Int,
                    found: "object".to_string(),
                }]),
            }],
        }
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("rule 42".to_string());
        assert_eq!(format!("{}", err), "Resource not found: rule 42");

        let err = ProviderError::Api {
            status: 403,
            message: "You do not have permission".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "API error (403): You do not have permission"
        );

        let err = ProviderError::UnknownResource("sentry_dashboard".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: sentry_dashboard");
    }

    #[test]
    fn test_context_wraps_display_and_keeps_root() {
        let err = ProviderError::NotFound("team backend".to_string())
            .context("reading sentry_team backend in acme");

        assert_eq!(
            err.to_string(),
            "reading sentry_team backend in acme: Resource not found: team backend"
        );
        assert!(err.is_not_found());
        assert_eq!(err.message(), "team backend");
    }

    #[test]
    fn test_result_ext_with_context() {
        let result: Result<(), ProviderError> =
            Err(ProviderError::Transport("connection reset".to_string()));
        let err = result
            .with_context(|| "creating sentry_rule in acme/web")
            .unwrap_err();

        assert!(matches!(err, ProviderError::Context { .. }));
        assert!(matches!(err.root(), ProviderError::Transport(_)));
        assert!(!err.is_decode());
    }

    #[test]
    fn test_decode_errors_are_distinct_from_transport() {
        let err = ProviderError::from(decode_error()).context("creating sentry_rule in acme/web");
        assert!(err.is_decode());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_decode_error_diagnostics_point_at_entry() {
        let err = ProviderError::from(decode_error());
        let diagnostics = err.to_diagnostics();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Error);
        assert_eq!(diagnostics[0].attribute, Some("conditions.1".to_string()));
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .unwrap_or_default()
            .contains("value"));
    }

    #[test]
    fn test_other_errors_become_single_diagnostic() {
        let err = ProviderError::Configuration("missing token".to_string());
        let diagnostics = err.to_diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Configuration error: missing token");
        assert!(diagnostics[0].attribute.is_none());
    }
}
