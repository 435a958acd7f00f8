use quill_wire::WireError;

pub mod code {
    pub const ENCODING: &str = "SDK_ENCODING_FAILED";
    pub const SCHEMA_NOT_FOUND: &str = "SDK_SCHEMA_NOT_FOUND";
    pub const VALIDATION: &str = "SDK_VALIDATION_FAILED";
    pub const CONCURRENT_BUILD: &str = "SDK_CONCURRENT_BUILD";
    pub const FETCH: &str = "SDK_SCHEMA_FETCH_FAILED";
    pub const MISSING_FIELD: &str = "SDK_MISSING_FIELD";
    pub const CONFIG: &str = "SDK_CONFIG_INVALID";
}

/// Errors surfaced by schema lookups and the action builder.
///
/// Every variant is fatal to the current build. Only `Fetch` is worth
/// retrying: failed fetches are never cached.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum SdkError {
    #[error("encoding failed: {0}")]
    Encoding(#[from] WireError),

    #[error("schema not found: {message}")]
    SchemaNotFound { message: String },

    #[error("validation failed: {message}")]
    Validation { message: String, offending: Vec<String> },

    #[error("build in progress; use a fresh builder or await the running build")]
    ConcurrentBuild,

    #[error("schema fetch for namespace '{namespace}' failed: {message}")]
    Fetch { namespace: String, message: String },

    #[error("{field} is required to {purpose}")]
    MissingField { field: &'static str, purpose: &'static str },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl SdkError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Encoding(_) => code::ENCODING,
            Self::SchemaNotFound { .. } => code::SCHEMA_NOT_FOUND,
            Self::Validation { .. } => code::VALIDATION,
            Self::ConcurrentBuild => code::CONCURRENT_BUILD,
            Self::Fetch { .. } => code::FETCH,
            Self::MissingField { .. } => code::MISSING_FIELD,
            Self::Config { .. } => code::CONFIG,
        }
    }

    /// Returns `true` for failures that may succeed on a later call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    pub fn schema_not_found(message: impl Into<String>) -> Self {
        Self::SchemaNotFound { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), offending: Vec::new() }
    }

    /// Validation failure naming the parameters that caused it.
    pub fn invalid_parameters(message: impl Into<String>, offending: Vec<String>) -> Self {
        Self::Validation { message: message.into(), offending }
    }

    pub fn fetch(namespace: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch { namespace: namespace.into(), message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Parameter names attached to a validation failure.
    pub fn offending(&self) -> &[String] {
        match self {
            Self::Validation { offending, .. } => offending,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fetch_is_retryable() {
        assert!(SdkError::fetch("ns", "timeout").is_retryable());
        assert!(!SdkError::ConcurrentBuild.is_retryable());
        assert!(!SdkError::from(WireError::BigIntUnsupported).is_retryable());
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(SdkError::validation("x").code(), code::VALIDATION);
        assert_eq!(SdkError::schema_not_found("x").code(), code::SCHEMA_NOT_FOUND);
        assert_eq!(SdkError::ConcurrentBuild.code(), "SDK_CONCURRENT_BUILD");
    }

    #[test]
    fn offending_names_are_exposed() {
        let err = SdkError::invalid_parameters("bad", vec!["bogus".into()]);
        assert_eq!(err.offending(), &["bogus".to_owned()]);
        assert!(SdkError::ConcurrentBuild.offending().is_empty());
    }
}
