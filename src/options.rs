//! Validator configuration.
use crate::{
    error::ProcessingError,
    keywords::format::{Format, Formats},
    report::LogLevel,
    retriever::{Retrieve, Retrievers},
    schemas::Draft,
    validator::Validator,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, sync::Arc};

/// Plain validation settings.
///
/// Deserializes from camelCase keys, so it can be embedded in a host application's
/// configuration file. Missing keys take their default values.
///
/// ```rust
/// use schemata::{Draft, LogLevel, ValidationConfig};
///
/// let config: ValidationConfig = serde_json::from_str(
///     r#"{"draft": "draft4", "failFast": true, "logThreshold": "error"}"#,
/// ).expect("Valid config");
/// assert_eq!(config.draft, Some(Draft::Draft4));
/// assert!(config.fail_fast);
/// assert_eq!(config.log_threshold, LogLevel::Error);
/// assert!(config.validator_cache);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Draft to validate with. Detected from `$schema` when unset, falling back to Draft 7.
    pub draft: Option<Draft>,
    /// Validate the children of an instance that already failed.
    pub deep_check: bool,
    /// Stop at the first failing keyword or child.
    pub fail_fast: bool,
    /// Messages below this level are not kept.
    pub log_threshold: LogLevel,
    /// Messages at or above this level abort validation with [`ProcessingError::Escalated`].
    pub exception_threshold: LogLevel,
    /// Cache compiled validators between runs.
    pub validator_cache: bool,
    /// Check the `format` keyword.
    pub validate_formats: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            draft: None,
            deep_check: false,
            fail_fast: false,
            log_threshold: LogLevel::Info,
            exception_threshold: LogLevel::None,
            validator_cache: true,
            validate_formats: true,
        }
    }
}

/// Builder for [`Validator`].
///
/// ```rust
/// use serde_json::json;
///
/// let validator = schemata::options()
///     .with_fail_fast(true)
///     .build(&json!({"type": "string"}))
///     .expect("Valid schema");
/// assert!(validator.is_valid(&json!("hello")));
/// ```
#[derive(Clone, Default)]
pub struct ValidationOptions {
    pub(crate) config: ValidationConfig,
    pub(crate) retrievers: Retrievers,
    pub(crate) documents: Vec<(String, Value)>,
    pub(crate) formats: Formats,
    pub(crate) base_uri: Option<String>,
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("config", &self.config)
            .field("retrievers", &self.retrievers)
            .field(
                "documents",
                &self.documents.iter().map(|(uri, _)| uri).collect::<Vec<_>>(),
            )
            .field("formats", &self.formats)
            .field("base_uri", &self.base_uri)
            .finish()
    }
}

impl ValidationOptions {
    /// Options starting from an existing configuration.
    #[must_use]
    pub fn from_config(config: ValidationConfig) -> Self {
        ValidationOptions {
            config,
            ..ValidationOptions::default()
        }
    }

    /// Build a validator for `schema`.
    ///
    /// # Errors
    ///
    /// Fails if the base URI or a pre-registered document URI is not an absolute URI.
    /// Problems with the schema itself are reported when validating.
    pub fn build(&self, schema: &Value) -> Result<Validator, ProcessingError> {
        Validator::from_options(self.clone(), schema)
    }

    #[inline]
    pub fn with_draft(&mut self, draft: Draft) -> &mut Self {
        self.config.draft = Some(draft);
        self
    }

    #[inline]
    pub fn with_deep_check(&mut self, deep_check: bool) -> &mut Self {
        self.config.deep_check = deep_check;
        self
    }

    #[inline]
    pub fn with_fail_fast(&mut self, fail_fast: bool) -> &mut Self {
        self.config.fail_fast = fail_fast;
        self
    }

    #[inline]
    pub fn with_log_threshold(&mut self, level: LogLevel) -> &mut Self {
        self.config.log_threshold = level;
        self
    }

    /// Abort validation when a message reaches `level`.
    #[inline]
    pub fn with_exception_threshold(&mut self, level: LogLevel) -> &mut Self {
        self.config.exception_threshold = level;
        self
    }

    #[inline]
    pub fn with_validator_cache(&mut self, enabled: bool) -> &mut Self {
        self.config.validator_cache = enabled;
        self
    }

    #[inline]
    pub fn with_validate_formats(&mut self, validate_formats: bool) -> &mut Self {
        self.config.validate_formats = validate_formats;
        self
    }

    /// Replace the retriever used for schemes without a dedicated one.
    ///
    /// ```rust
    /// use serde_json::{json, Value};
    /// use url::Url;
    ///
    /// let validator = schemata::options()
    ///     .with_retriever(|uri: &Url| -> Result<Value, schemata::SchemaFetchError> {
    ///         match uri.as_str() {
    ///             "http://example.com/string.json" => Ok(json!({"type": "string"})),
    ///             _ => Err(anyhow::anyhow!("not found")),
    ///         }
    ///     })
    ///     .build(&json!({"$ref": "http://example.com/string.json"}))
    ///     .expect("Valid schema");
    /// assert!(validator.is_valid(&json!("a")));
    /// ```
    pub fn with_retriever(&mut self, retriever: impl Retrieve + 'static) -> &mut Self {
        self.retrievers.set_fallback(Arc::new(retriever));
        self
    }

    /// Use `retriever` for URIs with the given scheme.
    pub fn with_scheme_retriever(
        &mut self,
        scheme: impl Into<String>,
        retriever: impl Retrieve + 'static,
    ) -> &mut Self {
        self.retrievers.insert(scheme.into(), Arc::new(retriever));
        self
    }

    /// Register a document up front, so references to `uri` never trigger a fetch.
    pub fn with_document(&mut self, uri: impl Into<String>, document: Value) -> &mut Self {
        self.documents.push((uri.into(), document));
        self
    }

    /// Register a custom format checker. It shadows a built-in checker with the same name.
    pub fn with_format<N, F>(&mut self, name: N, format: F) -> &mut Self
    where
        N: Into<String>,
        F: Format,
    {
        self.formats.insert(name, Arc::new(format));
        self
    }

    /// The URI the root schema is loaded under. Defaults to `json-schema:///`.
    pub fn with_base_uri(&mut self, base_uri: impl Into<String>) -> &mut Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}
