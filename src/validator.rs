//! Reusable validators.
use crate::{
    cache::RegexCache,
    dispatcher::KeywordDispatcher,
    error::{ProcessingError, SchemaError},
    options::{ValidationConfig, ValidationOptions},
    paths::JsonPointer,
    pipeline::Pipeline,
    registry::SchemaRegistry,
    report::{LogLevel, Message, Report, Thresholds},
    resolver::ReferenceResolver,
    schemas::{draft_from_schema, Draft},
    syntax::SyntaxChecker,
    tree::{SchemaLocation, SchemaTree},
};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::{fmt, sync::Arc};
use url::Url;

static DEFAULT_BASE_URI: Lazy<Url> =
    Lazy::new(|| Url::parse("json-schema:///").expect("Is a valid URI"));

/// A schema loaded together with everything needed to validate instances against it.
///
/// Compiled keyword validators, syntax check results and fetched documents are kept between
/// runs, so a single validator should be reused for many instances. It can be shared between
/// threads.
///
/// ```rust
/// use serde_json::json;
///
/// let validator = schemata::Validator::new(&json!({"maxLength": 3})).expect("Valid schema");
/// let report = validator.validate(&json!("abcd")).expect("Not escalated");
/// assert!(!report.is_success());
/// assert_eq!(report.errors().count(), 1);
/// ```
pub struct Validator {
    config: ValidationConfig,
    draft: Draft,
    root: Url,
    registry: SchemaRegistry,
    dispatcher: KeywordDispatcher,
    syntax: SyntaxChecker,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .field("draft", &self.draft)
            .field("root", &self.root.as_str())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Create a builder for a validator.
    #[must_use]
    pub fn options() -> ValidationOptions {
        ValidationOptions::default()
    }

    /// Create a validator with default options.
    ///
    /// # Errors
    ///
    /// Never fails with the default base URI; kept fallible for symmetry with
    /// [`ValidationOptions::build`].
    pub fn new(schema: &Value) -> Result<Validator, ProcessingError> {
        Self::options().build(schema)
    }

    pub(crate) fn from_options(
        options: ValidationOptions,
        schema: &Value,
    ) -> Result<Validator, ProcessingError> {
        let ValidationOptions {
            config,
            retrievers,
            documents,
            formats,
            base_uri,
        } = options;
        let draft = config
            .draft
            .or_else(|| draft_from_schema(schema))
            .unwrap_or_default();
        let root = match base_uri {
            Some(uri) => {
                Url::parse(&uri).map_err(|source| ProcessingError::InvalidUri { uri, source })?
            }
            None => DEFAULT_BASE_URI.clone(),
        };
        let registry = SchemaRegistry::new(draft, retrievers);
        registry.register(&root, schema.clone());
        for (uri, document) in documents {
            let parsed =
                Url::parse(&uri).map_err(|source| ProcessingError::InvalidUri { uri, source })?;
            registry.register(&parsed, document);
        }
        let regexes = Arc::new(RegexCache::default());
        let dispatcher = KeywordDispatcher::new(
            config.validator_cache,
            Arc::clone(&regexes),
            formats,
            config.validate_formats,
        );
        let syntax = SyntaxChecker::new(regexes);
        tracing::debug!(draft = ?draft, root = %root, "validator created");
        Ok(Validator {
            config,
            draft,
            root,
            registry,
            dispatcher,
            syntax,
        })
    }

    /// Validate `instance` against the root schema.
    ///
    /// # Errors
    ///
    /// Fails only when a message reaches the exception threshold. Problems with the schema
    /// itself are reported as fatal messages.
    pub fn validate(&self, instance: &Value) -> Result<Report, ProcessingError> {
        self.run(self.registry.tree(&self.root), &self.root, instance, self.thresholds())
    }

    /// Validate `instance` against the schema a URI points at.
    ///
    /// `uri` is resolved against the root schema URI, so `"#/definitions/item"` addresses
    /// a fragment of the root schema.
    ///
    /// ```rust
    /// use serde_json::json;
    ///
    /// let schema = json!({"definitions": {"positive": {"minimum": 0}}});
    /// let validator = schemata::Validator::new(&schema).expect("Valid schema");
    /// let report = validator
    ///     .validate_at("#/definitions/positive", &json!(-1))
    ///     .expect("Not escalated");
    /// assert!(!report.is_success());
    /// ```
    ///
    /// # Errors
    ///
    /// Fails if `uri` is not a valid URI reference, or when a message reaches the exception
    /// threshold.
    pub fn validate_at(&self, uri: &str, instance: &Value) -> Result<Report, ProcessingError> {
        let target = self
            .root
            .join(uri)
            .map_err(|source| ProcessingError::InvalidUri {
                uri: uri.to_string(),
                source,
            })?;
        self.run(self.registry.locate(&target), &target, instance, self.thresholds())
    }

    /// Whether `instance` is valid. Escalations count as invalid.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        let thresholds = Thresholds {
            log_level: LogLevel::None,
            exception: LogLevel::None,
        };
        self.run(self.registry.tree(&self.root), &self.root, instance, thresholds)
            .map_or(false, |report| report.is_success())
    }

    /// The fragment `uri` points at, after following its references.
    ///
    /// # Errors
    ///
    /// Fails if `uri` is not a valid URI reference or its target cannot be resolved.
    pub fn resolve(&self, uri: &str) -> Result<SchemaTree, SchemaError> {
        let target = self
            .root
            .join(uri)
            .map_err(|source| SchemaError::InvalidReference {
                reference: uri.to_string(),
                source,
            })?;
        let tree = self.registry.locate(&target)?;
        ReferenceResolver::new(&self.registry).resolve(tree)
    }

    /// The draft every document is interpreted with.
    #[must_use]
    pub const fn draft(&self) -> Draft {
        self.draft
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Documents known to this validator.
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// The URI the root schema is registered under.
    #[must_use]
    pub fn root_uri(&self) -> &Url {
        &self.root
    }

    fn thresholds(&self) -> Thresholds {
        Thresholds {
            log_level: self.config.log_threshold,
            exception: self.config.exception_threshold,
        }
    }

    fn run(
        &self,
        tree: Result<SchemaTree, SchemaError>,
        target: &Url,
        instance: &Value,
        thresholds: Thresholds,
    ) -> Result<Report, ProcessingError> {
        match tree {
            Ok(tree) => Pipeline::new(
                &self.registry,
                &self.dispatcher,
                &self.syntax,
                self.config.deep_check,
                self.config.fail_fast,
            )
            .run(&tree, instance, thresholds),
            Err(error) => {
                let mut uri = target.clone();
                uri.set_fragment(None);
                let location = SchemaLocation::new(Arc::new(uri), JsonPointer::new());
                let mut report = Report::with_thresholds(thresholds);
                report.log(Message::fatal(None, location, JsonPointer::new(), error))?;
                Ok(report)
            }
        }
    }
}
