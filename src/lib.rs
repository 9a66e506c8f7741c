//! JSON Schema validation with leveled processing reports.
//!
//! - Drafts 3, 4, 6 and 7
//! - References across documents, fetched on demand over `http(s)` and `file`
//! - Every finding is a [`Message`] with a [`LogLevel`], collected into a [`Report`]
//! - Problems with the schema itself are reported, never panicked on
//!
//! # Validation
//!
//! For one-off checks use [`is_valid`]:
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({"type": "string"});
//! assert!(schemata::is_valid(&schema, &json!("Hello, world!")));
//! assert!(!schemata::is_valid(&schema, &json!(42)));
//! ```
//!
//! When validating many instances, build a [`Validator`] once and reuse it. Its
//! [`Validator::validate`] returns a [`Report`] with everything that was found:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use serde_json::json;
//!
//! let schema = json!({
//!     "properties": {"name": {"type": "string"}, "age": {"minimum": 0}},
//!     "required": ["name"]
//! });
//! let validator = schemata::Validator::new(&schema)?;
//!
//! let report = validator.validate(&json!({"name": 1, "age": -1}))?;
//! assert!(!report.is_success());
//! for message in report.errors() {
//!     eprintln!("{} at {} ({})", message, message.instance_path, message.schema);
//! }
//! assert_eq!(report.errors().count(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! # Reports
//!
//! Messages below the log threshold are dropped, but still count towards the outcome: a
//! report fails as soon as it has seen an error, whether or not it kept it. A message at or
//! above the exception threshold aborts the run with [`ProcessingError::Escalated`].
//!
//! ```rust
//! use schemata::{LogLevel, ProcessingError};
//! use serde_json::json;
//!
//! let validator = schemata::options()
//!     .with_exception_threshold(LogLevel::Error)
//!     .build(&json!({"minimum": 10}))
//!     .expect("Valid schema");
//! match validator.validate(&json!(1)) {
//!     Err(ProcessingError::Escalated(message)) => assert_eq!(message.keyword, Some("minimum")),
//!     _ => panic!("Should escalate"),
//! }
//! ```
//!
//! # Configuration
//!
//! [`options`] returns a [`ValidationOptions`] builder. Plain settings live in
//! [`ValidationConfig`], which can also be deserialized from a configuration file:
//!
//! ```rust
//! use schemata::{Draft, ValidationConfig, ValidationOptions};
//! use serde_json::json;
//!
//! let config: ValidationConfig =
//!     serde_json::from_value(json!({"draft": "draft4", "deepCheck": true})).expect("Valid");
//! let validator = ValidationOptions::from_config(config)
//!     .build(&json!({"type": "integer"}))
//!     .expect("Valid schema");
//! assert_eq!(validator.draft(), Draft::Draft4);
//! assert!(!validator.is_valid(&json!(1.0)));
//! ```
//!
//! # References
//!
//! Documents referenced by URI are fetched on first use and kept for the lifetime of the
//! validator. Register documents up front with [`ValidationOptions::with_document`], or plug
//! in your own [`Retrieve`] implementation:
//!
//! ```rust
//! use serde_json::json;
//!
//! let validator = schemata::options()
//!     .with_document("http://example.com/positive.json", json!({"minimum": 0}))
//!     .build(&json!({"items": {"$ref": "http://example.com/positive.json"}}))
//!     .expect("Valid schema");
//! assert!(validator.is_valid(&json!([1, 2])));
//! assert!(!validator.is_valid(&json!([1, -2])));
//! ```
//!
//! # Feature flags
//!
//! - `resolve-http`: fetch `http` and `https` documents with `reqwest`. Enabled by default.
//! - `resolve-file`: read `file` documents from disk. Enabled by default.
#![warn(
    clippy::cast_possible_truncation,
    clippy::doc_markdown,
    clippy::explicit_iter_loop,
    clippy::map_unwrap_or,
    clippy::match_same_arms,
    clippy::needless_borrow,
    clippy::needless_pass_by_value,
    clippy::print_stdout,
    clippy::redundant_closure,
    clippy::trivially_copy_pass_by_ref,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    variant_size_differences
)]
#![allow(clippy::unnecessary_wraps, clippy::upper_case_acronyms)]
mod cache;
mod dispatcher;
mod ecma;
pub mod error;
mod keywords;
mod options;
pub mod paths;
mod pipeline;
pub mod primitive_type;
mod registry;
mod report;
mod resolver;
mod retriever;
mod schemas;
mod syntax;
mod tree;
mod validator;

pub use ecma::PatternError;
pub use error::{MessageKind, ProcessingError, SchemaError};
pub use keywords::format::Format;
pub use options::{ValidationConfig, ValidationOptions};
pub use paths::{JsonPointer, PathChunk, PointerError};
pub use primitive_type::PrimitiveType;
pub use registry::SchemaRegistry;
pub use report::{LogLevel, Message, Report};
pub use retriever::{Retrieve, SchemaFetchError};
pub use schemas::Draft;
pub use syntax::SyntaxProblem;
pub use tree::{SchemaLocation, SchemaTree};
pub use validator::Validator;

use serde_json::Value;

/// Validate `instance` against `schema` once.
///
/// ```rust
/// use schemata::ValidationConfig;
/// use serde_json::json;
///
/// let report = schemata::validate(
///     &json!({"enum": ["a", "b"]}),
///     &json!("c"),
///     &ValidationConfig::default(),
/// )
/// .expect("Not escalated");
/// assert!(!report.is_success());
/// ```
///
/// # Errors
///
/// Fails when a message reaches the configured exception threshold.
pub fn validate(
    schema: &Value,
    instance: &Value,
    config: &ValidationConfig,
) -> Result<Report, ProcessingError> {
    ValidationOptions::from_config(config.clone())
        .build(schema)?
        .validate(instance)
}

/// Whether `instance` is valid against `schema`.
///
/// Schema problems make every instance invalid.
#[must_use]
#[inline]
pub fn is_valid(schema: &Value, instance: &Value) -> bool {
    Validator::new(schema).map_or(false, |validator| validator.is_valid(instance))
}

/// Create a builder for configuring a [`Validator`].
///
/// ```rust
/// use schemata::Draft;
/// use serde_json::json;
///
/// let validator = schemata::options()
///     .with_draft(Draft::Draft4)
///     .build(&json!({"exclusiveMinimum": true, "minimum": 0}))
///     .expect("Valid schema");
/// assert!(!validator.is_valid(&json!(0)));
/// ```
#[must_use]
pub fn options() -> ValidationOptions {
    Validator::options()
}

#[cfg(test)]
pub(crate) mod tests_util {
    use crate::{Draft, LogLevel, Message, MessageKind, SchemaError, Validator};
    use serde_json::Value;

    fn validator_with_draft(draft: Option<Draft>, schema: &Value) -> Validator {
        let mut options = crate::options();
        if let Some(draft) = draft {
            options.with_draft(draft);
        }
        options.build(schema).expect("Should be a valid schema")
    }

    fn errors_with(validator: &Validator, instance: &Value) -> Vec<Message> {
        validator
            .validate(instance)
            .expect("Should not escalate")
            .into_messages()
            .into_iter()
            .filter(|message| message.level >= LogLevel::Error)
            .collect()
    }

    pub(crate) fn is_valid(schema: &Value, instance: &Value) {
        let validator = validator_with_draft(None, schema);
        let report = validator.validate(instance).expect("Should not escalate");
        if let Some(first) = report.errors().next() {
            panic!(
                "{} should be valid. Error: {} at {}",
                instance, first, first.instance_path
            );
        }
        assert!(report.is_success(), "{} should be valid", instance);
        assert!(
            validator.is_valid(instance),
            "{} should be valid (via is_valid)",
            instance
        );
    }

    pub(crate) fn is_not_valid(schema: &Value, instance: &Value) {
        is_not_valid_with(&validator_with_draft(None, schema), instance);
    }

    pub(crate) fn is_not_valid_with_draft(draft: Draft, schema: &Value, instance: &Value) {
        is_not_valid_with(&validator_with_draft(Some(draft), schema), instance);
    }

    fn is_not_valid_with(validator: &Validator, instance: &Value) {
        let report = validator.validate(instance).expect("Should not escalate");
        assert!(!report.is_success(), "{} should not be valid", instance);
        assert!(
            !validator.is_valid(instance),
            "{} should not be valid (via is_valid)",
            instance
        );
    }

    /// The instance fails and one of the errors comes from `keyword`.
    pub(crate) fn assert_keyword(schema: &Value, instance: &Value, keyword: &str) {
        let errors = errors(schema, instance);
        assert!(!errors.is_empty(), "{} should not be valid", instance);
        assert!(
            errors.iter().any(|error| error.keyword == Some(keyword)),
            "expected an error from '{}', got {:?}",
            keyword,
            errors
        );
    }

    /// Messages at error level or above.
    pub(crate) fn errors(schema: &Value, instance: &Value) -> Vec<Message> {
        errors_with(&validator_with_draft(None, schema), instance)
    }

    pub(crate) fn errors_with_draft(draft: Draft, schema: &Value, instance: &Value) -> Vec<Message> {
        errors_with(&validator_with_draft(Some(draft), schema), instance)
    }

    /// Asserts a single fatal message naming `keyword` among the schema's problems.
    pub(crate) fn assert_malformed_with_draft(
        draft: Draft,
        schema: &Value,
        instance: &Value,
        keyword: &str,
    ) {
        let errors = errors_with_draft(draft, schema, instance);
        assert_eq!(errors.len(), 1, "expected one message, got {:?}", errors);
        assert_eq!(errors[0].level, LogLevel::Fatal);
        match &errors[0].kind {
            MessageKind::Schema(SchemaError::MalformedSchema { problems }) => assert!(
                problems
                    .iter()
                    .any(|problem| problem.keyword.as_deref() == Some(keyword)),
                "expected a problem with '{}', got {:?}",
                keyword,
                problems
            ),
            other => panic!("Unexpected message: {other:?}"),
        }
    }

    pub(crate) fn is_valid_with_draft(draft: Draft, schema: &Value, instance: &Value) -> bool {
        let validator = validator_with_draft(Some(draft), schema);
        let success = validator
            .validate(instance)
            .expect("Should not escalate")
            .is_success();
        assert_eq!(success, validator.is_valid(instance));
        success
    }
}
