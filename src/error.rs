//! Error types
use crate::{
    paths::PointerError, primitive_type::PrimitiveType, report::Message, syntax::SyntaxProblem,
};
use serde::ser::SerializeMap;
use serde_json::Value;
use std::fmt;

/// Aborts a validation run.
///
/// Ordinary failures are reported through [`crate::Report`]; this error only surfaces when a
/// message reaches the configured exception threshold or when the validator cannot be set up.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    /// A message was logged at or above the exception threshold.
    #[error("{0}")]
    Escalated(Box<Message>),
    /// A base URI or a pre-registered document URI is not an absolute URI.
    #[error("'{uri}' is not a valid absolute URI: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
}

impl ProcessingError {
    /// The escalated message, if this error was raised by a report.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            ProcessingError::Escalated(message) => Some(message),
            ProcessingError::InvalidUri { .. } => None,
        }
    }
}

/// Structural problems with a schema. Every variant becomes a fatal message.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A reference target could not be found.
    #[error("reference '{reference}' cannot be resolved")]
    DanglingReference { reference: String },
    /// Following references came back to an already visited location.
    #[error("reference loop detected: {}", .path.join(" -> "))]
    ReferenceLoop { path: Vec<String> },
    /// The same schema was entered twice for one instance location.
    #[error("schema '{location}' is entered again for the same instance location")]
    ValidationLoop { location: String },
    /// A `$ref` value is not a valid URI reference.
    #[error("'{reference}' is not a valid URI reference: {source}")]
    InvalidReference {
        reference: String,
        #[source]
        source: url::ParseError,
    },
    /// A document could not be fetched or parsed.
    #[error("failed to retrieve '{uri}': {source}")]
    Unretrievable {
        uri: String,
        #[source]
        source: anyhow::Error,
    },
    /// No retriever handles the URI scheme.
    #[error("unsupported URI scheme '{scheme}' in '{uri}'")]
    UnsupportedScheme { scheme: String, uri: String },
    /// The fragment failed the syntax check.
    #[error("malformed schema: {}", join_problems(.problems))]
    MalformedSchema { problems: Vec<SyntaxProblem> },
    /// The fragment part of a reference is not a valid JSON pointer.
    #[error("invalid JSON pointer in '{uri}': {source}")]
    InvalidPointer {
        uri: String,
        #[source]
        source: PointerError,
    },
}

fn join_problems(problems: &[SyntaxProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SchemaError {
    pub(crate) const fn kind_name(&self) -> &'static str {
        match self {
            SchemaError::DanglingReference { .. } => "danglingReference",
            SchemaError::ReferenceLoop { .. } => "referenceLoop",
            SchemaError::ValidationLoop { .. } => "validationLoop",
            SchemaError::InvalidReference { .. } => "invalidReference",
            SchemaError::Unretrievable { .. } => "unretrievable",
            SchemaError::UnsupportedScheme { .. } => "unsupportedScheme",
            SchemaError::MalformedSchema { .. } => "malformedSchema",
            SchemaError::InvalidPointer { .. } => "invalidPointer",
        }
    }
}

/// Kinds of messages a validation run produces.
#[derive(Debug)]
#[allow(missing_docs)]
pub enum MessageKind {
    /// Too many items for a positional `items` array.
    AdditionalItems { limit: usize, found: usize },
    /// Properties not covered by `properties` or `patternProperties`.
    AdditionalProperties { unexpected: Vec<String> },
    /// No `anyOf` branch matched.
    AnyOf { branches: usize },
    /// The instance differs from `const`.
    Constant { expected: Value },
    /// No array item matches `contains`.
    Contains,
    /// A present property requires others that are missing.
    Dependencies { property: String, missing: Vec<String> },
    /// The instance matches a `disallow` entry.
    Disallowed { disallowed: Value },
    /// The instance is not one of the `enum` options.
    Enum { options: Value },
    ExclusiveMaximum { limit: Value, found: Value },
    ExclusiveMinimum { limit: Value, found: Value },
    /// The `false` schema rejects everything.
    FalseSchema,
    /// The string does not conform to a known format.
    Format { format: String },
    /// The format attribute is not known; the instance is not checked.
    UnknownFormat { format: String },
    MaxItems { limit: u64, found: u64 },
    MaxLength { limit: u64, found: u64 },
    MaxProperties { limit: u64, found: u64 },
    Maximum { limit: Value, exclusive: bool, found: Value },
    MinItems { limit: u64, found: u64 },
    MinLength { limit: u64, found: u64 },
    MinProperties { limit: u64, found: u64 },
    Minimum { limit: Value, exclusive: bool, found: Value },
    MultipleOf { divisor: Value, found: Value },
    /// The instance matches the `not` schema.
    Not,
    /// No `oneOf` branch matched.
    OneOfNotValid { branches: usize },
    /// More than one `oneOf` branch matched.
    OneOfMultipleValid { matched: Vec<usize> },
    Pattern { pattern: String },
    Required { missing: Vec<String> },
    Type {
        expected: Vec<String>,
        found: PrimitiveType,
    },
    UniqueItems,
    /// A structural problem with the schema itself.
    Schema(SchemaError),
}

impl MessageKind {
    pub(crate) fn serialize_details<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        match self {
            MessageKind::AdditionalItems { limit, found } => {
                map.serialize_entry("allowed", limit)?;
                map.serialize_entry("found", found)
            }
            MessageKind::AdditionalProperties { unexpected } => {
                map.serialize_entry("unwanted", unexpected)
            }
            MessageKind::AnyOf { branches } | MessageKind::OneOfNotValid { branches } => {
                map.serialize_entry("nrSchemas", branches)
            }
            MessageKind::Constant { expected } => map.serialize_entry("const", expected),
            MessageKind::Contains | MessageKind::FalseSchema | MessageKind::Not => Ok(()),
            MessageKind::UniqueItems => Ok(()),
            MessageKind::Dependencies { property, missing } => {
                map.serialize_entry("property", property)?;
                map.serialize_entry("missing", missing)
            }
            MessageKind::Disallowed { disallowed } => map.serialize_entry("disallowed", disallowed),
            MessageKind::Enum { options } => map.serialize_entry("enum", options),
            MessageKind::ExclusiveMaximum { limit, found }
            | MessageKind::ExclusiveMinimum { limit, found } => {
                map.serialize_entry("limit", limit)?;
                map.serialize_entry("found", found)
            }
            MessageKind::Format { format } | MessageKind::UnknownFormat { format } => {
                map.serialize_entry("attribute", format)
            }
            MessageKind::MaxItems { limit, found }
            | MessageKind::MaxLength { limit, found }
            | MessageKind::MaxProperties { limit, found }
            | MessageKind::MinItems { limit, found }
            | MessageKind::MinLength { limit, found }
            | MessageKind::MinProperties { limit, found } => {
                map.serialize_entry("limit", limit)?;
                map.serialize_entry("found", found)
            }
            MessageKind::Maximum {
                limit,
                exclusive,
                found,
            }
            | MessageKind::Minimum {
                limit,
                exclusive,
                found,
            } => {
                map.serialize_entry("limit", limit)?;
                if *exclusive {
                    map.serialize_entry("exclusive", exclusive)?;
                }
                map.serialize_entry("found", found)
            }
            MessageKind::MultipleOf { divisor, found } => {
                map.serialize_entry("divisor", divisor)?;
                map.serialize_entry("found", found)
            }
            MessageKind::OneOfMultipleValid { matched } => map.serialize_entry("matched", matched),
            MessageKind::Pattern { pattern } => map.serialize_entry("regex", pattern),
            MessageKind::Required { missing } => map.serialize_entry("missing", missing),
            MessageKind::Type { expected, found } => {
                map.serialize_entry("expected", expected)?;
                map.serialize_entry("found", found)
            }
            MessageKind::Schema(error) => {
                map.serialize_entry("error", error.kind_name())?;
                match error {
                    SchemaError::ReferenceLoop { path } => map.serialize_entry("path", path),
                    SchemaError::MalformedSchema { problems } => {
                        map.serialize_entry("problems", problems)
                    }
                    _ => Ok(()),
                }
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
    f.write_str("[")?;
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "\"{item}\"")?;
    }
    f.write_str("]")
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::AdditionalItems { limit, found } => write!(
                f,
                "array is too long and no additional items are allowed (allowed: {limit}, found: {found})"
            ),
            MessageKind::AdditionalProperties { unexpected } => {
                f.write_str("object instance has properties which are not allowed by the schema: ")?;
                write_list(f, unexpected)
            }
            MessageKind::AnyOf { branches } => write!(
                f,
                "instance failed to match at least one required schema among {branches}"
            ),
            MessageKind::Constant { expected } => {
                write!(f, "instance does not match the constant value {expected}")
            }
            MessageKind::Contains => {
                f.write_str("no array item matches the schema given in \"contains\"")
            }
            MessageKind::Dependencies { property, missing } => {
                write!(f, "property \"{property}\" requires missing properties ")?;
                write_list(f, missing)
            }
            MessageKind::Disallowed { disallowed } => {
                write!(f, "instance matches a disallowed type or schema: {disallowed}")
            }
            MessageKind::Enum { options } => {
                write!(f, "instance does not match any enum value ({options})")
            }
            MessageKind::ExclusiveMaximum { limit, found } => write!(
                f,
                "numeric instance is not strictly lower than the exclusive maximum (limit: {limit}, found: {found})"
            ),
            MessageKind::ExclusiveMinimum { limit, found } => write!(
                f,
                "numeric instance is not strictly greater than the exclusive minimum (limit: {limit}, found: {found})"
            ),
            MessageKind::FalseSchema => f.write_str("the false schema does not allow any value"),
            MessageKind::Format { format } => {
                write!(f, "string is not a valid \"{format}\"")
            }
            MessageKind::UnknownFormat { format } => {
                write!(f, "format attribute \"{format}\" is not supported")
            }
            MessageKind::MaxItems { limit, found } => write!(
                f,
                "array is too long (maximum: {limit}, found: {found})"
            ),
            MessageKind::MaxLength { limit, found } => write!(
                f,
                "string is too long (maximum: {limit}, found: {found})"
            ),
            MessageKind::MaxProperties { limit, found } => write!(
                f,
                "object has too many properties (maximum: {limit}, found: {found})"
            ),
            MessageKind::Maximum {
                limit,
                exclusive,
                found,
            } => {
                if *exclusive {
                    write!(f, "numeric instance is not lower than the required maximum (maximum: {limit}, found: {found})")
                } else {
                    write!(f, "numeric instance is greater than the required maximum (maximum: {limit}, found: {found})")
                }
            }
            MessageKind::MinItems { limit, found } => write!(
                f,
                "array is too short (minimum: {limit}, found: {found})"
            ),
            MessageKind::MinLength { limit, found } => write!(
                f,
                "string is too short (minimum: {limit}, found: {found})"
            ),
            MessageKind::MinProperties { limit, found } => write!(
                f,
                "object has too few properties (minimum: {limit}, found: {found})"
            ),
            MessageKind::Minimum {
                limit,
                exclusive,
                found,
            } => {
                if *exclusive {
                    write!(f, "numeric instance is not greater than the required minimum (minimum: {limit}, found: {found})")
                } else {
                    write!(f, "numeric instance is lower than the required minimum (minimum: {limit}, found: {found})")
                }
            }
            MessageKind::MultipleOf { divisor, found } => write!(
                f,
                "remainder of division is not zero ({found} / {divisor})"
            ),
            MessageKind::Not => {
                f.write_str("instance matched a schema which it should not have")
            }
            MessageKind::OneOfNotValid { branches } => write!(
                f,
                "instance failed to match exactly one schema (matched 0 out of {branches})"
            ),
            MessageKind::OneOfMultipleValid { matched } => write!(
                f,
                "instance failed to match exactly one schema (matched {} out of several: {matched:?})",
                matched.len()
            ),
            MessageKind::Pattern { pattern } => {
                write!(f, "string does not match the regex \"{pattern}\"")
            }
            MessageKind::Required { missing } => {
                f.write_str("object has missing required properties ")?;
                write_list(f, missing)
            }
            MessageKind::Type { expected, found } => {
                write!(f, "instance type ({found}) does not match any allowed primitive type (allowed: ")?;
                write_list(f, expected)?;
                f.write_str(")")
            }
            MessageKind::UniqueItems => f.write_str("array must not contain duplicate elements"),
            MessageKind::Schema(error) => fmt::Display::fmt(error, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_lists_every_missing_property() {
        let kind = MessageKind::Required {
            missing: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            kind.to_string(),
            r#"object has missing required properties ["a", "b"]"#
        );
    }

    #[test]
    fn type_mentions_found_and_allowed() {
        let kind = MessageKind::Type {
            expected: vec!["integer".to_string()],
            found: PrimitiveType::String,
        };
        assert_eq!(
            kind.to_string(),
            r#"instance type (string) does not match any allowed primitive type (allowed: ["integer"])"#
        );
    }

    #[test]
    fn reference_loop_shows_path() {
        let error = SchemaError::ReferenceLoop {
            path: vec!["a#/x".to_string(), "a#/y".to_string(), "a#/x".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "reference loop detected: a#/x -> a#/y -> a#/x"
        );
    }

    #[test]
    fn minimum_text() {
        let kind = MessageKind::Minimum {
            limit: json!(0),
            exclusive: false,
            found: json!(-1),
        };
        assert_eq!(
            kind.to_string(),
            "numeric instance is lower than the required minimum (minimum: 0, found: -1)"
        );
    }
}
