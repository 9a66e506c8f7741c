//! Structural checks of schema fragments.
//!
//! Only the fragment itself is checked, not its subschemas: those are checked when the pipeline
//! reaches them, so a broken branch that is never evaluated does not fail the whole schema.
use crate::{
    cache::{LruCache, RegexCache, INITIAL_CAPACITY, MAX_CAPACITY},
    keywords::{helpers, Keyword},
    primitive_type::PrimitiveType,
    schemas::Draft,
    tree::{SchemaLocation, SchemaTree},
};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::{convert::TryFrom, fmt, sync::Arc};
use url::Url;

/// One structural problem found in a schema fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxProblem {
    /// The offending keyword, or `None` when the fragment itself has the wrong type.
    pub keyword: Option<String>,
    pub reason: String,
}

impl SyntaxProblem {
    fn new(keyword: Option<&str>, reason: impl Into<String>) -> Self {
        SyntaxProblem {
            keyword: keyword.map(String::from),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SyntaxProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.keyword {
            Some(keyword) => write!(f, "{keyword}: {}", self.reason),
            None => f.write_str(&self.reason),
        }
    }
}

/// Checks fragments and remembers the outcome per location.
pub(crate) struct SyntaxChecker {
    regexes: Arc<RegexCache>,
    checked: Mutex<LruCache<SchemaLocation, Arc<Vec<SyntaxProblem>>>>,
}

impl SyntaxChecker {
    pub(crate) fn new(regexes: Arc<RegexCache>) -> Self {
        SyntaxChecker {
            regexes,
            checked: Mutex::new(LruCache::new(INITIAL_CAPACITY, MAX_CAPACITY)),
        }
    }

    /// Problems with the fragment `tree` points at. Empty if the fragment is well-formed.
    pub(crate) fn check(&self, tree: &SchemaTree) -> Arc<Vec<SyntaxProblem>> {
        let location = tree.location();
        if let Some(problems) = self.checked.lock().get(&location) {
            return Arc::clone(problems);
        }
        let problems = Arc::new(match tree.node() {
            Some(node) => self.check_fragment(tree.draft(), tree.context(), node),
            None => Vec::new(),
        });
        self.checked.lock().insert(location, Arc::clone(&problems));
        problems
    }

    fn check_fragment(&self, draft: Draft, context: &Url, node: &Value) -> Vec<SyntaxProblem> {
        let schema = match node {
            Value::Object(schema) => schema,
            Value::Bool(_) if draft.allows_boolean_schemas() => return Vec::new(),
            _ => {
                let expected = if draft.allows_boolean_schemas() {
                    "an object or a boolean"
                } else {
                    "an object"
                };
                return vec![SyntaxProblem::new(
                    None,
                    format!(
                        "schema must be {expected}, found {}",
                        PrimitiveType::from(node)
                    ),
                )];
            }
        };
        let mut problems = Vec::new();
        for (name, value) in schema {
            let Some(keyword) = draft.keyword(name) else {
                continue;
            };
            if let Err(reason) = self.check_keyword(draft, context, keyword, value) {
                problems.push(SyntaxProblem::new(Some(name), reason));
            }
        }
        problems
    }

    fn check_keyword(
        &self,
        draft: Draft,
        context: &Url,
        keyword: Keyword,
        value: &Value,
    ) -> Result<(), String> {
        let legacy_bounds = matches!(draft, Draft::Draft3 | Draft::Draft4);
        match keyword {
            Keyword::AdditionalItems | Keyword::AdditionalProperties => match value {
                Value::Bool(_) => Ok(()),
                _ => schema(draft, value),
            },
            Keyword::AllOf | Keyword::AnyOf | Keyword::OneOf => match value {
                Value::Array(items) if !items.is_empty() => {
                    items.iter().try_for_each(|item| schema(draft, item))
                }
                _ => Err("must be a non-empty array of schemas".to_string()),
            },
            Keyword::Const => Ok(()),
            Keyword::Contains
            | Keyword::Else
            | Keyword::If
            | Keyword::Not
            | Keyword::PropertyNames
            | Keyword::Then => schema(draft, value),
            Keyword::Definitions | Keyword::Properties => schema_map(draft, value),
            Keyword::PatternProperties => {
                schema_map(draft, value)?;
                value
                    .as_object()
                    .into_iter()
                    .flat_map(|patterns| patterns.keys())
                    .try_for_each(|pattern| self.regex(pattern))
            }
            Keyword::Dependencies => {
                let Value::Object(dependencies) = value else {
                    return Err("must be an object".to_string());
                };
                dependencies
                    .values()
                    .try_for_each(|dependency| match dependency {
                        Value::Array(names) if names.iter().all(Value::is_string) => Ok(()),
                        Value::String(_) if draft == Draft::Draft3 => Ok(()),
                        _ if helpers::is_schema(draft, dependency) => Ok(()),
                        _ => Err("dependency must be an array of strings or a schema".to_string()),
                    })
            }
            Keyword::Disallow | Keyword::Type if draft == Draft::Draft3 => {
                let valid_entry =
                    |entry: &Value| matches!(entry, Value::String(_) | Value::Object(_));
                match value {
                    Value::String(_) => Ok(()),
                    Value::Array(entries) if entries.iter().all(valid_entry) => Ok(()),
                    _ => Err("must be a string or an array of strings and schemas".to_string()),
                }
            }
            Keyword::Type => {
                let known = |name: &Value| {
                    name.as_str()
                        .map_or(false, |name| PrimitiveType::try_from(name).is_ok())
                };
                match value {
                    Value::String(_) if known(value) => Ok(()),
                    Value::Array(names) if names.iter().all(known) => Ok(()),
                    _ => Err("must be a primitive type or an array of them".to_string()),
                }
            }
            Keyword::Disallow => Ok(()),
            Keyword::DivisibleBy | Keyword::MultipleOf => match value.as_f64() {
                Some(divisor) if divisor > 0. => Ok(()),
                _ => Err("must be a number strictly greater than 0".to_string()),
            },
            Keyword::Enum => match value {
                Value::Array(_) => Ok(()),
                _ => Err("must be an array".to_string()),
            },
            Keyword::ExclusiveMaximum | Keyword::ExclusiveMinimum if legacy_bounds => {
                match value {
                    Value::Bool(_) => Ok(()),
                    _ => Err("must be a boolean".to_string()),
                }
            }
            Keyword::ExclusiveMaximum
            | Keyword::ExclusiveMinimum
            | Keyword::Maximum
            | Keyword::Minimum => match value {
                Value::Number(_) => Ok(()),
                _ => Err("must be a number".to_string()),
            },
            Keyword::Extends => match value {
                Value::Array(items) => items.iter().try_for_each(|item| schema(draft, item)),
                _ => schema(draft, value),
            },
            Keyword::Format | Keyword::Id => match value {
                Value::String(_) => Ok(()),
                _ => Err("must be a string".to_string()),
            },
            Keyword::Items => match value {
                Value::Array(items) => items.iter().try_for_each(|item| schema(draft, item)),
                _ => schema(draft, value),
            },
            Keyword::MaxItems
            | Keyword::MaxLength
            | Keyword::MaxProperties
            | Keyword::MinItems
            | Keyword::MinLength
            | Keyword::MinProperties => match helpers::limit_of(value) {
                Some(_) => Ok(()),
                None => Err("must be a non-negative integer".to_string()),
            },
            Keyword::Pattern => match value {
                Value::String(pattern) => self.regex(pattern),
                _ => Err("must be a string".to_string()),
            },
            Keyword::Ref => match value {
                Value::String(reference) => context
                    .join(reference)
                    .map(|_| ())
                    .map_err(|error| format!("'{reference}' is not a valid URI reference: {error}")),
                _ => Err("must be a string".to_string()),
            },
            Keyword::Required if draft == Draft::Draft3 => match value {
                Value::Bool(_) => Ok(()),
                _ => Err("must be a boolean".to_string()),
            },
            Keyword::Required => match value {
                Value::Array(names) if names.iter().all(Value::is_string) => Ok(()),
                _ => Err("must be an array of strings".to_string()),
            },
            Keyword::UniqueItems => match value {
                Value::Bool(_) => Ok(()),
                _ => Err("must be a boolean".to_string()),
            },
        }
    }

    fn regex(&self, pattern: &str) -> Result<(), String> {
        self.regexes
            .get_or_compile(pattern)
            .map(|_| ())
            .map_err(|error| error.to_string())
    }
}

fn schema(draft: Draft, value: &Value) -> Result<(), String> {
    if helpers::is_schema(draft, value) {
        Ok(())
    } else if draft.allows_boolean_schemas() {
        Err("must be a schema (an object or a boolean)".to_string())
    } else {
        Err("must be a schema (an object)".to_string())
    }
}

fn schema_map(draft: Draft, value: &Value) -> Result<(), String> {
    let Value::Object(schemas) = value else {
        return Err("must be an object".to_string());
    };
    schemas.values().try_for_each(|value| schema(draft, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn check(draft: Draft, schema: Value) -> Vec<SyntaxProblem> {
        let tree = SchemaTree::new(
            draft,
            Arc::new(Url::parse("json-schema:///").expect("Valid URI")),
            Arc::new(schema),
        );
        SyntaxChecker::new(Arc::new(RegexCache::default()))
            .check(&tree)
            .to_vec()
    }

    #[test_case(Draft::Draft7, serde_json::json!({"type": "string", "unknown": [1]}))]
    #[test_case(Draft::Draft7, serde_json::json!(true))]
    #[test_case(Draft::Draft7, serde_json::json!({"items": [true, {}], "additionalItems": false}))]
    #[test_case(Draft::Draft4, serde_json::json!({"exclusiveMaximum": true, "maximum": 1}))]
    #[test_case(Draft::Draft3, serde_json::json!({"type": ["string", {}], "required": true}))]
    #[test_case(Draft::Draft3, serde_json::json!({"dependencies": {"a": "b"}}))]
    #[test_case(Draft::Draft7, serde_json::json!({"properties": {"a": {"minLength": -1}}}); "subschemas are not checked")]
    fn well_formed(draft: Draft, schema: Value) {
        assert_eq!(check(draft, schema), vec![]);
    }

    #[test_case(Draft::Draft4, serde_json::json!(true), None)]
    #[test_case(Draft::Draft7, serde_json::json!(1), None)]
    #[test_case(Draft::Draft7, serde_json::json!({"minLength": -1}), Some("minLength"))]
    #[test_case(Draft::Draft7, serde_json::json!({"type": "str"}), Some("type"))]
    #[test_case(Draft::Draft7, serde_json::json!({"required": true}), Some("required"))]
    #[test_case(Draft::Draft3, serde_json::json!({"required": ["a"]}), Some("required"))]
    #[test_case(Draft::Draft7, serde_json::json!({"allOf": []}), Some("allOf"))]
    #[test_case(Draft::Draft4, serde_json::json!({"not": true}), Some("not"))]
    #[test_case(Draft::Draft7, serde_json::json!({"pattern": "(unclosed"}), Some("pattern"))]
    #[test_case(Draft::Draft7, serde_json::json!({"patternProperties": {"[": {}}}), Some("patternProperties"))]
    #[test_case(Draft::Draft7, serde_json::json!({"multipleOf": 0}), Some("multipleOf"))]
    #[test_case(Draft::Draft7, serde_json::json!({"$ref": 1}), Some("$ref"))]
    #[test_case(Draft::Draft7, serde_json::json!({"exclusiveMinimum": true}), Some("exclusiveMinimum"))]
    fn malformed(draft: Draft, schema: Value, keyword: Option<&str>) {
        let problems = check(draft, schema);
        assert_eq!(problems.len(), 1, "{problems:?}");
        assert_eq!(problems[0].keyword.as_deref(), keyword);
    }

    #[test]
    fn problems_are_cached_per_location() {
        let checker = SyntaxChecker::new(Arc::new(RegexCache::default()));
        let tree = SchemaTree::new(
            Draft::Draft7,
            Arc::new(Url::parse("json-schema:///").expect("Valid URI")),
            Arc::new(serde_json::json!({"minItems": "1"})),
        );
        let first = checker.check(&tree);
        let second = checker.check(&tree);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first[0].to_string(), "minItems: must be a non-negative integer");
    }
}
