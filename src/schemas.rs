use crate::keywords::Keyword;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// JSON Schema Draft version
#[non_exhaustive]
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Draft {
    /// JSON Schema Draft 3
    #[serde(alias = "v3")]
    Draft3,
    /// JSON Schema Draft 4
    #[serde(alias = "v4")]
    Draft4,
    /// JSON Schema Draft 6
    #[serde(alias = "v6")]
    Draft6,
    /// JSON Schema Draft 7
    #[default]
    #[serde(alias = "v7")]
    Draft7,
}

impl Draft {
    /// Look up a keyword by its name. Names that are not keywords in this draft give `None`.
    pub(crate) fn keyword(self, name: &str) -> Option<Keyword> {
        let keyword = match name {
            "$ref" => Keyword::Ref,
            "additionalItems" => Keyword::AdditionalItems,
            "additionalProperties" => Keyword::AdditionalProperties,
            "definitions" => Keyword::Definitions,
            "dependencies" => Keyword::Dependencies,
            "enum" => Keyword::Enum,
            "exclusiveMaximum" => Keyword::ExclusiveMaximum,
            "exclusiveMinimum" => Keyword::ExclusiveMinimum,
            "format" => Keyword::Format,
            "items" => Keyword::Items,
            "maxItems" => Keyword::MaxItems,
            "maxLength" => Keyword::MaxLength,
            "maximum" => Keyword::Maximum,
            "minItems" => Keyword::MinItems,
            "minLength" => Keyword::MinLength,
            "minimum" => Keyword::Minimum,
            "pattern" => Keyword::Pattern,
            "patternProperties" => Keyword::PatternProperties,
            "properties" => Keyword::Properties,
            "required" => Keyword::Required,
            "type" => Keyword::Type,
            "uniqueItems" => Keyword::UniqueItems,
            "id" if matches!(self, Draft::Draft3 | Draft::Draft4) => Keyword::Id,
            "$id" if matches!(self, Draft::Draft6 | Draft::Draft7) => Keyword::Id,
            "disallow" | "divisibleBy" | "extends" if self != Draft::Draft3 => return None,
            "disallow" => Keyword::Disallow,
            "divisibleBy" => Keyword::DivisibleBy,
            "extends" => Keyword::Extends,
            "allOf" | "anyOf" | "maxProperties" | "minProperties" | "multipleOf" | "not"
            | "oneOf"
                if self == Draft::Draft3 =>
            {
                return None
            }
            "allOf" => Keyword::AllOf,
            "anyOf" => Keyword::AnyOf,
            "maxProperties" => Keyword::MaxProperties,
            "minProperties" => Keyword::MinProperties,
            "multipleOf" => Keyword::MultipleOf,
            "not" => Keyword::Not,
            "oneOf" => Keyword::OneOf,
            "const" | "contains" | "propertyNames"
                if matches!(self, Draft::Draft3 | Draft::Draft4) =>
            {
                return None
            }
            "const" => Keyword::Const,
            "contains" => Keyword::Contains,
            "propertyNames" => Keyword::PropertyNames,
            "if" | "then" | "else" if self != Draft::Draft7 => return None,
            "if" => Keyword::If,
            "then" => Keyword::Then,
            "else" => Keyword::Else,
            _ => return None,
        };
        Some(keyword)
    }

    /// The keyword that carries a schema's identifier.
    #[must_use]
    pub const fn id_keyword(self) -> &'static str {
        match self {
            Draft::Draft3 | Draft::Draft4 => "id",
            Draft::Draft6 | Draft::Draft7 => "$id",
        }
    }

    /// Whether `true` and `false` are complete schemas.
    #[must_use]
    pub const fn allows_boolean_schemas(self) -> bool {
        matches!(self, Draft::Draft6 | Draft::Draft7)
    }
}

/// Get the `Draft` from a JSON Schema URL.
#[inline]
pub(crate) fn draft_from_url(url: &str) -> Option<Draft> {
    match url.trim_end_matches('#') {
        "http://json-schema.org/draft-07/schema" => Some(Draft::Draft7),
        "http://json-schema.org/draft-06/schema" => Some(Draft::Draft6),
        "http://json-schema.org/draft-04/schema" => Some(Draft::Draft4),
        "http://json-schema.org/draft-03/schema" => Some(Draft::Draft3),
        _ => None,
    }
}

/// The `$schema` of a document root, if it is an absolute URI.
pub(crate) fn meta_schema_of(schema: &Value) -> Option<Url> {
    schema
        .as_object()
        .and_then(|schema| schema.get("$schema"))
        .and_then(Value::as_str)
        .and_then(|uri| Url::parse(uri).ok())
}

/// Get the `Draft` from a JSON Schema.
#[inline]
pub(crate) fn draft_from_schema(schema: &Value) -> Option<Draft> {
    meta_schema_of(schema).and_then(|url| draft_from_url(url.as_str()))
}

/// The identifier declared by `schema`, if it is an object with a string id.
#[inline]
pub(crate) fn id_of(draft: Draft, schema: &Value) -> Option<&str> {
    schema
        .as_object()
        .and_then(|schema| schema.get(draft.id_keyword()))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(&json!({"$schema": "http://json-schema.org/draft-07/schema#"}), Some(Draft::Draft7))]
    #[test_case(&json!({"$schema": "http://json-schema.org/draft-06/schema"}), Some(Draft::Draft6))]
    #[test_case(&json!({"$schema": "http://json-schema.org/draft-04/schema#"}), Some(Draft::Draft4))]
    #[test_case(&json!({"$schema": "http://json-schema.org/draft-03/schema#"}), Some(Draft::Draft3))]
    #[test_case(&json!({"$schema": "http://example.com/custom/schema#"}), None)]
    #[test_case(&json!({"$schema": "draft-07"}), None; "relative meta schema")]
    #[test_case(&json!({"$schema": 7}), None; "non string meta schema")]
    #[test_case(&json!({}), None)]
    fn test_draft_from_schema(schema: &Value, draft: Option<Draft>) {
        assert_eq!(draft_from_schema(schema), draft)
    }

    #[test_case(Draft::Draft3, &json!({"id": "a"}), Some("a"))]
    #[test_case(Draft::Draft4, &json!({"$id": "a"}), None)]
    #[test_case(Draft::Draft7, &json!({"$id": "a"}), Some("a"))]
    #[test_case(Draft::Draft7, &json!({"$id": 1}), None; "non string id")]
    #[test_case(Draft::Draft7, &json!(["a"]), None; "not an object")]
    fn test_id_of(draft: Draft, schema: &Value, expected: Option<&str>) {
        assert_eq!(id_of(draft, schema), expected)
    }

    #[test_case(Draft::Draft3, "divisibleBy", Some(Keyword::DivisibleBy))]
    #[test_case(Draft::Draft4, "divisibleBy", None)]
    #[test_case(Draft::Draft3, "allOf", None)]
    #[test_case(Draft::Draft4, "allOf", Some(Keyword::AllOf))]
    #[test_case(Draft::Draft4, "const", None)]
    #[test_case(Draft::Draft6, "const", Some(Keyword::Const))]
    #[test_case(Draft::Draft6, "if", None)]
    #[test_case(Draft::Draft7, "if", Some(Keyword::If))]
    #[test_case(Draft::Draft7, "id", None)]
    #[test_case(Draft::Draft7, "unknownKeyword", None)]
    fn keyword_table(draft: Draft, name: &str, expected: Option<Keyword>) {
        assert_eq!(draft.keyword(name), expected)
    }

    #[test]
    fn deserializes_from_config_names() {
        let draft: Draft = serde_json::from_value(json!("draft4")).expect("Valid draft");
        assert_eq!(draft, Draft::Draft4);
        let draft: Draft = serde_json::from_value(json!("v6")).expect("Valid draft");
        assert_eq!(draft, Draft::Draft6);
    }
}
