use crate::{
    error::{MessageKind, ProcessingError},
    keywords::KeywordValidator,
    pipeline::Frame,
    report::Report,
};
use serde_json::{Map, Value};

/// `"additionalItems": false` next to a positional `items` array.
///
/// A schema-valued `additionalItems` does not constrain the array itself; the pipeline applies
/// it to every item past the positional ones.
#[derive(Debug)]
pub(crate) struct AdditionalItemsValidator {
    limit: usize,
}

impl AdditionalItemsValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Array(items) = frame.instance else {
            return Ok(());
        };
        if items.len() <= self.limit {
            return Ok(());
        }
        report.log(frame.error(
            "additionalItems",
            MessageKind::AdditionalItems {
                limit: self.limit,
                found: items.len(),
            },
        ))
    }
}

#[inline]
pub(crate) fn compile(parent: &Map<String, Value>, schema: &Value) -> Option<KeywordValidator> {
    match (schema, parent.get("items")) {
        (Value::Bool(false), Some(Value::Array(items))) => Some(
            KeywordValidator::AdditionalItems(AdditionalItemsValidator { limit: items.len() }),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"items": [{}, {}], "additionalItems": false}), &json!([1, 2]))]
    #[test_case(&json!({"items": {}, "additionalItems": false}), &json!([1, 2, 3]); "items is a schema")]
    #[test_case(&json!({"additionalItems": false}), &json!([1, 2, 3]); "no items")]
    #[test_case(&json!({"items": [{}], "additionalItems": {"type": "integer"}}), &json!(["a", 2, 3]))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test]
    fn too_many_items() {
        let schema = json!({"items": [{}, {}], "additionalItems": false});
        tests_util::assert_keyword(&schema, &json!([1, 2, 3]), "additionalItems");
    }

    #[test]
    fn schema_applies_past_positional_items() {
        let schema = json!({"items": [{}], "additionalItems": {"type": "integer"}});
        let errors = tests_util::errors(&schema, &json!([null, 1, "two"]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].instance_path.to_string(), "/2");
        assert_eq!(errors[0].schema.pointer().to_string(), "/additionalItems");
    }
}
