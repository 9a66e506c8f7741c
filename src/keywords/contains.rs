use crate::{
    error::{MessageKind, ProcessingError},
    keywords::KeywordValidator,
    paths::JsonPointer,
    pipeline::{Frame, Pipeline},
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct ContainsValidator {
    subschema: JsonPointer,
}

impl ContainsValidator {
    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Array(items) = frame.instance else {
            return Ok(());
        };
        let thresholds = report.thresholds().isolated();
        for (idx, item) in items.iter().enumerate() {
            let path = frame.instance_path.join(idx);
            let sub = pipeline.validate_child(frame, &self.subschema, item, &path, thresholds)?;
            if sub.has_fatal() {
                return report.merge(sub);
            }
            if sub.is_success() {
                return Ok(());
            }
        }
        report.log(frame.error("contains", MessageKind::Contains))
    }
}

#[inline]
pub(crate) fn compile() -> Option<KeywordValidator> {
    Some(KeywordValidator::Contains(ContainsValidator {
        subschema: JsonPointer::new().join("contains"),
    }))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([1, 6]))]
    #[test_case(&json!({"contains": true}), &json!([null]))]
    #[test_case(&json!({"contains": {"minimum": 5}}), &json!({"a": 1}); "ignores objects")]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"contains": {"minimum": 5}}), &json!([1, 2]))]
    #[test_case(&json!({"contains": {}}), &json!([]); "empty array")]
    #[test_case(&json!({"contains": false}), &json!([1]))]
    fn invalid(schema: &Value, instance: &Value) {
        let errors = tests_util::errors(schema, instance);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword, Some("contains"));
    }
}
