use crate::{
    error::ProcessingError,
    keywords::KeywordValidator,
    paths::JsonPointer,
    pipeline::{Frame, Pipeline},
    report::Report,
};
use serde_json::Value;

/// Validates every property name, as a string instance, at the object's own location.
#[derive(Debug)]
pub(crate) struct PropertyNamesValidator {
    subschema: JsonPointer,
}

impl PropertyNamesValidator {
    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Object(item) = frame.instance else {
            return Ok(());
        };
        for name in item.keys() {
            let instance = Value::String(name.clone());
            let sub = pipeline.validate_child(
                frame,
                &self.subschema,
                &instance,
                frame.instance_path,
                report.thresholds(),
            )?;
            report.merge(sub)?;
            if pipeline.should_stop(report) {
                break;
            }
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn compile() -> Option<KeywordValidator> {
    Some(KeywordValidator::PropertyNames(PropertyNamesValidator {
        subschema: JsonPointer::new().join("propertyNames"),
    }))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"abc": 1}))]
    #[test_case(&json!({"propertyNames": false}), &json!({}))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test]
    fn reports_at_object_location() {
        let schema = json!({"properties": {"inner": {"propertyNames": {"pattern": "^a"}}}});
        let errors = tests_util::errors(&schema, &json!({"inner": {"ab": 1, "ba": 2}}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword, Some("pattern"));
        assert_eq!(errors[0].instance_path.to_string(), "/inner");
    }
}
