use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct MaxPropertiesValidator {
    limit: u64,
}

impl MaxPropertiesValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Object(item) = frame.instance else {
            return Ok(());
        };
        let found = item.len() as u64;
        if found > self.limit {
            return report.log(frame.error(
                "maxProperties",
                MessageKind::MaxProperties {
                    limit: self.limit,
                    found,
                },
            ));
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    let limit = helpers::limit_of(schema)?;
    Some(KeywordValidator::MaxProperties(MaxPropertiesValidator { limit }))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maxProperties": 1}), &json!({"a": 1}))]
    #[test_case(&json!({"maxProperties": 0}), &json!([1, 2]); "ignores arrays")]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"maxProperties": 1}), &json!({"a": 1, "b": 2}))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::assert_keyword(schema, instance, "maxProperties")
    }
}
