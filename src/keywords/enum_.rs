use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct EnumValidator {
    options: Value,
}

impl EnumValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let matched = self
            .options
            .as_array()
            .map_or(false, |options| {
                options
                    .iter()
                    .any(|option| helpers::equal(option, frame.instance))
            });
        if matched {
            return Ok(());
        }
        report.log(frame.error(
            "enum",
            MessageKind::Enum {
                options: self.options.clone(),
            },
        ))
    }
}

#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    match schema {
        Value::Array(_) => Some(KeywordValidator::Enum(EnumValidator {
            options: schema.clone(),
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"enum": [1, "a", null]}), &json!(1.0))]
    #[test_case(&json!({"enum": [[1, 2], {"a": 1}]}), &json!({"a": 1}))]
    #[test_case(&json!({"enum": [false]}), &json!(false))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"enum": [1, "a", null]}), &json!("b"))]
    #[test_case(&json!({"enum": [false]}), &json!(0))]
    #[test_case(&json!({"enum": [[1, 2]]}), &json!([2, 1]))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::assert_keyword(schema, instance, "enum")
    }
}
