use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct MinLengthValidator {
    limit: u64,
}

impl MinLengthValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::String(item) = frame.instance else {
            return Ok(());
        };
        let found = bytecount::num_chars(item.as_bytes()) as u64;
        if found < self.limit {
            return report.log(frame.error(
                "minLength",
                MessageKind::MinLength {
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
    Some(KeywordValidator::MinLength(MinLengthValidator { limit }))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minLength": 2}), &json!("ab"))]
    #[test_case(&json!({"minLength": 2}), &json!(["a"]); "ignores arrays")]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"minLength": 2}), &json!("\u{1F600}"))]
    #[test_case(&json!({"minLength": 1}), &json!(""))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::assert_keyword(schema, instance, "minLength")
    }
}
