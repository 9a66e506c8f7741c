use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, CompileContext, KeywordValidator},
    pipeline::Frame,
    report::Report,
    schemas::Draft,
};
use serde_json::{Map, Number, Value};
use std::cmp::Ordering;

#[derive(Debug)]
pub(crate) struct MaximumValidator {
    limit: Number,
    exclusive: bool,
}

impl MaximumValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Number(found) = frame.instance else {
            return Ok(());
        };
        let valid = match helpers::compare(found, &self.limit) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => !self.exclusive,
            _ => false,
        };
        if valid {
            return Ok(());
        }
        report.log(frame.error(
            "maximum",
            MessageKind::Maximum {
                limit: Value::Number(self.limit.clone()),
                exclusive: self.exclusive,
                found: frame.instance.clone(),
            },
        ))
    }
}

/// In drafts 3 and 4 `exclusiveMaximum` is a boolean modifier of `maximum`.
#[inline]
pub(crate) fn compile(
    ctx: &CompileContext<'_>,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<KeywordValidator> {
    let limit = schema.as_number()?.clone();
    let exclusive = matches!(ctx.draft, Draft::Draft3 | Draft::Draft4)
        && parent.get("exclusiveMaximum") == Some(&Value::Bool(true));
    Some(KeywordValidator::Maximum(MaximumValidator { limit, exclusive }))
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Draft};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maximum": 3}), &json!(3))]
    #[test_case(&json!({"maximum": 3}), &json!(2.5))]
    #[test_case(&json!({"maximum": 3.5}), &json!(3))]
    #[test_case(&json!({"maximum": 3}), &json!("4"); "ignores strings")]
    #[test_case(&json!({"maximum": 18446744073709551615_u64}), &json!(18446744073709551615_u64))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"maximum": 3}), &json!(3.5))]
    #[test_case(&json!({"maximum": -1}), &json!(0))]
    #[test_case(&json!({"maximum": 18446744073709551614_u64}), &json!(18446744073709551615_u64))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::assert_keyword(schema, instance, "maximum")
    }

    #[test_case(Draft::Draft4, &json!(3), false)]
    #[test_case(Draft::Draft4, &json!(2), true)]
    #[test_case(Draft::Draft3, &json!(3), false)]
    fn boolean_exclusive_maximum(draft: Draft, instance: &Value, expected: bool) {
        let schema = json!({"maximum": 3, "exclusiveMaximum": true});
        assert_eq!(tests_util::is_valid_with_draft(draft, &schema, instance), expected);
    }
}
