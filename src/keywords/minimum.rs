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
pub(crate) struct MinimumValidator {
    limit: Number,
    exclusive: bool,
}

impl MinimumValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Number(found) = frame.instance else {
            return Ok(());
        };
        let valid = match helpers::compare(found, &self.limit) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => !self.exclusive,
            _ => false,
        };
        if valid {
            return Ok(());
        }
        report.log(frame.error(
            "minimum",
            MessageKind::Minimum {
                limit: Value::Number(self.limit.clone()),
                exclusive: self.exclusive,
                found: frame.instance.clone(),
            },
        ))
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &CompileContext<'_>,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<KeywordValidator> {
    let limit = schema.as_number()?.clone();
    let exclusive = matches!(ctx.draft, Draft::Draft3 | Draft::Draft4)
        && parent.get("exclusiveMinimum") == Some(&Value::Bool(true));
    Some(KeywordValidator::Minimum(MinimumValidator { limit, exclusive }))
}
