use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::{Number, Value};
use std::cmp::Ordering;

#[derive(Debug)]
pub(crate) struct ExclusiveMinimumValidator {
    limit: Number,
}

impl ExclusiveMinimumValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Number(found) = frame.instance else {
            return Ok(());
        };
        if helpers::compare(found, &self.limit) == Some(Ordering::Greater) {
            return Ok(());
        }
        report.log(frame.error(
            "exclusiveMinimum",
            MessageKind::ExclusiveMinimum {
                limit: Value::Number(self.limit.clone()),
                found: frame.instance.clone(),
            },
        ))
    }
}

#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    let limit = schema.as_number()?.clone();
    Some(KeywordValidator::ExclusiveMinimum(
        ExclusiveMinimumValidator { limit },
    ))
}
