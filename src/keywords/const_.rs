use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct ConstValidator {
    expected: Value,
}

impl ConstValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        if helpers::equal(&self.expected, frame.instance) {
            return Ok(());
        }
        report.log(frame.error(
            "const",
            MessageKind::Constant {
                expected: self.expected.clone(),
            },
        ))
    }
}

#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    Some(KeywordValidator::Const(ConstValidator {
        expected: schema.clone(),
    }))
}
