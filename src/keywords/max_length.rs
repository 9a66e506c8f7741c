use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

/// Length is counted in characters, not bytes.
#[derive(Debug)]
pub(crate) struct MaxLengthValidator {
    limit: u64,
}

impl MaxLengthValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::String(item) = frame.instance else {
            return Ok(());
        };
        let found = bytecount::num_chars(item.as_bytes()) as u64;
        if found > self.limit {
            return report.log(frame.error(
                "maxLength",
                MessageKind::MaxLength {
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
    Some(KeywordValidator::MaxLength(MaxLengthValidator { limit }))
}
