use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct MinPropertiesValidator {
    limit: u64,
}

impl MinPropertiesValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Object(item) = frame.instance else {
            return Ok(());
        };
        let found = item.len() as u64;
        if found < self.limit {
            return report.log(frame.error(
                "minProperties",
                MessageKind::MinProperties {
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
    Some(KeywordValidator::MinProperties(MinPropertiesValidator { limit }))
}
