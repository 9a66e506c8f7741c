use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct MaxItemsValidator {
    limit: u64,
}

impl MaxItemsValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Array(items) = frame.instance else {
            return Ok(());
        };
        let found = items.len() as u64;
        if found > self.limit {
            return report.log(frame.error(
                "maxItems",
                MessageKind::MaxItems {
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
    Some(KeywordValidator::MaxItems(MaxItemsValidator { limit }))
}
