use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct UniqueItemsValidator;

impl UniqueItemsValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Array(items) = frame.instance else {
            return Ok(());
        };
        if is_unique(items) {
            return Ok(());
        }
        report.log(frame.error("uniqueItems", MessageKind::UniqueItems))
    }
}

fn is_unique(items: &[Value]) -> bool {
    items.iter().enumerate().all(|(idx, item)| {
        items[idx + 1..]
            .iter()
            .all(|other| !helpers::equal(item, other))
    })
}

#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    match schema {
        Value::Bool(true) => Some(KeywordValidator::UniqueItems(UniqueItemsValidator)),
        _ => None,
    }
}
