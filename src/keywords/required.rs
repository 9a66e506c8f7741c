use crate::{
    error::{MessageKind, ProcessingError},
    keywords::KeywordValidator,
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

/// Reports all missing properties in one message.
#[derive(Debug)]
pub(crate) struct RequiredValidator {
    required: Vec<String>,
}

impl RequiredValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Object(item) = frame.instance else {
            return Ok(());
        };
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|name| !item.contains_key(name.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        report.log(frame.error("required", MessageKind::Required { missing }))
    }
}

#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    let required = schema
        .as_array()?
        .iter()
        .map(|name| name.as_str().map(String::from))
        .collect::<Option<Vec<_>>>()?;
    if required.is_empty() {
        return None;
    }
    Some(KeywordValidator::Required(RequiredValidator { required }))
}
