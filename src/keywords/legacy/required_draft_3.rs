use crate::{
    error::{MessageKind, ProcessingError},
    keywords::KeywordValidator,
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

/// Draft 3 marks required properties with `"required": true` inside `properties`.
#[derive(Debug)]
pub(crate) struct RequiredDraft3Validator {
    required: Vec<String>,
}

impl RequiredDraft3Validator {
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
        report.log(frame.error("properties", MessageKind::Required { missing }))
    }
}

#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    let required: Vec<String> = schema
        .as_object()?
        .iter()
        .filter(|(_, subschema)| subschema.get("required") == Some(&Value::Bool(true)))
        .map(|(name, _)| name.clone())
        .collect();
    if required.is_empty() {
        return None;
    }
    Some(KeywordValidator::RequiredDraft3(RequiredDraft3Validator {
        required,
    }))
}
