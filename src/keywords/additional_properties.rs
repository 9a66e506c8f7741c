use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{CompileContext, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use ahash::AHashSet;
use serde_json::{Map, Value};

/// `"additionalProperties": false`: every property must be declared in `properties` or match
/// one of the `patternProperties`.
pub(crate) struct AdditionalPropertiesValidator {
    properties: AHashSet<String>,
    patterns: Vec<fancy_regex::Regex>,
}

impl core::fmt::Debug for AdditionalPropertiesValidator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdditionalPropertiesValidator")
            .field("properties", &self.properties)
            .field(
                "patterns",
                &self.patterns.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl AdditionalPropertiesValidator {
    fn is_declared(&self, property: &str) -> bool {
        self.properties.contains(property)
            || self
                .patterns
                .iter()
                .any(|pattern| pattern.is_match(property).unwrap_or(false))
    }

    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Object(item) = frame.instance else {
            return Ok(());
        };
        let unexpected: Vec<String> = item
            .keys()
            .filter(|property| !self.is_declared(property))
            .cloned()
            .collect();
        if unexpected.is_empty() {
            return Ok(());
        }
        report.log(frame.error(
            "additionalProperties",
            MessageKind::AdditionalProperties { unexpected },
        ))
    }
}

#[inline]
pub(crate) fn compile(
    ctx: &CompileContext<'_>,
    parent: &Map<String, Value>,
    schema: &Value,
) -> Option<KeywordValidator> {
    if schema != &Value::Bool(false) {
        return None;
    }
    let properties = parent
        .get("properties")
        .and_then(Value::as_object)
        .map(|properties| properties.keys().cloned().collect())
        .unwrap_or_default();
    let patterns = parent
        .get("patternProperties")
        .and_then(Value::as_object)
        .map(|patterns| {
            patterns
                .keys()
                .filter_map(|pattern| ctx.regexes.get_or_compile(pattern).ok())
                .collect()
        })
        .unwrap_or_default();
    Some(KeywordValidator::AdditionalProperties(
        AdditionalPropertiesValidator {
            properties,
            patterns,
        },
    ))
}
