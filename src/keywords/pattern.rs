use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{CompileContext, KeywordValidator},
    pipeline::Frame,
    report::Report,
};
use serde_json::Value;

#[derive(Debug)]
pub(crate) struct PatternValidator {
    original: String,
    pattern: fancy_regex::Regex,
}

impl PatternValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::String(item) = frame.instance else {
            return Ok(());
        };
        // A backtracking limit is treated as a mismatch.
        if self.pattern.is_match(item).unwrap_or(false) {
            return Ok(());
        }
        report.log(frame.error(
            "pattern",
            MessageKind::Pattern {
                pattern: self.original.clone(),
            },
        ))
    }
}

#[inline]
pub(crate) fn compile(ctx: &CompileContext<'_>, schema: &Value) -> Option<KeywordValidator> {
    let original = schema.as_str()?;
    let pattern = ctx.regexes.get_or_compile(original).ok()?;
    Some(KeywordValidator::Pattern(PatternValidator {
        original: original.to_string(),
        pattern,
    }))
}
