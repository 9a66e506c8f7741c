use crate::{
    error::{MessageKind, ProcessingError},
    keywords::KeywordValidator,
    paths::JsonPointer,
    pipeline::{Frame, Pipeline},
    report::Report,
};
use serde_json::Value;

/// The first matching branch wins. When none matches, a summary is followed by every branch's
/// messages.
#[derive(Debug)]
pub(crate) struct AnyOfValidator {
    branches: Vec<JsonPointer>,
}

impl AnyOfValidator {
    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let thresholds = report.thresholds().isolated();
        let mut failures = Vec::with_capacity(self.branches.len());
        for branch in &self.branches {
            let sub = pipeline.validate_subschema(frame, branch, thresholds)?;
            if sub.has_fatal() {
                return report.merge(sub);
            }
            if sub.is_success() {
                return Ok(());
            }
            failures.push(sub);
        }
        report.log(frame.error(
            "anyOf",
            MessageKind::AnyOf {
                branches: self.branches.len(),
            },
        ))?;
        for failure in failures {
            report.merge(failure)?;
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    let base = JsonPointer::new().join("anyOf");
    let branches = (0..schema.as_array()?.len())
        .map(|idx| base.join(idx))
        .collect();
    Some(KeywordValidator::AnyOf(AnyOfValidator { branches }))
}
