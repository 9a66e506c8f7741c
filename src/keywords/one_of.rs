use crate::{
    error::{MessageKind, ProcessingError},
    keywords::KeywordValidator,
    paths::JsonPointer,
    pipeline::{Frame, Pipeline},
    report::Report,
};
use serde_json::Value;

/// Exactly one branch must match.
#[derive(Debug)]
pub(crate) struct OneOfValidator {
    branches: Vec<JsonPointer>,
}

impl OneOfValidator {
    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let thresholds = report.thresholds().isolated();
        let mut matched = Vec::new();
        let mut failures = Vec::new();
        for (idx, branch) in self.branches.iter().enumerate() {
            let sub = pipeline.validate_subschema(frame, branch, thresholds)?;
            if sub.has_fatal() {
                return report.merge(sub);
            }
            if sub.is_success() {
                matched.push(idx);
                if matched.len() > 1 {
                    // The outcome can not change any more.
                    break;
                }
            } else {
                failures.push(sub);
            }
        }
        match matched.len() {
            1 => Ok(()),
            0 => {
                report.log(frame.error(
                    "oneOf",
                    MessageKind::OneOfNotValid {
                        branches: self.branches.len(),
                    },
                ))?;
                for failure in failures {
                    report.merge(failure)?;
                }
                Ok(())
            }
            _ => report.log(frame.error("oneOf", MessageKind::OneOfMultipleValid { matched })),
        }
    }
}

#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    let base = JsonPointer::new().join("oneOf");
    let branches = (0..schema.as_array()?.len())
        .map(|idx| base.join(idx))
        .collect();
    Some(KeywordValidator::OneOf(OneOfValidator { branches }))
}
