use crate::{
    error::{MessageKind, ProcessingError},
    keywords::KeywordValidator,
    paths::JsonPointer,
    pipeline::{Frame, Pipeline},
    report::Report,
};

#[derive(Debug)]
pub(crate) struct NotValidator {
    negated: JsonPointer,
}

impl NotValidator {
    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let sub = pipeline.validate_subschema(frame, &self.negated, report.thresholds().isolated())?;
        if sub.has_fatal() {
            return report.merge(sub);
        }
        if sub.is_success() {
            return report.log(frame.error("not", MessageKind::Not));
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn compile() -> Option<KeywordValidator> {
    Some(KeywordValidator::Not(NotValidator {
        negated: JsonPointer::new().join("not"),
    }))
}
