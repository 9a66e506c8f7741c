use crate::{
    error::ProcessingError,
    keywords::KeywordValidator,
    paths::JsonPointer,
    pipeline::{Frame, Pipeline},
    report::Report,
};
use serde_json::{Map, Value};

/// The outcome of `if` picks `then` or `else`. Messages from `if` itself are never reported.
#[derive(Debug)]
pub(crate) struct IfThenElseValidator {
    condition: JsonPointer,
    then: Option<JsonPointer>,
    otherwise: Option<JsonPointer>,
}

impl IfThenElseValidator {
    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let condition =
            pipeline.validate_subschema(frame, &self.condition, report.thresholds().isolated())?;
        if condition.has_fatal() {
            return report.merge(condition);
        }
        let branch = if condition.is_success() {
            &self.then
        } else {
            &self.otherwise
        };
        if let Some(branch) = branch {
            let sub = pipeline.validate_subschema(frame, branch, report.thresholds())?;
            report.merge(sub)?;
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn compile(parent: &Map<String, Value>) -> Option<KeywordValidator> {
    let then = parent
        .contains_key("then")
        .then(|| JsonPointer::new().join("then"));
    let otherwise = parent
        .contains_key("else")
        .then(|| JsonPointer::new().join("else"));
    if then.is_none() && otherwise.is_none() {
        return None;
    }
    Some(KeywordValidator::If(IfThenElseValidator {
        condition: JsonPointer::new().join("if"),
        then,
        otherwise,
    }))
}
