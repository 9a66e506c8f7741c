use crate::{
    error::ProcessingError,
    keywords::KeywordValidator,
    paths::JsonPointer,
    pipeline::{Frame, Pipeline},
    report::Report,
};
use serde_json::Value;

/// `allOf`, and `extends` in draft 3.
///
/// Branches run in order and the first failing one ends the evaluation. Its report is the only
/// one kept: messages from earlier passing branches are dropped, and there is no summary.
#[derive(Debug)]
pub(crate) struct AllOfValidator {
    branches: Vec<JsonPointer>,
}

impl AllOfValidator {
    pub(crate) fn new(branches: Vec<JsonPointer>) -> Self {
        AllOfValidator { branches }
    }

    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let mut passed = Vec::with_capacity(self.branches.len());
        for branch in &self.branches {
            let sub = pipeline.validate_subschema(frame, branch, report.thresholds())?;
            if !sub.is_success() {
                return report.merge(sub);
            }
            passed.push(sub);
        }
        for sub in passed {
            report.merge(sub)?;
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn compile(keyword: &'static str, schema: &Value) -> Option<KeywordValidator> {
    let branches = schema.as_array()?.len();
    let base = JsonPointer::new().join(keyword);
    Some(KeywordValidator::AllOf(AllOfValidator::new(
        (0..branches).map(|idx| base.join(idx)).collect(),
    )))
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, LogLevel, Validator};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3))]
    #[test_case(&json!({"allOf": [{}, true]}), &json!(null))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test]
    fn stops_at_first_failing_branch() {
        let schema = json!({"allOf": [{"type": "string"}, {"minimum": 10}]});
        let errors = tests_util::errors(&schema, &json!(3));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword, Some("type"));
        assert_eq!(errors[0].schema.pointer().to_string(), "/allOf/0");
    }

    #[test]
    fn later_branch_failure() {
        let schema = json!({"allOf": [{"type": "integer"}, {"minimum": 10}]});
        let errors = tests_util::errors(&schema, &json!(3));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword, Some("minimum"));
        assert_eq!(errors[0].schema.pointer().to_string(), "/allOf/1");
    }

    #[test]
    fn passing_branches_leave_no_messages_on_failure() {
        let schema = json!({"allOf": [{"format": "no-such-format"}, {"maxLength": 1}]});
        let report = Validator::new(&schema)
            .expect("Valid schema")
            .validate(&json!("ab"))
            .expect("Should not escalate");
        assert!(!report.is_success());
        let keywords: Vec<_> = report.messages().iter().map(|m| m.keyword).collect();
        assert_eq!(keywords, [Some("maxLength")]);
    }

    #[test]
    fn passing_branches_keep_their_messages_on_success() {
        let schema = json!({"allOf": [{"format": "no-such-format"}, {"maxLength": 5}]});
        let report = Validator::new(&schema)
            .expect("Valid schema")
            .validate(&json!("ab"))
            .expect("Should not escalate");
        assert!(report.is_success());
        assert_eq!(report.messages().len(), 1);
        assert_eq!(report.messages()[0].level, LogLevel::Info);
    }
}
