use crate::{
    error::{MessageKind, ProcessingError},
    keywords::KeywordValidator,
    pipeline::Frame,
    report::Report,
};
use fraction::{BigFraction, BigUint};
use serde_json::{Number, Value};

/// `multipleOf`, or `divisibleBy` in draft 3.
#[derive(Debug)]
pub(crate) struct MultipleOfValidator {
    keyword: &'static str,
    divisor: Number,
}

impl MultipleOfValidator {
    fn is_multiple(&self, found: &Number) -> bool {
        if let (Some(item), Some(divisor)) = (found.as_u64(), self.divisor.as_u64()) {
            return item % divisor == 0;
        }
        if let (Some(item), Some(divisor)) = (found.as_i64(), self.divisor.as_i64()) {
            return item % divisor == 0;
        }
        let (Some(item), Some(divisor)) = (found.as_f64(), self.divisor.as_f64()) else {
            return false;
        };
        let quotient = item / divisor;
        if quotient.is_finite() {
            let tolerance = f64::EPSILON * quotient.abs().max(1.) * 4.;
            (quotient - quotient.round()).abs() <= tolerance
        } else {
            // Overflow; fall back to exact arithmetic.
            let fraction = BigFraction::from(item) / BigFraction::from(divisor);
            fraction
                .denom()
                .map_or(false, |denom| denom == &BigUint::from(1_u8))
        }
    }

    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::Number(found) = frame.instance else {
            return Ok(());
        };
        if self.is_multiple(found) {
            return Ok(());
        }
        report.log(frame.error(
            self.keyword,
            MessageKind::MultipleOf {
                divisor: Value::Number(self.divisor.clone()),
                found: frame.instance.clone(),
            },
        ))
    }
}

#[inline]
pub(crate) fn compile(keyword: &'static str, schema: &Value) -> Option<KeywordValidator> {
    let divisor = schema.as_number()?;
    if divisor.as_f64().map_or(true, |value| value <= 0.) {
        return None;
    }
    Some(KeywordValidator::MultipleOf(MultipleOfValidator {
        keyword,
        divisor: divisor.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Draft};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"multipleOf": 2}), &json!(4))]
    #[test_case(&json!({"multipleOf": 2}), &json!(-4))]
    #[test_case(&json!({"multipleOf": 1.5}), &json!(4.5))]
    #[test_case(&json!({"multipleOf": 0.1}), &json!(0.3))]
    #[test_case(&json!({"multipleOf": 0.01}), &json!(19.99))]
    #[test_case(&json!({"multipleOf": 0.0001}), &json!(0.0075))]
    #[test_case(&json!({"multipleOf": 2}), &json!("3"))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"multipleOf": 2}), &json!(7))]
    #[test_case(&json!({"multipleOf": 1.5}), &json!(5))]
    #[test_case(&json!({"multipleOf": 0.1}), &json!(0.35))]
    #[test_case(&json!({"multipleOf": 0.123456789}), &json!(1e308))]
    fn invalid(schema: &Value, instance: &Value) {
        tests_util::assert_keyword(schema, instance, "multipleOf")
    }

    #[test]
    fn divisible_by_in_draft_3() {
        let schema = json!({"divisibleBy": 3});
        assert!(tests_util::is_valid_with_draft(Draft::Draft3, &schema, &json!(9)));
        assert!(!tests_util::is_valid_with_draft(Draft::Draft3, &schema, &json!(10)));
    }
}
