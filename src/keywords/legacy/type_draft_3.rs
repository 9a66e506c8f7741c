use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    paths::JsonPointer,
    pipeline::{Frame, Pipeline},
    primitive_type::PrimitiveType,
    report::Report,
    schemas::Draft,
};
use serde_json::Value;
use std::convert::TryFrom;

#[derive(Debug)]
enum TypeEntry {
    Primitive(PrimitiveType),
    Any,
    Schema(JsonPointer),
}

enum Outcome {
    Matched(bool),
    /// A schema entry could not be evaluated.
    Fatal(Report),
}

/// Draft 3 `type` and `disallow`: entries are type names, `"any"`, or schemas.
///
/// `disallow` fails when the instance matches any entry.
#[derive(Debug)]
pub(crate) struct TypeDraft3Validator {
    keyword: &'static str,
    entries: Vec<TypeEntry>,
    declared: Value,
}

impl TypeDraft3Validator {
    fn matches(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &Report,
    ) -> Result<Outcome, ProcessingError> {
        for entry in &self.entries {
            let matched = match entry {
                TypeEntry::Any => true,
                TypeEntry::Primitive(expected) => {
                    helpers::is_of_type(Draft::Draft3, frame.instance, *expected)
                }
                TypeEntry::Schema(relative) => {
                    let sub = pipeline.validate_subschema(
                        frame,
                        relative,
                        report.thresholds().isolated(),
                    )?;
                    if sub.has_fatal() {
                        return Ok(Outcome::Fatal(sub));
                    }
                    sub.is_success()
                }
            };
            if matched {
                return Ok(Outcome::Matched(true));
            }
        }
        Ok(Outcome::Matched(false))
    }

    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let matched = match self.matches(pipeline, frame, report)? {
            Outcome::Matched(matched) => matched,
            Outcome::Fatal(fatal) => return report.merge(fatal),
        };
        match (self.keyword, matched) {
            ("disallow", true) => report.log(frame.error(
                "disallow",
                MessageKind::Disallowed {
                    disallowed: self.declared.clone(),
                },
            )),
            ("type", false) => report.log(frame.error(
                "type",
                MessageKind::Type {
                    expected: self.expected(),
                    found: PrimitiveType::from(frame.instance),
                },
            )),
            _ => Ok(()),
        }
    }

    fn expected(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                TypeEntry::Primitive(ty) => Some(ty.to_string()),
                TypeEntry::Any => Some("any".to_string()),
                TypeEntry::Schema(_) => None,
            })
            .collect()
    }
}

fn entry(keyword: &str, idx: Option<usize>, value: &Value) -> Option<TypeEntry> {
    match value {
        Value::String(name) if name == "any" => Some(TypeEntry::Any),
        Value::String(name) => PrimitiveType::try_from(name.as_str())
            .ok()
            .map(TypeEntry::Primitive),
        Value::Object(_) => {
            let relative = JsonPointer::new().join(keyword);
            Some(TypeEntry::Schema(match idx {
                Some(idx) => relative.join(idx),
                None => relative,
            }))
        }
        _ => None,
    }
}

#[inline]
pub(crate) fn compile(keyword: &'static str, schema: &Value) -> Option<KeywordValidator> {
    let entries = match schema {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| entry(keyword, Some(idx), item))
            .collect(),
        _ => vec![entry(keyword, None, schema)?],
    };
    Some(KeywordValidator::TypeDraft3(TypeDraft3Validator {
        keyword,
        entries,
        declared: schema.clone(),
    }))
}
