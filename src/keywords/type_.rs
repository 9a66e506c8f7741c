use crate::{
    error::{MessageKind, ProcessingError},
    keywords::{helpers, KeywordValidator},
    pipeline::Frame,
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    report::Report,
    schemas::Draft,
};
use serde_json::Value;
use std::convert::TryFrom;

#[derive(Debug)]
pub(crate) struct TypeValidator {
    draft: Draft,
    types: PrimitiveTypesBitMap,
}

impl TypeValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        if self
            .types
            .into_iter()
            .any(|expected| helpers::is_of_type(self.draft, frame.instance, expected))
        {
            return Ok(());
        }
        report.log(frame.error(
            "type",
            MessageKind::Type {
                expected: self.types.into_iter().map(|ty| ty.to_string()).collect(),
                found: PrimitiveType::from(frame.instance),
            },
        ))
    }
}

#[inline]
pub(crate) fn compile(draft: Draft, schema: &Value) -> Option<KeywordValidator> {
    let types = match schema {
        Value::String(name) => {
            PrimitiveTypesBitMap::only(PrimitiveType::try_from(name.as_str()).ok()?)
        }
        Value::Array(names) => names
            .iter()
            .map(|name| {
                name.as_str()
                    .and_then(|name| PrimitiveType::try_from(name).ok())
            })
            .collect::<Option<PrimitiveTypesBitMap>>()?,
        _ => return None,
    };
    Some(KeywordValidator::Type(TypeValidator { draft, types }))
}
