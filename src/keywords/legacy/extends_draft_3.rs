use crate::{
    keywords::{all_of::AllOfValidator, KeywordValidator},
    paths::JsonPointer,
};
use serde_json::Value;

/// `extends` takes a single schema or an array of them; either way it behaves like `allOf`.
#[inline]
pub(crate) fn compile(schema: &Value) -> Option<KeywordValidator> {
    let base = JsonPointer::new().join("extends");
    let branches = match schema {
        Value::Object(_) => vec![base],
        Value::Array(items) => (0..items.len()).map(|idx| base.join(idx)).collect(),
        _ => return None,
    };
    Some(KeywordValidator::AllOf(AllOfValidator::new(branches)))
}
