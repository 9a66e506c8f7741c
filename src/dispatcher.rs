//! Selecting and compiling the keyword validators of a schema fragment.
use crate::{
    cache::{RegexCache, ValidatorCache},
    keywords::{format::Formats, CompileContext, KeywordValidator},
    primitive_type::PrimitiveType,
    tree::SchemaTree,
};
use serde_json::Value;
use std::sync::Arc;

/// The compiled validators of one fragment for one instance type.
#[derive(Debug, Default)]
pub(crate) struct ValidatorSet {
    validators: Vec<KeywordValidator>,
}

impl ValidatorSet {
    pub(crate) fn iter(&self) -> impl Iterator<Item = &KeywordValidator> {
        self.validators.iter()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.validators.len()
    }
}

/// Maps `(fragment, instance type)` to the validators that apply.
///
/// Unknown keywords and keywords that say nothing about the instance type contribute nothing.
/// This never fails: fragments have passed the syntax check before they get here.
pub(crate) struct KeywordDispatcher {
    cache: ValidatorCache<ValidatorSet>,
    regexes: Arc<RegexCache>,
    formats: Formats,
    validate_formats: bool,
}

impl KeywordDispatcher {
    pub(crate) fn new(
        cache_enabled: bool,
        regexes: Arc<RegexCache>,
        formats: Formats,
        validate_formats: bool,
    ) -> Self {
        KeywordDispatcher {
            cache: ValidatorCache::new(cache_enabled),
            regexes,
            formats,
            validate_formats,
        }
    }

    pub(crate) fn regexes(&self) -> &RegexCache {
        &self.regexes
    }

    pub(crate) fn validators(
        &self,
        tree: &SchemaTree,
        instance_type: PrimitiveType,
    ) -> Arc<ValidatorSet> {
        self.cache
            .get_or_build(&tree.location(), instance_type, || {
                self.build(tree, instance_type)
            })
    }

    fn build(&self, tree: &SchemaTree, instance_type: PrimitiveType) -> ValidatorSet {
        let Some(Value::Object(schema)) = tree.node() else {
            return ValidatorSet::default();
        };
        let draft = tree.draft();
        let ctx = CompileContext {
            draft,
            regexes: &self.regexes,
            formats: &self.formats,
            validate_formats: self.validate_formats,
        };
        let validators = schema
            .iter()
            .filter_map(|(name, value)| {
                let Some(keyword) = draft.keyword(name) else {
                    tracing::debug!(
                        keyword = %name,
                        schema = %tree.location(),
                        "ignoring unknown keyword"
                    );
                    return None;
                };
                if !keyword.instance_types().contains_type(instance_type) {
                    return None;
                }
                keyword.compile(&ctx, schema, value)
            })
            .collect();
        ValidatorSet { validators }
    }
}
