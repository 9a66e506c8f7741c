//! Keyword validators.
//!
//! Every keyword known to some draft has a [`Keyword`] entry. Keywords that constrain an
//! instance directly compile into a [`KeywordValidator`]; keywords that only address children
//! (`properties`, `items`, ...) or are resolved elsewhere (`$ref`) compile into nothing.
pub(crate) mod additional_items;
pub(crate) mod additional_properties;
pub(crate) mod all_of;
pub(crate) mod any_of;
pub(crate) mod const_;
pub(crate) mod contains;
pub(crate) mod dependencies;
pub(crate) mod enum_;
pub(crate) mod exclusive_maximum;
pub(crate) mod exclusive_minimum;
pub(crate) mod format;
pub(crate) mod helpers;
pub(crate) mod if_;
pub(crate) mod legacy;
pub(crate) mod max_items;
pub(crate) mod max_length;
pub(crate) mod max_properties;
pub(crate) mod maximum;
pub(crate) mod min_items;
pub(crate) mod min_length;
pub(crate) mod min_properties;
pub(crate) mod minimum;
pub(crate) mod multiple_of;
pub(crate) mod not;
pub(crate) mod one_of;
pub(crate) mod pattern;
pub(crate) mod property_names;
pub(crate) mod required;
pub(crate) mod type_;
pub(crate) mod unique_items;

use crate::{
    cache::RegexCache,
    error::ProcessingError,
    pipeline::{Frame, Pipeline},
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    report::Report,
    schemas::Draft,
};
use serde_json::{Map, Value};

/// Everything a keyword needs to compile.
pub(crate) struct CompileContext<'a> {
    pub(crate) draft: Draft,
    pub(crate) regexes: &'a RegexCache,
    pub(crate) formats: &'a format::Formats,
    pub(crate) validate_formats: bool,
}

/// Keywords across all supported drafts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Keyword {
    AdditionalItems,
    AdditionalProperties,
    AllOf,
    AnyOf,
    Const,
    Contains,
    Definitions,
    Dependencies,
    Disallow,
    DivisibleBy,
    Else,
    Enum,
    ExclusiveMaximum,
    ExclusiveMinimum,
    Extends,
    Format,
    Id,
    If,
    Items,
    MaxItems,
    MaxLength,
    MaxProperties,
    Maximum,
    MinItems,
    MinLength,
    MinProperties,
    Minimum,
    MultipleOf,
    Not,
    OneOf,
    Pattern,
    PatternProperties,
    Properties,
    PropertyNames,
    Ref,
    Required,
    Then,
    Type,
    UniqueItems,
}

impl Keyword {
    /// Instance types the keyword has something to say about. Others skip it entirely.
    pub(crate) const fn instance_types(self) -> PrimitiveTypesBitMap {
        match self {
            Keyword::AllOf
            | Keyword::AnyOf
            | Keyword::Const
            | Keyword::Disallow
            | Keyword::Enum
            | Keyword::Extends
            | Keyword::If
            | Keyword::Not
            | Keyword::OneOf
            | Keyword::Type => PrimitiveTypesBitMap::all(),
            Keyword::DivisibleBy
            | Keyword::ExclusiveMaximum
            | Keyword::ExclusiveMinimum
            | Keyword::Maximum
            | Keyword::Minimum
            | Keyword::MultipleOf => PrimitiveTypesBitMap::numeric(),
            Keyword::Format | Keyword::MaxLength | Keyword::MinLength | Keyword::Pattern => {
                PrimitiveTypesBitMap::only(PrimitiveType::String)
            }
            Keyword::AdditionalItems
            | Keyword::Contains
            | Keyword::Items
            | Keyword::MaxItems
            | Keyword::MinItems
            | Keyword::UniqueItems => PrimitiveTypesBitMap::only(PrimitiveType::Array),
            Keyword::AdditionalProperties
            | Keyword::Dependencies
            | Keyword::MaxProperties
            | Keyword::MinProperties
            | Keyword::PatternProperties
            | Keyword::Properties
            | Keyword::PropertyNames
            | Keyword::Required => PrimitiveTypesBitMap::only(PrimitiveType::Object),
            Keyword::Definitions | Keyword::Else | Keyword::Id | Keyword::Ref | Keyword::Then => {
                PrimitiveTypesBitMap::new()
            }
        }
    }

    /// Build the validator for this keyword, or `None` if it does not constrain the instance
    /// on its own.
    ///
    /// The fragment has passed the syntax check, so malformed values are simply skipped.
    pub(crate) fn compile(
        self,
        ctx: &CompileContext<'_>,
        parent: &Map<String, Value>,
        value: &Value,
    ) -> Option<KeywordValidator> {
        let legacy_bounds = matches!(ctx.draft, Draft::Draft3 | Draft::Draft4);
        match self {
            Keyword::AdditionalItems => additional_items::compile(parent, value),
            Keyword::AdditionalProperties => additional_properties::compile(ctx, parent, value),
            Keyword::AllOf => all_of::compile("allOf", value),
            Keyword::AnyOf => any_of::compile(value),
            Keyword::Const => const_::compile(value),
            Keyword::Contains => contains::compile(),
            Keyword::Dependencies => dependencies::compile(ctx, value),
            Keyword::Disallow => legacy::type_draft_3::compile("disallow", value),
            Keyword::DivisibleBy => multiple_of::compile("divisibleBy", value),
            Keyword::Enum => enum_::compile(value),
            Keyword::ExclusiveMaximum if !legacy_bounds => exclusive_maximum::compile(value),
            Keyword::ExclusiveMinimum if !legacy_bounds => exclusive_minimum::compile(value),
            Keyword::Extends => legacy::extends_draft_3::compile(value),
            Keyword::Format => format::compile(ctx, value),
            Keyword::If => if_::compile(parent),
            Keyword::MaxItems => max_items::compile(value),
            Keyword::MaxLength => max_length::compile(value),
            Keyword::MaxProperties => max_properties::compile(value),
            Keyword::Maximum => maximum::compile(ctx, parent, value),
            Keyword::MinItems => min_items::compile(value),
            Keyword::MinLength => min_length::compile(value),
            Keyword::MinProperties => min_properties::compile(value),
            Keyword::Minimum => minimum::compile(ctx, parent, value),
            Keyword::MultipleOf => multiple_of::compile("multipleOf", value),
            Keyword::Not => not::compile(),
            Keyword::OneOf => one_of::compile(value),
            Keyword::Pattern => pattern::compile(ctx, value),
            Keyword::Properties if ctx.draft == Draft::Draft3 => {
                legacy::required_draft_3::compile(value)
            }
            Keyword::PropertyNames => property_names::compile(),
            Keyword::Required if ctx.draft != Draft::Draft3 => required::compile(value),
            Keyword::Type if ctx.draft == Draft::Draft3 => {
                legacy::type_draft_3::compile("type", value)
            }
            Keyword::Type => type_::compile(ctx.draft, value),
            Keyword::UniqueItems => unique_items::compile(value),
            Keyword::Definitions
            | Keyword::Else
            | Keyword::ExclusiveMaximum
            | Keyword::ExclusiveMinimum
            | Keyword::Id
            | Keyword::Items
            | Keyword::PatternProperties
            | Keyword::Properties
            | Keyword::Ref
            | Keyword::Required
            | Keyword::Then => None,
        }
    }
}

/// A compiled keyword.
#[derive(Debug)]
pub(crate) enum KeywordValidator {
    AdditionalItems(additional_items::AdditionalItemsValidator),
    AdditionalProperties(additional_properties::AdditionalPropertiesValidator),
    AllOf(all_of::AllOfValidator),
    AnyOf(any_of::AnyOfValidator),
    Const(const_::ConstValidator),
    Contains(contains::ContainsValidator),
    Dependencies(dependencies::DependenciesValidator),
    Enum(enum_::EnumValidator),
    ExclusiveMaximum(exclusive_maximum::ExclusiveMaximumValidator),
    ExclusiveMinimum(exclusive_minimum::ExclusiveMinimumValidator),
    Format(format::FormatValidator),
    If(if_::IfThenElseValidator),
    MaxItems(max_items::MaxItemsValidator),
    MaxLength(max_length::MaxLengthValidator),
    MaxProperties(max_properties::MaxPropertiesValidator),
    Maximum(maximum::MaximumValidator),
    MinItems(min_items::MinItemsValidator),
    MinLength(min_length::MinLengthValidator),
    MinProperties(min_properties::MinPropertiesValidator),
    Minimum(minimum::MinimumValidator),
    MultipleOf(multiple_of::MultipleOfValidator),
    Not(not::NotValidator),
    OneOf(one_of::OneOfValidator),
    Pattern(pattern::PatternValidator),
    PropertyNames(property_names::PropertyNamesValidator),
    Required(required::RequiredValidator),
    RequiredDraft3(legacy::required_draft_3::RequiredDraft3Validator),
    Type(type_::TypeValidator),
    TypeDraft3(legacy::type_draft_3::TypeDraft3Validator),
    UniqueItems(unique_items::UniqueItemsValidator),
}

impl KeywordValidator {
    pub(crate) fn validate(
        &self,
        pipeline: &Pipeline<'_>,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        match self {
            KeywordValidator::AdditionalItems(v) => v.validate(frame, report),
            KeywordValidator::AdditionalProperties(v) => v.validate(frame, report),
            KeywordValidator::AllOf(v) => v.validate(pipeline, frame, report),
            KeywordValidator::AnyOf(v) => v.validate(pipeline, frame, report),
            KeywordValidator::Const(v) => v.validate(frame, report),
            KeywordValidator::Contains(v) => v.validate(pipeline, frame, report),
            KeywordValidator::Dependencies(v) => v.validate(pipeline, frame, report),
            KeywordValidator::Enum(v) => v.validate(frame, report),
            KeywordValidator::ExclusiveMaximum(v) => v.validate(frame, report),
            KeywordValidator::ExclusiveMinimum(v) => v.validate(frame, report),
            KeywordValidator::Format(v) => v.validate(frame, report),
            KeywordValidator::If(v) => v.validate(pipeline, frame, report),
            KeywordValidator::MaxItems(v) => v.validate(frame, report),
            KeywordValidator::MaxLength(v) => v.validate(frame, report),
            KeywordValidator::MaxProperties(v) => v.validate(frame, report),
            KeywordValidator::Maximum(v) => v.validate(frame, report),
            KeywordValidator::MinItems(v) => v.validate(frame, report),
            KeywordValidator::MinLength(v) => v.validate(frame, report),
            KeywordValidator::MinProperties(v) => v.validate(frame, report),
            KeywordValidator::Minimum(v) => v.validate(frame, report),
            KeywordValidator::MultipleOf(v) => v.validate(frame, report),
            KeywordValidator::Not(v) => v.validate(pipeline, frame, report),
            KeywordValidator::OneOf(v) => v.validate(pipeline, frame, report),
            KeywordValidator::Pattern(v) => v.validate(frame, report),
            KeywordValidator::PropertyNames(v) => v.validate(pipeline, frame, report),
            KeywordValidator::Required(v) => v.validate(frame, report),
            KeywordValidator::RequiredDraft3(v) => v.validate(frame, report),
            KeywordValidator::Type(v) => v.validate(frame, report),
            KeywordValidator::TypeDraft3(v) => v.validate(pipeline, frame, report),
            KeywordValidator::UniqueItems(v) => v.validate(frame, report),
        }
    }
}
