//! Primitive JSON types, as seen by the `type` keyword and by the validator cache.
use serde::Serialize;
use serde_json::Value;
use std::{convert::TryFrom, fmt, ops::BitOrAssign};

/// Instance types. Numbers with an integral representation are `Integer`, everything else that
/// is numeric is `Number`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum PrimitiveType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl PrimitiveType {
    pub(crate) const ALL: [PrimitiveType; 7] = [
        PrimitiveType::Array,
        PrimitiveType::Boolean,
        PrimitiveType::Integer,
        PrimitiveType::Null,
        PrimitiveType::Number,
        PrimitiveType::Object,
        PrimitiveType::String,
    ];

    /// Position of this type inside [`PrimitiveType::ALL`].
    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            PrimitiveType::Array => 0,
            PrimitiveType::Boolean => 1,
            PrimitiveType::Integer => 2,
            PrimitiveType::Null => 3,
            PrimitiveType::Number => 4,
            PrimitiveType::Object => 5,
            PrimitiveType::String => 6,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Array => f.write_str("array"),
            PrimitiveType::Boolean => f.write_str("boolean"),
            PrimitiveType::Integer => f.write_str("integer"),
            PrimitiveType::Null => f.write_str("null"),
            PrimitiveType::Number => f.write_str("number"),
            PrimitiveType::Object => f.write_str("object"),
            PrimitiveType::String => f.write_str("string"),
        }
    }
}

impl TryFrom<&str> for PrimitiveType {
    type Error = ();

    #[inline]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "array" => Ok(PrimitiveType::Array),
            "boolean" => Ok(PrimitiveType::Boolean),
            "integer" => Ok(PrimitiveType::Integer),
            "null" => Ok(PrimitiveType::Null),
            "number" => Ok(PrimitiveType::Number),
            "object" => Ok(PrimitiveType::Object),
            "string" => Ok(PrimitiveType::String),
            _ => Err(()),
        }
    }
}

impl From<&Value> for PrimitiveType {
    fn from(instance: &Value) -> Self {
        match instance {
            Value::Null => PrimitiveType::Null,
            Value::Bool(_) => PrimitiveType::Boolean,
            Value::Number(number) if number.is_u64() || number.is_i64() => PrimitiveType::Integer,
            Value::Number(_) => PrimitiveType::Number,
            Value::String(_) => PrimitiveType::String,
            Value::Array(_) => PrimitiveType::Array,
            Value::Object(_) => PrimitiveType::Object,
        }
    }
}

const fn primitive_type_to_bit_map_representation(primitive_type: PrimitiveType) -> u8 {
    1 << primitive_type.index()
}

/// Compact representation of multiple [`PrimitiveType`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrimitiveTypesBitMap {
    inner: u8,
}

impl PrimitiveTypesBitMap {
    pub(crate) const fn new() -> Self {
        Self { inner: 0 }
    }

    pub(crate) const fn all() -> Self {
        Self { inner: 0b111_1111 }
    }

    pub(crate) const fn numeric() -> Self {
        Self::new()
            .add_type(PrimitiveType::Integer)
            .add_type(PrimitiveType::Number)
    }

    pub(crate) const fn only(primitive_type: PrimitiveType) -> Self {
        Self::new().add_type(primitive_type)
    }

    #[inline]
    pub(crate) const fn add_type(mut self, primitive_type: PrimitiveType) -> Self {
        self.inner |= primitive_type_to_bit_map_representation(primitive_type);
        self
    }

    #[inline]
    pub(crate) const fn contains_type(self, primitive_type: PrimitiveType) -> bool {
        primitive_type_to_bit_map_representation(primitive_type) & self.inner != 0
    }
}

impl BitOrAssign<PrimitiveType> for PrimitiveTypesBitMap {
    #[inline]
    fn bitor_assign(&mut self, rhs: PrimitiveType) {
        *self = self.add_type(rhs);
    }
}

impl IntoIterator for PrimitiveTypesBitMap {
    type Item = PrimitiveType;
    type IntoIter = PrimitiveTypesBitMapIterator;
    fn into_iter(self) -> Self::IntoIter {
        PrimitiveTypesBitMapIterator { bit_map: self }
    }
}

impl FromIterator<PrimitiveType> for PrimitiveTypesBitMap {
    fn from_iter<T: IntoIterator<Item = PrimitiveType>>(iter: T) -> Self {
        let mut result = Self::new();
        for primitive_type in iter {
            result |= primitive_type;
        }
        result
    }
}

/// Iterator over all [`PrimitiveType`] present in a [`PrimitiveTypesBitMap`]
#[derive(Debug)]
pub struct PrimitiveTypesBitMapIterator {
    bit_map: PrimitiveTypesBitMap,
}

impl Iterator for PrimitiveTypesBitMapIterator {
    type Item = PrimitiveType;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bit_map.inner == 0 {
            None
        } else {
            let position = self.bit_map.inner.trailing_zeros() as usize;
            // Clear the least significant bit
            self.bit_map.inner &= self.bit_map.inner - 1;
            Some(PrimitiveType::ALL[position])
        }
    }
}
