//! Facilities for working with paths within schemas or validated instances.
use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};
use serde_json::Value;

/// A single step of a JSON pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathChunk<'a> {
    /// Property name within a JSON object.
    Property(&'a str),
    /// Index within a JSON array.
    Index(usize),
}

impl<'a> From<&'a str> for PathChunk<'a> {
    #[inline]
    fn from(value: &'a str) -> PathChunk<'a> {
        PathChunk::Property(value)
    }
}

impl<'a> From<&'a String> for PathChunk<'a> {
    #[inline]
    fn from(value: &'a String) -> PathChunk<'a> {
        PathChunk::Property(value.as_str())
    }
}

impl From<usize> for PathChunk<'_> {
    #[inline]
    fn from(value: usize) -> Self {
        PathChunk::Index(value)
    }
}

/// Errors raised while parsing a textual JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    #[error("JSON pointer '{0}' must be empty or start with '/'")]
    MissingSlash(String),
    #[error("JSON pointer '{0}' contains an invalid escape sequence")]
    InvalidEscape(String),
}

/// RFC 6901 JSON pointer, kept as a list of unescaped reference tokens.
///
/// The textual form escapes `~` as `~0` and `/` as `~1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonPointer(Vec<String>);

impl JsonPointer {
    /// The pointer to the document root.
    #[must_use]
    pub const fn new() -> Self {
        JsonPointer(Vec::new())
    }

    /// Parse the textual form of a pointer. The empty string is the root.
    pub fn parse(pointer: &str) -> Result<Self, PointerError> {
        if pointer.is_empty() {
            return Ok(JsonPointer::new());
        }
        let Some(rest) = pointer.strip_prefix('/') else {
            return Err(PointerError::MissingSlash(pointer.to_string()));
        };
        rest.split('/')
            .map(|token| {
                unescape(token).ok_or_else(|| PointerError::InvalidEscape(pointer.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(JsonPointer)
    }

    /// A new pointer with one more token at the end.
    #[must_use]
    pub fn join<'a>(&self, chunk: impl Into<PathChunk<'a>>) -> Self {
        let mut tokens = Vec::with_capacity(self.0.len() + 1);
        tokens.extend(self.0.iter().cloned());
        match chunk.into() {
            PathChunk::Property(property) => tokens.push(property.to_string()),
            PathChunk::Index(idx) => {
                let mut buffer = itoa::Buffer::new();
                tokens.push(buffer.format(idx).to_string());
            }
        }
        JsonPointer(tokens)
    }

    /// A new pointer made of this pointer's tokens followed by `other`'s.
    #[must_use]
    pub fn extend(&self, other: &JsonPointer) -> Self {
        let mut tokens = self.0.clone();
        tokens.extend(other.0.iter().cloned());
        JsonPointer(tokens)
    }

    pub(crate) fn push<'a>(&mut self, chunk: impl Into<PathChunk<'a>>) {
        match chunk.into() {
            PathChunk::Property(property) => self.0.push(property.to_string()),
            PathChunk::Index(idx) => {
                let mut buffer = itoa::Buffer::new();
                self.0.push(buffer.format(idx).to_string());
            }
        }
    }

    /// Unescaped reference tokens.
    pub fn tokens(&self) -> impl ExactSizeIterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every token of `prefix` leads this pointer.
    #[must_use]
    pub fn starts_with(&self, prefix: &JsonPointer) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Evaluate the pointer against `document`.
    #[must_use]
    pub fn get<'v>(&self, document: &'v Value) -> Option<&'v Value> {
        self.tokens()
            .try_fold(document, |target, token| step(target, token))
    }
}

/// Move one token down from `value`, as JSON pointer evaluation does.
pub(crate) fn step<'v>(value: &'v Value, token: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(token),
        Value::Array(list) => parse_index(token).and_then(|idx| list.get(idx)),
        _ => None,
    }
}

// Array indices are plain decimal numbers without leading zeros or a sign.
fn parse_index(token: &str) -> Option<usize> {
    if token.starts_with('+') || (token.starts_with('0') && token.len() != 1) {
        None
    } else {
        token.parse().ok()
    }
}

fn unescape(token: &str) -> Option<String> {
    let bytes = token.as_bytes();
    let Some(first) = memchr::memchr(b'~', bytes) else {
        return Some(token.to_string());
    };
    let mut output = String::with_capacity(token.len());
    output.push_str(&token[..first]);
    let mut chars = token[first..].chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => output.push('~'),
                Some('1') => output.push('/'),
                _ => return None,
            }
        } else {
            output.push(c);
        }
    }
    Some(output)
}

fn write_escaped_str(buffer: &mut String, value: &str) {
    match value.find(['~', '/']) {
        Some(mut escape_idx) => {
            let mut remaining = value;
            loop {
                let (before, after) = remaining.split_at(escape_idx);
                buffer.push_str(before);
                match after.as_bytes()[0] {
                    b'~' => buffer.push_str("~0"),
                    _ => buffer.push_str("~1"),
                }
                remaining = &after[1..];
                if let Some(next_escape_idx) = remaining.find(['~', '/']) {
                    escape_idx = next_escape_idx;
                } else {
                    buffer.push_str(remaining);
                    break;
                }
            }
        }
        None => buffer.push_str(value),
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = String::new();
        for token in &self.0 {
            buffer.push('/');
            write_escaped_str(&mut buffer, token);
        }
        f.write_str(&buffer)
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPointer::parse(s)
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'a> FromIterator<PathChunk<'a>> for JsonPointer {
    fn from_iter<T: IntoIterator<Item = PathChunk<'a>>>(iter: T) -> Self {
        let mut pointer = JsonPointer::new();
        for chunk in iter {
            pointer.push(chunk);
        }
        pointer
    }
}
