//! Translation of ECMA 262 regular expressions, as used by `pattern` and `patternProperties`,
//! into the dialect understood by `fancy_regex`.
use std::borrow::Cow;

use regex_syntax::ast::{
    self, parse::Parser, Ast, ClassPerl, ClassPerlKind, ClassSetItem, ErrorKind, Literal,
    LiteralKind, Span, SpecialLiteralKind, Visitor,
};

/// The pattern can not be expressed as a Rust regular expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{pattern}' is not a valid ECMA 262 regular expression")]
pub struct PatternError {
    pattern: String,
}

impl PatternError {
    fn new(pattern: &str) -> Self {
        PatternError {
            pattern: pattern.to_string(),
        }
    }
}

/// Compile an ECMA 262 pattern.
pub(crate) fn compile(pattern: &str) -> Result<fancy_regex::Regex, PatternError> {
    let translated = to_rust_regex(pattern)?;
    fancy_regex::Regex::new(&translated).map_err(|_| PatternError::new(pattern))
}

/// Convert an ECMA 262 regex to a Rust regex on a best effort basis.
///
/// ECMA character classes are ASCII-only, so `\d`, `\w` and `\s` are spelled out. Patterns with
/// look-arounds or backreferences are passed through for `fancy_regex` to handle.
pub(crate) fn to_rust_regex(pattern: &str) -> Result<Cow<'_, str>, PatternError> {
    let source = expand_control_escapes(pattern)?;
    let ast = match Parser::new().parse(&source) {
        Ok(ast) => ast,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::UnsupportedLookAround | ErrorKind::UnsupportedBackreference
            ) =>
        {
            return Ok(source);
        }
        Err(_) => return Err(PatternError::new(pattern)),
    };
    let replacements =
        ast::visit(&ast, ClassCollector::default()).map_err(|_| PatternError::new(pattern))?;
    if replacements.is_empty() {
        return Ok(source);
    }
    let mut output = String::with_capacity(source.len() + replacements.len() * 8);
    let mut last = 0;
    for (span, replacement) in replacements {
        output.push_str(&source[last..span.start.offset]);
        output.push_str(replacement);
        last = span.end.offset;
    }
    output.push_str(&source[last..]);
    Ok(Cow::Owned(output))
}

/// `\cX` is a control character in ECMA 262 and unknown to `regex_syntax`.
fn expand_control_escapes(pattern: &str) -> Result<Cow<'_, str>, PatternError> {
    if !pattern.contains(r"\c") {
        return Ok(Cow::Borrowed(pattern));
    }
    let mut output = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            output.push(c);
            continue;
        }
        match chars.next() {
            Some('c') => match chars.next() {
                Some(letter) if letter.is_ascii_alphabetic() => {
                    output.push(char::from((letter as u8) % 32));
                }
                _ => return Err(PatternError::new(pattern)),
            },
            Some(escaped) => {
                output.push('\\');
                output.push(escaped);
            }
            None => return Err(PatternError::new(pattern)),
        }
    }
    Ok(Cow::Owned(output))
}

fn ascii_class(cls: &ClassPerl) -> &'static str {
    match (&cls.kind, cls.negated) {
        (ClassPerlKind::Digit, false) => "[0-9]",
        (ClassPerlKind::Digit, true) => "[^0-9]",
        (ClassPerlKind::Word, false) => "[A-Za-z0-9_]",
        (ClassPerlKind::Word, true) => "[^A-Za-z0-9_]",
        (ClassPerlKind::Space, false) => {
            "[ \t\n\r\u{000b}\u{000c}\u{00a0}\u{feff}\u{2003}\u{2029}]"
        }
        (ClassPerlKind::Space, true) => {
            "[^ \t\n\r\u{000b}\u{000c}\u{00a0}\u{feff}\u{2003}\u{2029}]"
        }
    }
}

/// Collects the spans of Perl classes, in pattern order.
#[derive(Default)]
struct ClassCollector {
    replacements: Vec<(Span, &'static str)>,
}

impl Visitor for ClassCollector {
    type Output = Vec<(Span, &'static str)>;
    type Err = ast::Error;

    fn finish(mut self) -> Result<Self::Output, Self::Err> {
        self.replacements
            .sort_by_key(|(span, _)| span.start.offset);
        Ok(self.replacements)
    }

    fn visit_class_set_item_pre(&mut self, item: &ClassSetItem) -> Result<(), Self::Err> {
        if let ClassSetItem::Perl(cls) = item {
            self.replacements.push((cls.span, ascii_class(cls)));
        }
        Ok(())
    }

    fn visit_post(&mut self, ast: &Ast) -> Result<(), Self::Err> {
        match ast {
            Ast::ClassPerl(cls) => {
                self.replacements.push((cls.span, ascii_class(cls)));
            }
            Ast::Literal(literal) => {
                if let Literal {
                    kind: LiteralKind::Special(SpecialLiteralKind::Bell),
                    ..
                } = literal.as_ref()
                {
                    // `\a` has no meaning in ECMA 262. There is no public constructor for
                    // `ast::Error`, so borrow one from a known invalid pattern.
                    return Parser::new().parse("[").map(|_| ());
                }
            }
            _ => (),
        }
        Ok(())
    }
}
