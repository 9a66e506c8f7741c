//! The `format` keyword and its built-in checkers.
use crate::{
    ecma,
    error::{MessageKind, ProcessingError},
    keywords::{CompileContext, KeywordValidator},
    paths::JsonPointer,
    pipeline::Frame,
    report::{LogLevel, Report},
    schemas::Draft,
};
use ahash::AHashMap;
use email_address::EmailAddress;
use serde_json::Value;
use std::{
    fmt,
    net::{Ipv4Addr, Ipv6Addr},
    str::FromStr,
    sync::Arc,
};
use url::Url;

/// A format checker.
///
/// Closures `Fn(&str) -> bool` implement it, so custom formats can be registered as plain
/// functions.
pub trait Format: Send + Sync + 'static {
    /// Whether `value` conforms to the format.
    fn is_valid(&self, value: &str) -> bool;
}

impl<F> Format for F
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    #[inline]
    fn is_valid(&self, value: &str) -> bool {
        self(value)
    }
}

/// Format checkers available to a validator. Custom formats shadow built-in ones.
#[derive(Clone, Default)]
pub(crate) struct Formats {
    custom: AHashMap<String, Arc<dyn Format>>,
}

impl fmt::Debug for Formats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.custom.keys()).finish()
    }
}

impl Formats {
    pub(crate) fn insert(&mut self, name: impl Into<String>, format: Arc<dyn Format>) {
        self.custom.insert(name.into(), format);
    }

    pub(crate) fn get(&self, draft: Draft, name: &str) -> Option<Arc<dyn Format>> {
        if let Some(format) = self.custom.get(name) {
            return Some(Arc::clone(format));
        }
        let check = builtin(draft, name)?;
        let format: Arc<dyn Format> = Arc::new(check);
        Some(format)
    }
}

fn builtin(draft: Draft, name: &str) -> Option<fn(&str) -> bool> {
    let check: fn(&str) -> bool = match (name, draft) {
        ("date", _) => is_valid_date,
        ("date-time", _) => is_valid_datetime,
        ("time", _) => is_valid_time,
        ("email", _) => is_valid_email,
        ("host-name", Draft::Draft3) => is_valid_hostname,
        ("hostname", _) => is_valid_hostname,
        ("ip-address", Draft::Draft3) => is_valid_ipv4,
        ("ipv4", _) => is_valid_ipv4,
        ("ipv6", _) => is_valid_ipv6,
        ("regex", _) => is_valid_regex,
        ("uri", _) => is_valid_uri,
        ("json-pointer", Draft::Draft6 | Draft::Draft7) => is_valid_json_pointer,
        _ => return None,
    };
    Some(check)
}

pub(crate) struct FormatValidator {
    format: String,
    check: Option<Arc<dyn Format>>,
}

impl fmt::Debug for FormatValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatValidator")
            .field("format", &self.format)
            .field("known", &self.check.is_some())
            .finish()
    }
}

impl FormatValidator {
    pub(crate) fn validate(
        &self,
        frame: &Frame<'_>,
        report: &mut Report,
    ) -> Result<(), ProcessingError> {
        let Value::String(item) = frame.instance else {
            return Ok(());
        };
        let Some(check) = &self.check else {
            return report.log(frame.message(
                LogLevel::Info,
                "format",
                MessageKind::UnknownFormat {
                    format: self.format.clone(),
                },
            ));
        };
        if check.is_valid(item) {
            return Ok(());
        }
        report.log(frame.error(
            "format",
            MessageKind::Format {
                format: self.format.clone(),
            },
        ))
    }
}

#[inline]
pub(crate) fn compile(ctx: &CompileContext<'_>, schema: &Value) -> Option<KeywordValidator> {
    if !ctx.validate_formats {
        return None;
    }
    let format = schema.as_str()?;
    Some(KeywordValidator::Format(FormatValidator {
        format: format.to_string(),
        check: ctx.formats.get(ctx.draft, format),
    }))
}

fn is_valid_date(date: &str) -> bool {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let (Some(year), Some(month), Some(day)) = (
        parse_four_digits(&bytes[0..4]),
        parse_two_digits(&bytes[5..7]),
        parse_two_digits(&bytes[8..10]),
    ) else {
        return false;
    };
    let last_day = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => return false,
    };
    (1..=last_day).contains(&day)
}

#[inline]
fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

#[inline]
fn parse_four_digits(bytes: &[u8]) -> Option<u16> {
    let (high, low) = (parse_two_digits(&bytes[..2])?, parse_two_digits(&bytes[2..4])?);
    Some(u16::from(high) * 100 + u16::from(low))
}

#[inline]
fn parse_two_digits(bytes: &[u8]) -> Option<u8> {
    match bytes {
        [tens @ b'0'..=b'9', units @ b'0'..=b'9'] => Some((tens - b'0') * 10 + (units - b'0')),
        _ => None,
    }
}

/// `HH:MM:SS[.frac](Z|+HH:MM|-HH:MM)`. A leap second is only accepted at 23:59 UTC.
fn is_valid_time(time: &str) -> bool {
    let bytes = time.as_bytes();
    if bytes.len() < 9 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }
    let (Some(hour), Some(minute), Some(second)) = (
        parse_two_digits(&bytes[..2]),
        parse_two_digits(&bytes[3..5]),
        parse_two_digits(&bytes[6..8]),
    ) else {
        return false;
    };
    if hour > 23 || minute > 59 || second > 60 {
        return false;
    }
    let mut rest = &bytes[8..];
    if let Some(fraction) = rest.strip_prefix(b".") {
        let digits = fraction.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        rest = &fraction[digits..];
    }
    let offset_minutes: i32 = match rest {
        [b'Z' | b'z'] => 0,
        [sign @ (b'+' | b'-'), offset @ ..] if offset.len() == 5 && offset[2] == b':' => {
            let (Some(offset_hour), Some(offset_minute)) =
                (parse_two_digits(&offset[..2]), parse_two_digits(&offset[3..5]))
            else {
                return false;
            };
            if offset_hour > 23 || offset_minute > 59 {
                return false;
            }
            let total = i32::from(offset_hour) * 60 + i32::from(offset_minute);
            if *sign == b'+' {
                total
            } else {
                -total
            }
        }
        _ => return false,
    };
    if second != 60 {
        return true;
    }
    let utc = (i32::from(hour) * 60 + i32::from(minute) - offset_minutes).rem_euclid(24 * 60);
    utc == 23 * 60 + 59
}

fn is_valid_datetime(datetime: &str) -> bool {
    let Some(separator) = datetime.bytes().position(|b| b == b'T' || b == b't') else {
        return false;
    };
    let (date, time) = datetime.split_at(separator);
    is_valid_date(date) && is_valid_time(&time[1..])
}

fn is_valid_email(email: &str) -> bool {
    let Ok(parsed) = EmailAddress::from_str(email) else {
        return false;
    };
    let domain = parsed.domain();
    match domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        Some(literal) => match literal.strip_prefix("IPv6:") {
            Some(address) => address.parse::<Ipv6Addr>().is_ok(),
            None => literal.parse::<Ipv4Addr>().is_ok(),
        },
        None => is_valid_hostname(domain),
    }
}

fn is_valid_hostname(hostname: &str) -> bool {
    !(hostname.is_empty()
        || hostname.starts_with('-')
        || hostname.ends_with('-')
        || bytecount::num_chars(hostname.as_bytes()) > 255
        || hostname
            .chars()
            .any(|c| !(c.is_alphanumeric() || c == '-' || c == '.'))
        || hostname
            .split('.')
            .any(|label| label.is_empty() || bytecount::num_chars(label.as_bytes()) > 63))
}

fn is_valid_ipv4(address: &str) -> bool {
    address.parse::<Ipv4Addr>().is_ok()
}

fn is_valid_ipv6(address: &str) -> bool {
    address.parse::<Ipv6Addr>().is_ok()
}

fn is_valid_regex(pattern: &str) -> bool {
    ecma::compile(pattern).is_ok()
}

fn is_valid_uri(uri: &str) -> bool {
    Url::from_str(uri).is_ok()
}

fn is_valid_json_pointer(pointer: &str) -> bool {
    JsonPointer::parse(pointer).is_ok()
}
