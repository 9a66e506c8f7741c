//! Processing reports: leveled messages collected during a validation run.
use crate::{
    error::{MessageKind, ProcessingError, SchemaError},
    paths::JsonPointer,
    tree::SchemaLocation,
};
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use std::fmt;

/// Severity of a message, in increasing order.
///
/// `None` is above every real level and is only meaningful as a threshold: a log threshold of
/// `None` keeps nothing, an exception threshold of `None` never raises.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
    None,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::None => "none",
        })
    }
}

/// A single message produced while validating.
#[derive(Debug)]
pub struct Message {
    /// Severity of the message.
    pub level: LogLevel,
    /// The keyword that produced the message, if any.
    pub keyword: Option<&'static str>,
    /// Location of the schema fragment being applied.
    pub schema: SchemaLocation,
    /// Location of the instance being validated.
    pub instance_path: JsonPointer,
    /// What happened.
    pub kind: MessageKind,
}

impl Message {
    pub(crate) fn new(
        level: LogLevel,
        keyword: Option<&'static str>,
        schema: SchemaLocation,
        instance_path: JsonPointer,
        kind: MessageKind,
    ) -> Message {
        Message {
            level,
            keyword,
            schema,
            instance_path,
            kind,
        }
    }

    /// A fatal message describing a problem with the schema itself.
    pub(crate) fn fatal(
        keyword: Option<&'static str>,
        schema: SchemaLocation,
        instance_path: JsonPointer,
        error: SchemaError,
    ) -> Message {
        Message::new(
            LogLevel::Fatal,
            keyword,
            schema,
            instance_path,
            MessageKind::Schema(error),
        )
    }

    /// Human-readable description.
    #[must_use]
    pub fn text(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.kind)
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("level", &self.level)?;
        if let Some(keyword) = self.keyword {
            map.serialize_entry("keyword", keyword)?;
        }
        map.serialize_entry("message", &self.kind.to_string())?;
        map.serialize_entry("schema", &self.schema)?;
        map.serialize_entry("instance", &InstanceRef(&self.instance_path))?;
        self.kind.serialize_details(&mut map)?;
        map.end()
    }
}

struct InstanceRef<'a>(&'a JsonPointer);

impl Serialize for InstanceRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("pointer", self.0)?;
        map.end()
    }
}

/// Log and exception thresholds shared by a report and the reports forked from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Thresholds {
    pub(crate) log_level: LogLevel,
    pub(crate) exception: LogLevel,
}

impl Thresholds {
    /// Thresholds for a branch whose failures must not abort the whole run: nothing below
    /// `Fatal` raises.
    pub(crate) fn isolated(self) -> Thresholds {
        Thresholds {
            log_level: self.log_level,
            exception: self.exception.max(LogLevel::Fatal),
        }
    }
}

/// Collects messages and tracks the highest level seen.
///
/// A message below the log level is not kept but still counts towards the current level, so
/// success does not depend on the log threshold.
#[derive(Debug)]
pub struct Report {
    thresholds: Thresholds,
    current: LogLevel,
    messages: Vec<Message>,
}

impl Report {
    /// An empty report with the given thresholds.
    #[must_use]
    pub fn new(log_level: LogLevel, exception_threshold: LogLevel) -> Report {
        Report::with_thresholds(Thresholds {
            log_level,
            exception: exception_threshold,
        })
    }

    pub(crate) fn with_thresholds(thresholds: Thresholds) -> Report {
        Report {
            thresholds,
            current: LogLevel::Debug,
            messages: Vec::new(),
        }
    }

    pub(crate) fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Record a message.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessingError::Escalated`] if the message level reaches the exception
    /// threshold. The current level is updated before raising.
    pub fn log(&mut self, message: Message) -> Result<(), ProcessingError> {
        self.current = self.current.max(message.level);
        if message.level >= self.thresholds.exception {
            return Err(ProcessingError::Escalated(Box::new(message)));
        }
        if message.level >= self.thresholds.log_level {
            self.messages.push(message);
        }
        Ok(())
    }

    /// Record every message of `other`, in order, through this report's thresholds.
    ///
    /// # Errors
    ///
    /// Propagates the first escalation.
    pub fn merge(&mut self, other: Report) -> Result<(), ProcessingError> {
        self.current = self.current.max(other.current);
        for message in other.messages {
            self.log(message)?;
        }
        Ok(())
    }

    /// `true` while no message at `Error` or above has been logged.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.current < LogLevel::Error
    }

    pub(crate) fn has_fatal(&self) -> bool {
        self.current >= LogLevel::Fatal
    }

    /// Highest level logged so far.
    #[must_use]
    pub fn current_level(&self) -> LogLevel {
        self.current
    }

    #[must_use]
    pub fn log_level(&self) -> LogLevel {
        self.thresholds.log_level
    }

    #[must_use]
    pub fn exception_threshold(&self) -> LogLevel {
        self.thresholds.exception
    }

    /// Kept messages, in the order they were logged.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Kept messages at `Error` or above.
    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|message| message.level >= LogLevel::Error)
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl IntoIterator for Report {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("success", &self.is_success())?;
        map.serialize_entry("messages", &self.messages)?;
        map.end()
    }
}
