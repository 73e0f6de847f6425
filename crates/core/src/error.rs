// Central Error Type for the data-access layer

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::default_messages;
use crate::locale::{LocalizedMessages, DEFAULT_LOCALE};

/// Boxed cause kept inside a `DomainError`
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Closed set of classified failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    UniqueViolation,
    ForeignKeyViolation,
    NotNullViolation,
    CheckViolation,
    ExclusionViolation,
    RestrictViolation,
    StringTooLong,
    NumericOutOfRange,
    InvalidTextRepresentation,
    DeadlockDetected,
    SerializationFailure,
    Unhandled,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 13] = [
        ErrorKind::NotFound,
        ErrorKind::UniqueViolation,
        ErrorKind::ForeignKeyViolation,
        ErrorKind::NotNullViolation,
        ErrorKind::CheckViolation,
        ErrorKind::ExclusionViolation,
        ErrorKind::RestrictViolation,
        ErrorKind::StringTooLong,
        ErrorKind::NumericOutOfRange,
        ErrorKind::InvalidTextRepresentation,
        ErrorKind::DeadlockDetected,
        ErrorKind::SerializationFailure,
        ErrorKind::Unhandled,
    ];

    /// HTTP status rendered by the error middleware
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::UniqueViolation => 409,
            ErrorKind::ForeignKeyViolation => 409,
            ErrorKind::NotNullViolation => 406,
            ErrorKind::CheckViolation => 406,
            ErrorKind::ExclusionViolation => 409,
            ErrorKind::RestrictViolation => 406,
            ErrorKind::StringTooLong => 413,
            ErrorKind::NumericOutOfRange => 416,
            ErrorKind::InvalidTextRepresentation => 422,
            ErrorKind::DeadlockDetected => 504,
            ErrorKind::SerializationFailure => 500,
            ErrorKind::Unhandled => 500,
        }
    }

    /// Stable internal code (not a SQLSTATE)
    pub fn code(self) -> u16 {
        match self {
            ErrorKind::NotFound => 10,
            ErrorKind::UniqueViolation => 11,
            ErrorKind::ForeignKeyViolation => 12,
            ErrorKind::NotNullViolation => 13,
            ErrorKind::CheckViolation => 14,
            ErrorKind::ExclusionViolation => 15,
            ErrorKind::RestrictViolation => 16,
            ErrorKind::StringTooLong => 21,
            ErrorKind::NumericOutOfRange => 22,
            ErrorKind::InvalidTextRepresentation => 23,
            ErrorKind::DeadlockDetected => 31,
            ErrorKind::SerializationFailure => 32,
            ErrorKind::Unhandled => 999,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::UniqueViolation => "unique_violation",
            ErrorKind::ForeignKeyViolation => "foreign_key_violation",
            ErrorKind::NotNullViolation => "not_null_violation",
            ErrorKind::CheckViolation => "check_violation",
            ErrorKind::ExclusionViolation => "exclusion_violation",
            ErrorKind::RestrictViolation => "restrict_violation",
            ErrorKind::StringTooLong => "string_too_long",
            ErrorKind::NumericOutOfRange => "numeric_out_of_range",
            ErrorKind::InvalidTextRepresentation => "invalid_text_representation",
            ErrorKind::DeadlockDetected => "deadlock_detected",
            ErrorKind::SerializationFailure => "serialization_failure",
            ErrorKind::Unhandled => "unhandled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure crossing the data-access boundary.
///
/// Built once where the driver error is first observed and never
/// re-classified afterwards. The driver error stays attached as `source`.
#[derive(Debug)]
pub struct DomainError {
    kind: ErrorKind,
    messages: LocalizedMessages,
    tag: Option<Cow<'static, str>>,
    source: Option<BoxError>,
}

impl DomainError {
    /// Error of `kind` with the built-in messages for that kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            messages: default_messages(kind),
            tag: None,
            source: None,
        }
    }

    /// Explicit lookup failure chosen by a repository
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// `Unhandled` error tagged with `tag`
    pub fn unhandled(tag: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unhandled).with_tag(tag)
    }

    /// Operation a repository specialization chose not to provide
    pub fn not_implemented(operation: &'static str) -> Self {
        Self::unhandled("not_implemented").with_messages(LocalizedMessages::new(
            format!("Операция не реализована: {operation}"),
            format!("Operation not implemented: {operation}"),
        ))
    }

    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.source = Some(cause.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<Cow<'static, str>>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_messages(mut self, messages: LocalizedMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn messages(&self) -> &LocalizedMessages {
        &self.messages
    }

    /// Message for `locale`, Russian when the locale is missing
    pub fn message_for(&self, locale: &str) -> &str {
        self.messages.message_for(locale)
    }

    /// The original error, untouched
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Identity-based inspection of the original error
    pub fn downcast_cause<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.source.as_deref().and_then(|e| e.downcast_ref::<E>())
    }

    pub fn into_cause(self) -> Option<BoxError> {
        self.source
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.messages.message_for(DEFAULT_LOCALE);
        if message.is_empty() {
            // Only reachable with hand-built empty messages
            return f.write_str(self.kind.as_str());
        }
        f.write_str(message)
    }
}

impl StdError for DomainError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Result type alias using DomainError
pub type Result<T> = std::result::Result<T, DomainError>;
