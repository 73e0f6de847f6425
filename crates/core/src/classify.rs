//! Vendor failure code tables.
//!
//! Pure lookups from a driver-reported code to an [`ErrorKind`], plus the
//! built-in Russian/English messages for each kind. The driver adapter
//! extracts the code; nothing here knows about a concrete driver.
//!
//! PostgreSQL codes are SQLSTATE values (class 22, 23 and 40).
//! SQLite codes are extended result codes as rendered by the driver
//! (e.g. `"2067"` for `SQLITE_CONSTRAINT_UNIQUE`).

use crate::error::ErrorKind;
use crate::locale::LocalizedMessages;

/// A code reported by the backing store, tagged with its dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorCode<'a> {
    /// Five-character SQLSTATE (PostgreSQL, MySQL)
    SqlState(&'a str),
    /// SQLite extended result code
    Sqlite(&'a str),
    /// Anything else
    Unknown(&'a str),
}

impl<'a> VendorCode<'a> {
    /// Dialect is decided by shape: SQLSTATE is always five ASCII
    /// alphanumerics, SQLite codes are decimal numbers below 10000.
    pub fn parse(code: &'a str) -> Self {
        let code = code.trim();
        if code.len() == 5 && code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            VendorCode::SqlState(code)
        } else if !code.is_empty() && code.len() <= 4 && code.bytes().all(|b| b.is_ascii_digit())
        {
            VendorCode::Sqlite(code)
        } else {
            VendorCode::Unknown(code)
        }
    }

    /// Kind for this code, `None` when the code is not recognized
    pub fn kind(self) -> Option<ErrorKind> {
        match self {
            VendorCode::SqlState(code) => kind_for_sqlstate(code),
            VendorCode::Sqlite(code) => kind_for_sqlite(code),
            VendorCode::Unknown(_) => None,
        }
    }
}

/// PostgreSQL SQLSTATE -> kind
pub fn kind_for_sqlstate(code: &str) -> Option<ErrorKind> {
    let kind = match code {
        "23505" => ErrorKind::UniqueViolation,
        "23503" => ErrorKind::ForeignKeyViolation,
        "23502" => ErrorKind::NotNullViolation,
        "23514" => ErrorKind::CheckViolation,
        "23P01" => ErrorKind::ExclusionViolation,
        "23001" => ErrorKind::RestrictViolation,
        "22001" => ErrorKind::StringTooLong,
        "22003" => ErrorKind::NumericOutOfRange,
        // invalid_text_representation, invalid_datetime_format
        "22P02" | "22007" => ErrorKind::InvalidTextRepresentation,
        "40P01" => ErrorKind::DeadlockDetected,
        "40001" => ErrorKind::SerializationFailure,
        _ => return None,
    };
    Some(kind)
}

/// SQLite extended result code -> kind
pub fn kind_for_sqlite(code: &str) -> Option<ErrorKind> {
    let kind = match code {
        // SQLITE_CONSTRAINT_UNIQUE, SQLITE_CONSTRAINT_PRIMARYKEY
        "2067" | "1555" => ErrorKind::UniqueViolation,
        // SQLITE_CONSTRAINT_FOREIGNKEY
        "787" => ErrorKind::ForeignKeyViolation,
        // SQLITE_CONSTRAINT_NOTNULL
        "1299" => ErrorKind::NotNullViolation,
        // SQLITE_CONSTRAINT_CHECK
        "275" => ErrorKind::CheckViolation,
        // SQLITE_TOOBIG
        "18" => ErrorKind::StringTooLong,
        // SQLITE_MISMATCH, SQLITE_CONSTRAINT_DATATYPE (STRICT tables)
        "20" | "3091" => ErrorKind::InvalidTextRepresentation,
        // SQLITE_LOCKED_SHAREDCACHE
        "262" => ErrorKind::DeadlockDetected,
        // SQLITE_BUSY_SNAPSHOT
        "517" => ErrorKind::SerializationFailure,
        _ => return None,
    };
    Some(kind)
}

/// Built-in messages for `kind`
pub fn default_messages(kind: ErrorKind) -> LocalizedMessages {
    let (ru, en) = match kind {
        ErrorKind::NotFound => ("Запись не найдена", "Record not found"),
        ErrorKind::UniqueViolation => (
            "Нарушение уникального ограничения",
            "Unique constraint violated",
        ),
        ErrorKind::ForeignKeyViolation => {
            ("Нарушение внешнего ключа", "Foreign key constraint violated")
        }
        ErrorKind::NotNullViolation => (
            "NULL в поле, где он запрещён",
            "NULL value where NOT NULL is required",
        ),
        ErrorKind::CheckViolation => ("Нарушение CHECK ограничения", "CHECK constraint violated"),
        ErrorKind::ExclusionViolation => (
            "Нарушение EXCLUDE ограничения",
            "Exclusion constraint violated",
        ),
        ErrorKind::RestrictViolation => (
            "Удаление запрещено (RESTRICT)",
            "Delete restricted due to FK",
        ),
        ErrorKind::StringTooLong => ("Строка слишком длинная", "String too long for field"),
        ErrorKind::NumericOutOfRange => (
            "Число вне допустимого диапазона",
            "Numeric value out of range",
        ),
        ErrorKind::InvalidTextRepresentation => {
            ("Неверный формат входных данных", "Invalid input format")
        }
        ErrorKind::DeadlockDetected => ("Обнаружен дедлок", "Deadlock detected"),
        ErrorKind::SerializationFailure => (
            "Ошибка сериализации транзакции",
            "Transaction serialization failure",
        ),
        ErrorKind::Unhandled => ("Необработанная ошибка", "Unhandled database error"),
    };
    LocalizedMessages::new(ru, en)
}
