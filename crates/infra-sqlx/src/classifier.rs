// sqlx::Error -> DomainError

use repokit_core::classify::VendorCode;
use repokit_core::{DomainError, ErrorKind};
use sqlx::error::ErrorKind as DriverErrorKind;
use tracing::{debug, error, Span};

/// Converts driver failures into classified errors, logging through `span`
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    span: Span,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(Span::none())
    }
}

impl ErrorClassifier {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    /// Classify a driver error. The error itself becomes the cause.
    pub fn classify(&self, err: sqlx::Error) -> DomainError {
        let kind = kind_of(&err);
        let vendor_code = vendor_code(&err);

        if kind == ErrorKind::Unhandled {
            error!(
                parent: &self.span,
                error = %err,
                vendor_code = vendor_code.as_deref(),
                "Unhandled database error"
            );
        } else {
            debug!(
                parent: &self.span,
                kind = %kind,
                vendor_code = vendor_code.as_deref(),
                constraint = constraint(&err),
                "Classified database error"
            );
        }

        let classified = DomainError::new(kind);
        let classified = match tag_for(&err) {
            Some(tag) => classified.with_tag(tag),
            None => classified,
        };
        classified.with_cause(err)
    }

    /// `None` in, `None` out
    pub fn classify_opt(&self, err: Option<sqlx::Error>) -> Option<DomainError> {
        err.map(|err| self.classify(err))
    }
}

/// Classify without a logging span
pub fn classify(err: sqlx::Error) -> DomainError {
    ErrorClassifier::default().classify(err)
}

/// `.classify()` on driver results, for use inside units of work
pub trait ClassifyExt<T> {
    fn classify(self) -> Result<T, DomainError>;
}

impl<T> ClassifyExt<T> for Result<T, sqlx::Error> {
    fn classify(self) -> Result<T, DomainError> {
        self.map_err(classify)
    }
}

fn kind_of(err: &sqlx::Error) -> ErrorKind {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| VendorCode::parse(&code).kind())
            .or_else(|| portable_kind(db_err.kind()))
            .unwrap_or(ErrorKind::Unhandled),
        _ => ErrorKind::Unhandled,
    }
}

/// Driver-neutral kinds sqlx derives for every backend
fn portable_kind(kind: DriverErrorKind) -> Option<ErrorKind> {
    match kind {
        DriverErrorKind::UniqueViolation => Some(ErrorKind::UniqueViolation),
        DriverErrorKind::ForeignKeyViolation => Some(ErrorKind::ForeignKeyViolation),
        DriverErrorKind::NotNullViolation => Some(ErrorKind::NotNullViolation),
        DriverErrorKind::CheckViolation => Some(ErrorKind::CheckViolation),
        _ => None,
    }
}

fn tag_for(err: &sqlx::Error) -> Option<&'static str> {
    match err {
        sqlx::Error::RowNotFound => Some("row_not_found"),
        sqlx::Error::PoolTimedOut => Some("pool_timed_out"),
        sqlx::Error::PoolClosed => Some("pool_closed"),
        sqlx::Error::Io(_) => Some("io_error"),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => Some("decode_error"),
        sqlx::Error::ColumnNotFound(_) => Some("column_not_found"),
        _ => None,
    }
}

fn vendor_code(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code.into_owned())
}

fn constraint(err: &sqlx::Error) -> Option<&str> {
    err.as_database_error().and_then(|db_err| db_err.constraint())
}
