// Transaction port for atomic operations

use std::fmt;

use crate::context::Context;
use crate::error::DomainError;
use futures::future::BoxFuture;

/// Runs a unit of work inside one transaction.
///
/// Contract of `exec`:
/// - begin failure: `Unhandled` tagged `transaction_begin_error`, the unit of
///   work is never invoked
/// - unit of work error: rollback, the same error is returned unchanged
/// - commit failure: `Unhandled` tagged `transaction_commit_error`
/// - panic or context interruption: rollback, classified `Unhandled`
///
/// The handle passed to the unit of work is exclusively owned by one `exec`
/// call and is finished (committed or rolled back) before it returns.
pub trait TransactionRunner: Send + Sync {
    /// Transactional handle type
    type Tx: Send;

    fn exec<'a, F, R, E>(&'a self, ctx: &'a Context, unit_of_work: F) -> BoxFuture<'a, Result<R, E>>
    where
        F: for<'t> FnOnce(&'t mut Self::Tx) -> BoxFuture<'t, Result<R, E>> + Send + 'a,
        R: Send + 'a,
        E: From<DomainError> + fmt::Display + Send + 'a;
}
