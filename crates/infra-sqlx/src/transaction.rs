// sqlx Transaction Runner

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;

use futures::future::BoxFuture;
use futures::FutureExt;
use repokit_core::port::TransactionRunner;
use repokit_core::{Context, DomainError, LocalizedMessages};
use sqlx::{Database, Pool, Transaction};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, warn, Span};

pub const BEGIN_ERROR: &str = "transaction_begin_error";
pub const COMMIT_ERROR: &str = "transaction_commit_error";
pub const PANICKED: &str = "transaction_panicked";

/// Cause attached when a unit of work panics
#[derive(Error, Debug)]
#[error("unit of work panicked: {0}")]
pub struct Panicked(pub String);

/// Runs units of work atomically against a pool.
///
/// Each `exec` call begins its own transaction; the handle never leaves the
/// call. Interruption through the `Context` drops the unit of work and rolls
/// back. Commit is not interruptible.
pub struct TxRunner<DB: Database> {
    pool: Pool<DB>,
    span: Span,
}

impl<DB: Database> Clone for TxRunner<DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            span: self.span.clone(),
        }
    }
}

impl<DB: Database> TxRunner<DB> {
    pub fn new(pool: Pool<DB>, span: Span) -> Self {
        Self { pool, span }
    }

    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }

    /// Begin, run `unit_of_work`, then commit on `Ok` or roll back otherwise.
    ///
    /// The unit of work's own error is returned as is.
    pub async fn exec<F, R, E>(&self, ctx: &Context, unit_of_work: F) -> Result<R, E>
    where
        F: for<'t> FnOnce(&'t mut Transaction<'static, DB>) -> BoxFuture<'t, Result<R, E>>,
        E: From<DomainError> + fmt::Display,
    {
        let mut tx = match ctx.guard(self.pool.begin()).await {
            Ok(Ok(tx)) => tx,
            Ok(Err(err)) => {
                error!(parent: &self.span, error = %err, "Error starting transaction");
                return Err(DomainError::unhandled(BEGIN_ERROR)
                    .with_messages(LocalizedMessages::new(
                        "Не удалось начать транзакцию",
                        "Failed to begin transaction",
                    ))
                    .with_cause(err)
                    .into());
            }
            Err(reason) => {
                warn!(parent: &self.span, reason = %reason, "Transaction not started");
                return Err(DomainError::from(reason).into());
            }
        };
        let started = Instant::now();

        // Building the future runs caller code too, so it happens under catch_unwind
        let handle = &mut tx;
        let outcome = ctx
            .guard(AssertUnwindSafe(async move { unit_of_work(handle).await }).catch_unwind())
            .await;

        let failure: E = match outcome {
            Ok(Ok(Ok(value))) => {
                return match tx.commit().await {
                    Ok(()) => {
                        info!(
                            parent: &self.span,
                            elapsed_ms = elapsed_ms(started),
                            "Transaction committed"
                        );
                        Ok(value)
                    }
                    Err(err) => {
                        error!(parent: &self.span, error = %err, "Error committing transaction");
                        Err(DomainError::unhandled(COMMIT_ERROR)
                            .with_messages(LocalizedMessages::new(
                                "Не удалось зафиксировать транзакцию",
                                "Failed to commit transaction",
                            ))
                            .with_cause(err)
                            .into())
                    }
                };
            }
            Ok(Ok(Err(err))) => {
                warn!(parent: &self.span, error = %err, "Error executing transaction. Rollback...");
                err
            }
            Ok(Err(payload)) => {
                let message = panic_message(payload.as_ref());
                error!(parent: &self.span, panic_msg = %message, "Unit of work panicked. Rollback...");
                DomainError::unhandled(PANICKED)
                    .with_messages(LocalizedMessages::new(
                        "Транзакция прервана",
                        "Transaction aborted",
                    ))
                    .with_cause(Panicked(message))
                    .into()
            }
            Err(reason) => {
                warn!(parent: &self.span, reason = %reason, "Transaction interrupted. Rollback...");
                DomainError::from(reason).into()
            }
        };

        self.rollback(tx, started).await;
        Err(failure)
    }

    /// Rollback failures are logged, never returned
    async fn rollback(&self, tx: Transaction<'static, DB>, started: Instant) {
        match tx.rollback().await {
            Ok(()) => info!(
                parent: &self.span,
                elapsed_ms = elapsed_ms(started),
                "Transaction rolled back"
            ),
            Err(err) => error!(parent: &self.span, error = %err, "Error rolling back transaction"),
        }
    }
}

impl<DB: Database> TransactionRunner for TxRunner<DB> {
    type Tx = Transaction<'static, DB>;

    fn exec<'a, F, R, E>(&'a self, ctx: &'a Context, unit_of_work: F) -> BoxFuture<'a, Result<R, E>>
    where
        F: for<'t> FnOnce(&'t mut Self::Tx) -> BoxFuture<'t, Result<R, E>> + Send + 'a,
        R: Send + 'a,
        E: From<DomainError> + fmt::Display + Send + 'a,
    {
        Box::pin(TxRunner::exec(self, ctx, unit_of_work))
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
