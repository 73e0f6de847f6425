// Generic repository helpers over a sqlx pool

use std::future::Future;
use std::marker::PhantomData;

use futures::future::BoxFuture;
use repokit_core::{Context, DomainError, Result};
use sqlx::database::HasStatementCache;
use sqlx::query::{Query, QueryAs};
use sqlx::{Database, Execute, Executor, FromRow, IntoArguments, Pool, Transaction};
use tracing::{warn, Span};

use crate::classifier::ErrorClassifier;
use crate::transaction::TxRunner;

/// Shared plumbing for entity repositories.
///
/// Concrete repositories embed one of these and implement
/// `repokit_core::port::Repository` on top of it. Every helper runs under the
/// caller's `Context` and returns classified errors only. Single-row reads
/// return `Ok(None)` on absence; multi-row reads return an empty `Vec`.
pub struct BaseRepository<T, DB: Database> {
    pool: Pool<DB>,
    trx: TxRunner<DB>,
    classifier: ErrorClassifier,
    span: Span,
    _entity: PhantomData<fn() -> T>,
}

impl<T, DB: Database> Clone for BaseRepository<T, DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            trx: self.trx.clone(),
            classifier: self.classifier.clone(),
            span: self.span.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T, DB: Database> BaseRepository<T, DB> {
    pub fn new(pool: Pool<DB>, span: Span) -> Self {
        Self {
            trx: TxRunner::new(pool.clone(), span.clone()),
            classifier: ErrorClassifier::new(span.clone()),
            pool,
            span,
            _entity: PhantomData,
        }
    }

    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }

    pub fn runner(&self) -> &TxRunner<DB> {
        &self.trx
    }

    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Run `unit_of_work` atomically; see [`TxRunner::exec`]
    pub async fn with_transaction<F, R, E>(
        &self,
        ctx: &Context,
        unit_of_work: F,
    ) -> std::result::Result<R, E>
    where
        F: for<'t> FnOnce(
            &'t mut Transaction<'static, DB>,
        ) -> BoxFuture<'t, std::result::Result<R, E>>,
        E: From<DomainError> + std::fmt::Display,
    {
        self.trx.exec(ctx, unit_of_work).await
    }

    fn query_failed(&self, sql: &str, err: sqlx::Error) -> DomainError {
        let classified = self.classifier.classify(err);
        warn!(parent: &self.span, sql, kind = %classified.kind(), "Query failed");
        classified
    }

    async fn run<O, F>(&self, ctx: &Context, sql: &str, fut: F) -> Result<O>
    where
        F: Future<Output = std::result::Result<O, sqlx::Error>>,
    {
        match ctx.guard(fut).await {
            Ok(Ok(out)) => Ok(out),
            Ok(Err(err)) => Err(self.query_failed(sql, err)),
            Err(reason) => {
                warn!(parent: &self.span, sql, reason = %reason, "Query interrupted");
                Err(reason.into())
            }
        }
    }
}

impl<T, DB> BaseRepository<T, DB>
where
    DB: Database + HasStatementCache,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    T: for<'r> FromRow<'r, DB::Row> + Send + Unpin,
{
    /// At most one row
    pub async fn select_one<'q, A>(
        &self,
        ctx: &Context,
        query: QueryAs<'q, DB, T, A>,
    ) -> Result<Option<T>>
    where
        A: IntoArguments<'q, DB> + Send + 'q,
    {
        let sql = query.sql();
        self.run(ctx, sql, query.fetch_optional(&self.pool)).await
    }

    pub async fn select_many<'q, A>(
        &self,
        ctx: &Context,
        query: QueryAs<'q, DB, T, A>,
    ) -> Result<Vec<T>>
    where
        A: IntoArguments<'q, DB> + Send + 'q,
    {
        let sql = query.sql();
        self.run(ctx, sql, query.fetch_all(&self.pool)).await
    }

    pub async fn select_one_tx<'q, A>(
        &self,
        ctx: &Context,
        tx: &mut Transaction<'static, DB>,
        query: QueryAs<'q, DB, T, A>,
    ) -> Result<Option<T>>
    where
        A: IntoArguments<'q, DB> + Send + 'q,
    {
        let sql = query.sql();
        self.run(ctx, sql, query.fetch_optional(&mut **tx)).await
    }

    pub async fn select_many_tx<'q, A>(
        &self,
        ctx: &Context,
        tx: &mut Transaction<'static, DB>,
        query: QueryAs<'q, DB, T, A>,
    ) -> Result<Vec<T>>
    where
        A: IntoArguments<'q, DB> + Send + 'q,
    {
        let sql = query.sql();
        self.run(ctx, sql, query.fetch_all(&mut **tx)).await
    }

    /// Like `select_one`, but the prepared statement is not cached and is
    /// closed before returning
    pub async fn get_single_row<'q, A>(
        &self,
        ctx: &Context,
        query: QueryAs<'q, DB, T, A>,
    ) -> Result<Option<T>>
    where
        A: IntoArguments<'q, DB> + Send + 'q,
    {
        let sql = query.sql();
        let fut = query.persistent(false).fetch_optional(&self.pool);
        self.run(ctx, sql, fut).await
    }

    /// Like `select_many`, with a one-shot prepared statement
    pub async fn select_many_row<'q, A>(
        &self,
        ctx: &Context,
        query: QueryAs<'q, DB, T, A>,
    ) -> Result<Vec<T>>
    where
        A: IntoArguments<'q, DB> + Send + 'q,
    {
        let sql = query.sql();
        let fut = query.persistent(false).fetch_all(&self.pool);
        self.run(ctx, sql, fut).await
    }

    pub async fn execute<'q, A>(
        &self,
        ctx: &Context,
        query: Query<'q, DB, A>,
    ) -> Result<DB::QueryResult>
    where
        A: IntoArguments<'q, DB> + Send + 'q,
    {
        let sql = query.sql();
        self.run(ctx, sql, query.execute(&self.pool)).await
    }

    pub async fn execute_tx<'q, A>(
        &self,
        ctx: &Context,
        tx: &mut Transaction<'static, DB>,
        query: Query<'q, DB, A>,
    ) -> Result<DB::QueryResult>
    where
        A: IntoArguments<'q, DB> + Send + 'q,
    {
        let sql = query.sql();
        self.run(ctx, sql, query.execute(&mut **tx)).await
    }

    /// Execute through a one-shot prepared statement
    pub async fn prepare_and_exec<'q, A>(
        &self,
        ctx: &Context,
        query: Query<'q, DB, A>,
    ) -> Result<DB::QueryResult>
    where
        A: IntoArguments<'q, DB> + Send + 'q,
    {
        let sql = query.sql();
        let fut = query.persistent(false).execute(&self.pool);
        self.run(ctx, sql, fut).await
    }
}
