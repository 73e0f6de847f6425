// Repository Port (Interface)

use crate::context::Context;
use crate::error::{DomainError, Result};
use async_trait::async_trait;

/// Offset/limit window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 100;

    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: limit.max(0),
        }
    }

    pub fn first(limit: i64) -> Self {
        Self::new(0, limit)
    }

    /// Window after this one
    pub fn next(self) -> Self {
        Self::new(self.offset.saturating_add(self.limit), self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(Self::DEFAULT_LIMIT)
    }
}

/// Uniform CRUD/query surface for entity `T`.
///
/// Every operation has a default that fails with an `Unhandled` error tagged
/// `not_implemented`; a specialization overrides only what it supports.
///
/// Absence is not an error: `get` returns `Ok(None)` and list operations
/// return an empty `Vec`. Every failure is already classified.
#[async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Primary key type
    type Id: Send + Sync;

    /// Caller-defined predicate for `get_all`/`search`
    type Filter: Send + Sync;

    /// Transactional handle accepted by the `*_tx` variants
    type Tx: Send;

    async fn create(&self, _ctx: &Context, _entity: &T) -> Result<()> {
        Err(DomainError::not_implemented("create"))
    }

    async fn create_tx(&self, _ctx: &Context, _tx: &mut Self::Tx, _entity: &T) -> Result<()> {
        Err(DomainError::not_implemented("create_tx"))
    }

    /// Exactly one row by primary key; `Ok(None)` when nothing matches
    async fn get(&self, _ctx: &Context, _id: &Self::Id) -> Result<Option<T>> {
        Err(DomainError::not_implemented("get"))
    }

    async fn update(&self, _ctx: &Context, _entity: &T) -> Result<()> {
        Err(DomainError::not_implemented("update"))
    }

    async fn update_tx(&self, _ctx: &Context, _tx: &mut Self::Tx, _entity: &T) -> Result<()> {
        Err(DomainError::not_implemented("update_tx"))
    }

    async fn delete(&self, _ctx: &Context, _id: &Self::Id) -> Result<()> {
        Err(DomainError::not_implemented("delete"))
    }

    async fn delete_tx(&self, _ctx: &Context, _tx: &mut Self::Tx, _id: &Self::Id) -> Result<()> {
        Err(DomainError::not_implemented("delete_tx"))
    }

    async fn get_all(&self, _ctx: &Context, _page: Page, _filter: &Self::Filter) -> Result<Vec<T>> {
        Err(DomainError::not_implemented("get_all"))
    }

    async fn search(&self, _ctx: &Context, _page: Page, _filter: &Self::Filter) -> Result<Vec<T>> {
        Err(DomainError::not_implemented("search"))
    }

    /// `get`, with absence surfaced as `NotFound`
    async fn require(&self, ctx: &Context, id: &Self::Id) -> Result<T> {
        self.get(ctx, id).await?.ok_or_else(DomainError::not_found)
    }
}
