//! Shared fixtures: schema, entity repositories and pool setup
#![allow(dead_code)]

use async_trait::async_trait;
use repokit_core::port::{Page, Repository};
use repokit_core::{Context, DomainError, Result};
use repokit_sqlx::{create_sqlite_pool, BaseRepository};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub type Tx = Transaction<'static, Sqlite>;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id),
    amount INTEGER NOT NULL CHECK (amount > 0)
);
"#;

/// Logs go to the test writer; `RUST_LOG` overrides the default level
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}

/// Single-connection in-memory database with the schema applied
pub async fn memory_pool() -> SqlitePool {
    init_tracing();
    let pool = create_sqlite_pool("sqlite::memory:", 1).await.unwrap();
    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();
    pool
}

/// Fresh file-backed database shared by several connections
pub async fn file_pool(name: &str, max_connections: u32) -> SqlitePool {
    init_tracing();
    let path = format!("/tmp/repokit_test_{}_{}.db", name, std::process::id());
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path, suffix));
    }
    let pool = create_sqlite_pool(&format!("sqlite://{}", path), max_connections)
        .await
        .unwrap();
    sqlx::raw_sql(SCHEMA).execute(&pool).await.unwrap();
    pool
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl User {
    pub fn new(id: i64, email: &str, name: &str) -> Self {
        Self {
            id,
            email: email.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub email: Option<String>,
    pub name_like: Option<String>,
}

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository<User, Sqlite>,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool, tracing::info_span!("repository", entity = "users")),
        }
    }

    pub fn base(&self) -> &BaseRepository<User, Sqlite> {
        &self.base
    }
}

#[async_trait]
impl Repository<User> for UserRepository {
    type Id = i64;
    type Filter = UserFilter;
    type Tx = Tx;

    async fn create(&self, ctx: &Context, user: &User) -> Result<()> {
        self.base
            .execute(
                ctx,
                sqlx::query("INSERT INTO users (id, email, name) VALUES (?, ?, ?)")
                    .bind(user.id)
                    .bind(&user.email)
                    .bind(&user.name),
            )
            .await?;
        Ok(())
    }

    async fn create_tx(&self, ctx: &Context, tx: &mut Tx, user: &User) -> Result<()> {
        self.base
            .execute_tx(
                ctx,
                tx,
                sqlx::query("INSERT INTO users (id, email, name) VALUES (?, ?, ?)")
                    .bind(user.id)
                    .bind(&user.email)
                    .bind(&user.name),
            )
            .await?;
        Ok(())
    }

    async fn get(&self, ctx: &Context, id: &i64) -> Result<Option<User>> {
        self.base
            .select_one(
                ctx,
                sqlx::query_as("SELECT id, email, name FROM users WHERE id = ?").bind(*id),
            )
            .await
    }

    async fn update(&self, ctx: &Context, user: &User) -> Result<()> {
        let done = self
            .base
            .execute(
                ctx,
                sqlx::query("UPDATE users SET email = ?, name = ? WHERE id = ?")
                    .bind(&user.email)
                    .bind(&user.name)
                    .bind(user.id),
            )
            .await?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    async fn update_tx(&self, ctx: &Context, tx: &mut Tx, user: &User) -> Result<()> {
        let done = self
            .base
            .execute_tx(
                ctx,
                tx,
                sqlx::query("UPDATE users SET email = ?, name = ? WHERE id = ?")
                    .bind(&user.email)
                    .bind(&user.name)
                    .bind(user.id),
            )
            .await?;
        if done.rows_affected() == 0 {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: &i64) -> Result<()> {
        self.base
            .execute(ctx, sqlx::query("DELETE FROM users WHERE id = ?").bind(*id))
            .await?;
        Ok(())
    }

    async fn delete_tx(&self, ctx: &Context, tx: &mut Tx, id: &i64) -> Result<()> {
        self.base
            .execute_tx(ctx, tx, sqlx::query("DELETE FROM users WHERE id = ?").bind(*id))
            .await?;
        Ok(())
    }

    async fn get_all(&self, ctx: &Context, page: Page, filter: &UserFilter) -> Result<Vec<User>> {
        self.base
            .select_many(
                ctx,
                sqlx::query_as(
                    "SELECT id, email, name FROM users \
                     WHERE (? IS NULL OR email = ?) \
                     ORDER BY id LIMIT ? OFFSET ?",
                )
                .bind(&filter.email)
                .bind(&filter.email)
                .bind(page.limit)
                .bind(page.offset),
            )
            .await
    }

    async fn search(&self, ctx: &Context, page: Page, filter: &UserFilter) -> Result<Vec<User>> {
        self.base
            .select_many_row(
                ctx,
                sqlx::query_as(
                    "SELECT id, email, name FROM users WHERE name LIKE ? \
                     ORDER BY name LIMIT ? OFFSET ?",
                )
                .bind(filter.name_like.as_deref().unwrap_or("%"))
                .bind(page.limit)
                .bind(page.offset),
            )
            .await
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
}

/// Create/read only; every other operation keeps its default
#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository<Order, Sqlite>,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool, tracing::info_span!("repository", entity = "orders")),
        }
    }
}

#[async_trait]
impl Repository<Order> for OrderRepository {
    type Id = i64;
    type Filter = i64;
    type Tx = Tx;

    async fn create(&self, ctx: &Context, order: &Order) -> Result<()> {
        self.base
            .execute(
                ctx,
                sqlx::query("INSERT INTO orders (id, user_id, amount) VALUES (?, ?, ?)")
                    .bind(order.id)
                    .bind(order.user_id)
                    .bind(order.amount),
            )
            .await?;
        Ok(())
    }

    async fn create_tx(&self, ctx: &Context, tx: &mut Tx, order: &Order) -> Result<()> {
        self.base
            .execute_tx(
                ctx,
                tx,
                sqlx::query("INSERT INTO orders (id, user_id, amount) VALUES (?, ?, ?)")
                    .bind(order.id)
                    .bind(order.user_id)
                    .bind(order.amount),
            )
            .await?;
        Ok(())
    }

    async fn get(&self, ctx: &Context, id: &i64) -> Result<Option<Order>> {
        self.base
            .get_single_row(
                ctx,
                sqlx::query_as("SELECT id, user_id, amount FROM orders WHERE id = ?").bind(*id),
            )
            .await
    }

    /// Orders of one user
    async fn get_all(&self, ctx: &Context, page: Page, user_id: &i64) -> Result<Vec<Order>> {
        self.base
            .select_many(
                ctx,
                sqlx::query_as(
                    "SELECT id, user_id, amount FROM orders WHERE user_id = ? \
                     ORDER BY id LIMIT ? OFFSET ?",
                )
                .bind(*user_id)
                .bind(page.limit)
                .bind(page.offset),
            )
            .await
    }
}

pub fn span() -> Span {
    tracing::info_span!("test")
}
