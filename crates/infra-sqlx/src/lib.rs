// Repokit Infrastructure - sqlx Adapter
// Implements: error classification, TransactionRunner, BaseRepository helpers

mod classifier;
mod connection;
mod repository;
mod transaction;

pub use classifier::{classify, ClassifyExt, ErrorClassifier};
pub use connection::{create_pg_pool, create_sqlite_pool, ConnectionError, DatabaseConfig};
pub use repository::BaseRepository;
pub use transaction::{Panicked, TxRunner, BEGIN_ERROR, COMMIT_ERROR, PANICKED};

// Callers build queries with the same sqlx version
pub use sqlx;
