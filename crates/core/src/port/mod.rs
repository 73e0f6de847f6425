// Port Layer - Interfaces implemented by storage adapters

pub mod repository;
pub mod transaction;

// Re-exports
pub use repository::{Page, Repository};
pub use transaction::TransactionRunner;
