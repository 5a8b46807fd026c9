//! Storage layer for pixelpost
//!
//! PostgreSQL-backed message store with an in-memory twin used by tests and
//! by `serve` when no database is configured.

#![allow(clippy::absolute_paths, reason = "std paths are clear")]

mod backend;
pub mod error;
mod memory;
pub mod pg_migrations;
pub mod pg_storage;
#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test code")]
mod tests;
pub mod traits;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use pg_storage::PgStorage;
pub use traits::EmailStore;
