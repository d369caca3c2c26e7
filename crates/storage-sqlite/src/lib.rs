//! SQLite-backed implementations of the core store contracts.
//!
//! All writes funnel through a single worker thread that owns the
//! connection (see [`db::StoreHandle`]); every job runs inside its own
//! transaction.

pub mod accounts;
pub mod categories;
pub mod db;
pub mod errors;
pub mod outbox;
pub mod transactions;

pub use accounts::SqliteAccountStore;
pub use categories::SqliteCategoryStore;
pub use db::{open, open_in_memory, spawn_store, StoreHandle};
pub use errors::StorageError;
pub use outbox::SqliteOutboxStore;
pub use transactions::SqliteTransactionStore;
