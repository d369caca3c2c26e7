mod repository;

pub use repository::SqliteTransactionStore;
