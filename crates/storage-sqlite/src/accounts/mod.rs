mod repository;

pub use repository::SqliteAccountStore;
