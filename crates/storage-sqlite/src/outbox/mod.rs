mod repository;

pub use repository::SqliteOutboxStore;
