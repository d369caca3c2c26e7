mod repository;

pub use repository::SqliteCategoryStore;
