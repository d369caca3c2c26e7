//! Domain models, stores, and services for the offline-first finance client.

pub mod accounts;
pub mod categories;
pub mod errors;
pub mod reachability;
pub mod remote;
pub mod sync;
pub mod transactions;
pub mod utils;

pub use errors::{ApiError, Error, FailureClass, Result};

#[cfg(test)]
pub(crate) mod test_support;
