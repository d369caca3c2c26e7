//! HTTP implementation of the core remote API contract.

mod client;
mod config;

pub use client::ApiClient;
pub use config::ClientConfig;

#[cfg(test)]
mod test_server;
