//! Data models: receipts, verification queries and configuration.

pub mod config;
pub mod query;
pub mod receipt;
