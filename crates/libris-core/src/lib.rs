//! Cross-cutting plumbing shared by Libris services: configuration loading,
//! tracing setup, HTTP middleware, health probes and small sea-orm helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
