//! Domain types shared across Libris crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Framework adapters (sea-orm helpers, HTTP extractors) live in other crates.

pub mod attachment;
pub mod engagement;
pub mod ordering;
pub mod pagination;
pub mod user;
