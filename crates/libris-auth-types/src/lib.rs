//! Auth types shared across Libris crates.
//!
//! Provides JWT encoding/validation and the bearer-token `Identity` extractors.

pub mod identity;
pub mod token;
