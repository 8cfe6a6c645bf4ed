pub mod author;
pub mod book;
pub mod chapter;
pub mod commentary;
pub mod genre;
pub mod library;
pub mod token;
pub mod upload;
pub mod user;

use serde::de::DeserializeOwned;

use libris_auth_types::identity::Identity;

use crate::error::LibraryError;

/// Catalog writes are reserved for staff.
pub(crate) fn require_staff(identity: &Identity) -> Result<(), LibraryError> {
    if identity.is_staff() {
        Ok(())
    } else {
        Err(LibraryError::Forbidden)
    }
}

/// Parse a raw query string with `serde_qs`; an absent query yields the default.
pub(crate) fn parse_query<T: DeserializeOwned + Default>(
    raw_query: Option<String>,
) -> Result<T, LibraryError> {
    raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|e| LibraryError::validation("query", e.to_string()))
        .map(Option::unwrap_or_default)
}

/// Public URL of a stored upload.
pub(crate) fn media_url(path: &str) -> String {
    format!("/media/{path}")
}
