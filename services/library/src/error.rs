use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, multipart::MultipartError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Field name → messages, reported with `VALIDATION` errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a `Validation` error.
    pub fn into_result(self) -> Result<(), LibraryError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(LibraryError::Validation(self))
        }
    }
}

/// Library service error variants.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("invalid input")]
    Validation(FieldErrors),
    #[error("no active account found with the given credentials")]
    InvalidCredentials,
    #[error("token is invalid or expired")]
    InvalidToken,
    #[error("forbidden")]
    Forbidden,
    #[error("genre not found")]
    GenreNotFound,
    #[error("author not found")]
    AuthorNotFound,
    #[error("book not found")]
    BookNotFound,
    #[error("chapter not found")]
    ChapterNotFound,
    #[error("commentary not found")]
    CommentaryNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl LibraryError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden => "FORBIDDEN",
            Self::GenreNotFound => "GENRE_NOT_FOUND",
            Self::AuthorNotFound => "AUTHOR_NOT_FOUND",
            Self::BookNotFound => "BOOK_NOT_FOUND",
            Self::ChapterNotFound => "CHAPTER_NOT_FOUND",
            Self::CommentaryNotFound => "COMMENTARY_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl IntoResponse for LibraryError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::GenreNotFound
            | Self::AuthorNotFound
            | Self::BookNotFound
            | Self::ChapterNotFound
            | Self::CommentaryNotFound
            | Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::Validation(FieldErrors(fields)) = self {
            body["fields"] = serde_json::json!(fields);
        }
        (status, axum::Json(body)).into_response()
    }
}

impl From<JsonRejection> for LibraryError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation("non_field_errors", rejection.body_text())
    }
}

impl From<PathRejection> for LibraryError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation("id", rejection.body_text())
    }
}

impl From<MultipartError> for LibraryError {
    fn from(err: MultipartError) -> Self {
        Self::validation("file", err.body_text())
    }
}

/// `Json` extractor whose rejections are reported as `VALIDATION` errors.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(LibraryError))]
pub struct JsonBody<T>(pub T);

/// `Path` extractor; a segment that does not parse is a `VALIDATION` error on `id`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(LibraryError))]
pub struct PathParam<T>(pub T);
