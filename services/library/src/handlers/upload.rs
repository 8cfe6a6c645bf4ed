use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;

use libris_auth_types::identity::Identity;

use crate::error::{LibraryError, PathParam};
use crate::handlers::{media_url, require_staff};
use crate::state::AppState;
use crate::usecase::upload::{
    Upload, UploadAuthorPictureUseCase, UploadBookImageUseCase, UploadChapterFileUseCase,
};

const FILE_FIELD: &str = "file";

#[derive(Serialize)]
pub struct UploadResponse {
    pub id: i32,
    /// Public URL of the stored file.
    pub url: String,
}

/// Pull the `file` part out of a multipart body; other parts are skipped.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, LibraryError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_owned();
        let bytes = field.bytes().await?;
        return Ok(Upload { filename, bytes });
    }
    Err(LibraryError::validation(FILE_FIELD, "No file was submitted."))
}

// ── POST /authors/{id}/upload-picture ────────────────────────────────────────

pub async fn upload_author_picture(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, LibraryError> {
    require_staff(&identity)?;
    let upload = read_upload(multipart).await?;
    let uc = UploadAuthorPictureUseCase {
        authors: state.author_repo(),
        storage: state.storage.clone(),
    };
    let path = uc.execute(id, upload).await?;
    Ok(Json(UploadResponse {
        id,
        url: media_url(&path),
    }))
}

// ── POST /books/{id}/upload-image ────────────────────────────────────────────

pub async fn upload_book_image(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, LibraryError> {
    require_staff(&identity)?;
    let upload = read_upload(multipart).await?;
    let uc = UploadBookImageUseCase {
        books: state.book_repo(),
        storage: state.storage.clone(),
    };
    let path = uc.execute(id, upload).await?;
    Ok(Json(UploadResponse {
        id,
        url: media_url(&path),
    }))
}

// ── POST /chapters/{id}/upload-file ──────────────────────────────────────────

pub async fn upload_chapter_file(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, LibraryError> {
    require_staff(&identity)?;
    let upload = read_upload(multipart).await?;
    let uc = UploadChapterFileUseCase {
        chapters: state.chapter_repo(),
        books: state.book_repo(),
        storage: state.storage.clone(),
    };
    let path = uc.execute(id, upload).await?;
    Ok(Json(UploadResponse {
        id,
        url: media_url(&path),
    }))
}
