use axum::{Json, extract::State};
use serde::Serialize;

use libris_auth_types::identity::Identity;
use libris_domain::engagement::ToggleTarget;

use crate::error::{LibraryError, PathParam};
use crate::handlers::book::BookListItem;
use crate::state::AppState;
use crate::usecase::book::ListLibraryUseCase;
use crate::usecase::engagement::{ToggleLibraryUseCase, ToggleLikeUseCase};

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

// ── GET /library ─────────────────────────────────────────────────────────────

pub async fn list_library(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<BookListItem>>, LibraryError> {
    let uc = ListLibraryUseCase {
        books: state.book_repo(),
    };
    let books = uc.execute(identity.user_id).await?;
    Ok(Json(books.into_iter().map(BookListItem::from).collect()))
}

// ── POST /books/{id}/toggle-library ──────────────────────────────────────────

pub async fn toggle_library(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(book_id): PathParam<i32>,
) -> Result<Json<StatusResponse>, LibraryError> {
    let uc = ToggleLibraryUseCase {
        engagement: state.engagement_repo(),
    };
    let outcome = uc.execute(identity.user_id, book_id).await?;
    Ok(Json(StatusResponse {
        status: outcome.status_message(ToggleTarget::Library),
    }))
}

// ── POST /books/{id}/toggle-like ─────────────────────────────────────────────

pub async fn toggle_like(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(book_id): PathParam<i32>,
) -> Result<Json<StatusResponse>, LibraryError> {
    let uc = ToggleLikeUseCase {
        engagement: state.engagement_repo(),
    };
    let outcome = uc.execute(identity.user_id, book_id).await?;
    Ok(Json(StatusResponse {
        status: outcome.status_message(ToggleTarget::Like),
    }))
}
