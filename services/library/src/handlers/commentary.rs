use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use libris_auth_types::identity::Identity;

use crate::domain::types::{CommentThread, Commentary};
use crate::error::{JsonBody, LibraryError, PathParam};
use crate::state::AppState;
use crate::usecase::commentary::{
    AddCommentUseCase, AddReplyUseCase, DeleteCommentaryUseCase, GetCommentaryUseCase,
};

#[derive(Serialize)]
pub struct CommentaryResponse {
    pub id: i32,
    pub book: Option<i32>,
    pub parent: Option<i32>,
    pub user_id: i32,
    /// Author display name.
    pub user: String,
    pub content: String,
    #[serde(serialize_with = "libris_core::serde::to_rfc3339_ms")]
    pub date: chrono::DateTime<chrono::Utc>,
    pub replies: Vec<CommentaryResponse>,
}

impl From<Commentary> for CommentaryResponse {
    fn from(c: Commentary) -> Self {
        Self {
            id: c.id,
            book: c.book_id,
            parent: c.parent_id,
            user_id: c.author.id,
            user: c.author.display_name,
            content: c.content,
            date: c.created_at,
            replies: vec![],
        }
    }
}

impl From<CommentThread> for CommentaryResponse {
    fn from(thread: CommentThread) -> Self {
        Self {
            replies: thread
                .replies
                .into_iter()
                .map(CommentaryResponse::from)
                .collect(),
            ..thread.comment.into()
        }
    }
}

/// Body of both comment and reply creation. Only `content` is accepted.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub content: String,
}

// ── POST /books/{id}/add-comment ─────────────────────────────────────────────

pub async fn add_comment(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(book_id): PathParam<i32>,
    JsonBody(body): JsonBody<CommentRequest>,
) -> Result<(StatusCode, Json<CommentaryResponse>), LibraryError> {
    let uc = AddCommentUseCase {
        commentaries: state.commentary_repo(),
        books: state.book_repo(),
    };
    let comment = uc
        .execute(identity.user_id, book_id, &body.content, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

// ── POST /commentaries/{id}/add-reply ────────────────────────────────────────

pub async fn add_reply(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<CommentRequest>,
) -> Result<(StatusCode, Json<CommentaryResponse>), LibraryError> {
    let uc = AddReplyUseCase {
        commentaries: state.commentary_repo(),
    };
    let reply = uc
        .execute(identity.user_id, id, &body.content, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(reply.into())))
}

// ── GET /commentaries/{id} ───────────────────────────────────────────────────

pub async fn get_commentary(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<CommentaryResponse>, LibraryError> {
    let uc = GetCommentaryUseCase {
        commentaries: state.commentary_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

// ── DELETE /commentaries/{id} ────────────────────────────────────────────────

pub async fn delete_commentary(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode, LibraryError> {
    let uc = DeleteCommentaryUseCase {
        commentaries: state.commentary_repo(),
    };
    uc.execute(id, &identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
