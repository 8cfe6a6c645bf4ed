use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use libris_auth_types::identity::Identity;

use crate::domain::types::Author;
use crate::error::{JsonBody, LibraryError, PathParam};
use crate::handlers::{media_url, require_staff};
use crate::state::AppState;
use crate::usecase::catalog::{
    AuthorInput, CreateAuthorUseCase, DeleteAuthorUseCase, GetAuthorUseCase, ListAuthorsUseCase,
    UpdateAuthorUseCase,
};

#[derive(Serialize)]
pub struct AuthorResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub picture: Option<String>,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
            picture: author.picture.as_deref().map(media_url),
        }
    }
}

#[derive(Deserialize)]
pub struct AuthorRequest {
    pub first_name: String,
    pub last_name: String,
}

impl From<AuthorRequest> for AuthorInput {
    fn from(req: AuthorRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
        }
    }
}

// ── GET /authors ─────────────────────────────────────────────────────────────

pub async fn list_authors(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuthorResponse>>, LibraryError> {
    let uc = ListAuthorsUseCase {
        repo: state.author_repo(),
    };
    let authors = uc.execute().await?;
    Ok(Json(authors.into_iter().map(AuthorResponse::from).collect()))
}

// ── POST /authors ────────────────────────────────────────────────────────────

pub async fn create_author(
    identity: Identity,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AuthorRequest>,
) -> Result<(StatusCode, Json<AuthorResponse>), LibraryError> {
    require_staff(&identity)?;
    let uc = CreateAuthorUseCase {
        repo: state.author_repo(),
    };
    let author = uc.execute(body.into()).await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

// ── GET /authors/{id} ────────────────────────────────────────────────────────

pub async fn get_author(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<AuthorResponse>, LibraryError> {
    let uc = GetAuthorUseCase {
        repo: state.author_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

// ── PUT /authors/{id} ────────────────────────────────────────────────────────

pub async fn update_author(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<AuthorRequest>,
) -> Result<Json<AuthorResponse>, LibraryError> {
    require_staff(&identity)?;
    let uc = UpdateAuthorUseCase {
        repo: state.author_repo(),
    };
    Ok(Json(uc.execute(id, body.into()).await?.into()))
}

// ── DELETE /authors/{id} ─────────────────────────────────────────────────────

pub async fn delete_author(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode, LibraryError> {
    require_staff(&identity)?;
    let uc = DeleteAuthorUseCase {
        repo: state.author_repo(),
    };
    uc.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
