use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use libris_auth_types::identity::Identity;

use crate::domain::types::Genre;
use crate::error::{JsonBody, LibraryError, PathParam};
use crate::handlers::require_staff;
use crate::state::AppState;
use crate::usecase::catalog::{
    CreateGenreUseCase, DeleteGenreUseCase, GetGenreUseCase, ListGenresUseCase,
    UpdateGenreUseCase,
};

#[derive(Serialize)]
pub struct GenreResponse {
    pub id: i32,
    pub name: String,
}

impl From<Genre> for GenreResponse {
    fn from(genre: Genre) -> Self {
        Self {
            id: genre.id,
            name: genre.name,
        }
    }
}

#[derive(Deserialize)]
pub struct GenreRequest {
    pub name: String,
}

// ── GET /genres ──────────────────────────────────────────────────────────────

pub async fn list_genres(
    State(state): State<AppState>,
) -> Result<Json<Vec<GenreResponse>>, LibraryError> {
    let uc = ListGenresUseCase {
        repo: state.genre_repo(),
    };
    let genres = uc.execute().await?;
    Ok(Json(genres.into_iter().map(GenreResponse::from).collect()))
}

// ── POST /genres ─────────────────────────────────────────────────────────────

pub async fn create_genre(
    identity: Identity,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<GenreRequest>,
) -> Result<(StatusCode, Json<GenreResponse>), LibraryError> {
    require_staff(&identity)?;
    let uc = CreateGenreUseCase {
        repo: state.genre_repo(),
    };
    let genre = uc.execute(&body.name).await?;
    Ok((StatusCode::CREATED, Json(genre.into())))
}

// ── GET /genres/{id} ─────────────────────────────────────────────────────────

pub async fn get_genre(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<GenreResponse>, LibraryError> {
    let uc = GetGenreUseCase {
        repo: state.genre_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

// ── PUT /genres/{id} ─────────────────────────────────────────────────────────

pub async fn update_genre(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<GenreRequest>,
) -> Result<Json<GenreResponse>, LibraryError> {
    require_staff(&identity)?;
    let uc = UpdateGenreUseCase {
        repo: state.genre_repo(),
    };
    Ok(Json(uc.execute(id, &body.name).await?.into()))
}

// ── DELETE /genres/{id} ──────────────────────────────────────────────────────

pub async fn delete_genre(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode, LibraryError> {
    require_staff(&identity)?;
    let uc = DeleteGenreUseCase {
        repo: state.genre_repo(),
    };
    uc.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
