use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use libris_auth_types::identity::Identity;

use crate::domain::types::User;
use crate::error::{JsonBody, LibraryError};
use crate::state::AppState;
use crate::usecase::user::{
    DeleteMeUseCase, GetMeUseCase, RegisterInput, RegisterUseCase, UpdateMeInput,
    UpdateMeUseCase,
};

#[derive(Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    #[serde(serialize_with = "libris_core::serde::to_rfc3339_ms")]
    pub date_joined: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            is_staff: u.role.is_staff(),
            date_joined: u.date_joined,
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// ── POST /user/register ──────────────────────────────────────────────────────

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), LibraryError> {
    let uc = RegisterUseCase {
        users: state.user_repo(),
        hasher: state.hasher.clone(),
    };
    let user = uc
        .execute(
            RegisterInput {
                email: body.email,
                password: body.password,
                first_name: body.first_name,
                last_name: body.last_name,
            },
            Utc::now(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /user/me ─────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, LibraryError> {
    let uc = GetMeUseCase {
        users: state.user_repo(),
    };
    Ok(Json(uc.execute(identity.user_id).await?.into()))
}

// ── PUT|PATCH /user/me ───────────────────────────────────────────────────────

pub async fn update_me(
    identity: Identity,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<UpdateMeRequest>,
) -> Result<Json<UserResponse>, LibraryError> {
    let uc = UpdateMeUseCase {
        users: state.user_repo(),
        hasher: state.hasher.clone(),
    };
    let user = uc
        .execute(
            identity.user_id,
            UpdateMeInput {
                email: body.email,
                password: body.password,
                first_name: body.first_name,
                last_name: body.last_name,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

// ── DELETE /user/me ──────────────────────────────────────────────────────────

pub async fn delete_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<StatusCode, LibraryError> {
    let uc = DeleteMeUseCase {
        users: state.user_repo(),
    };
    uc.execute(identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
