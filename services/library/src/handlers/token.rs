use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{JsonBody, LibraryError};
use crate::state::AppState;
use crate::usecase::token::{
    ObtainTokenUseCase, RefreshTokenUseCase, TokenPair, VerifyTokenUseCase,
};

#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access: pair.access,
            refresh: pair.refresh,
        }
    }
}

#[derive(Deserialize)]
pub struct ObtainTokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

#[derive(Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

// ── POST /user/token ─────────────────────────────────────────────────────────

pub async fn obtain_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ObtainTokenRequest>,
) -> Result<Json<TokenPairResponse>, LibraryError> {
    let uc = ObtainTokenUseCase {
        users: state.user_repo(),
        hasher: state.hasher.clone(),
        settings: state.tokens.clone(),
    };
    let pair = uc.execute(&body.email, &body.password, Utc::now()).await?;
    Ok(Json(pair.into()))
}

// ── POST /user/token/refresh ─────────────────────────────────────────────────

pub async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RefreshTokenRequest>,
) -> Result<Json<TokenPairResponse>, LibraryError> {
    let uc = RefreshTokenUseCase {
        users: state.user_repo(),
        settings: state.tokens.clone(),
    };
    let pair = uc.execute(&body.refresh, Utc::now()).await?;
    Ok(Json(pair.into()))
}

// ── POST /user/token/verify ──────────────────────────────────────────────────

pub async fn verify_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VerifyTokenRequest>,
) -> Result<Json<serde_json::Map<String, serde_json::Value>>, LibraryError> {
    let uc = VerifyTokenUseCase {
        settings: state.tokens.clone(),
    };
    uc.execute(&body.token)?;
    Ok(Json(serde_json::Map::new()))
}
