use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use libris_auth_types::token::{
    JwtClaims, TokenType, encode_token, validate_any_token, validate_refresh_token,
};

use crate::domain::repository::{PasswordHasher, UserRepository};
use crate::domain::types::User;
use crate::error::LibraryError;

/// Signing secret and token lifetimes.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: Arc<str>,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

fn issue_pair(
    settings: &TokenSettings,
    user: &User,
    now: DateTime<Utc>,
) -> Result<TokenPair, LibraryError> {
    let issued_at = u64::try_from(now.timestamp()).unwrap_or_default();
    let sign = |token_type: TokenType, ttl: u64| {
        encode_token(
            &JwtClaims {
                sub: user.id.to_string(),
                role: user.role.as_u8(),
                token_type,
                jti: Uuid::new_v4().simple().to_string(),
                exp: issued_at + ttl,
            },
            &settings.secret,
        )
        .context("sign token")
    };
    Ok(TokenPair {
        access: sign(TokenType::Access, settings.access_ttl_secs)?,
        refresh: sign(TokenType::Refresh, settings.refresh_ttl_secs)?,
    })
}

// ── ObtainToken ──────────────────────────────────────────────────────────────

pub struct ObtainTokenUseCase<U: UserRepository, H: PasswordHasher> {
    pub users: U,
    pub hasher: H,
    pub settings: TokenSettings,
}

impl<U: UserRepository, H: PasswordHasher> ObtainTokenUseCase<U, H> {
    pub async fn execute(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, LibraryError> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .filter(|u| u.is_active && self.hasher.verify(password, &u.password_hash))
            .ok_or(LibraryError::InvalidCredentials)?;
        tracing::info!(user_id = user.id, "token pair issued");
        issue_pair(&self.settings, &user, now)
    }
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

pub struct RefreshTokenUseCase<U: UserRepository> {
    pub users: U,
    pub settings: TokenSettings,
}

impl<U: UserRepository> RefreshTokenUseCase<U> {
    /// Exchange a refresh token for a new pair. The role is re-read from the
    /// account so promotions take effect on refresh.
    pub async fn execute(&self, refresh: &str, now: DateTime<Utc>) -> Result<TokenPair, LibraryError> {
        let info = validate_refresh_token(refresh, &self.settings.secret).map_err(|e| {
            tracing::debug!(error = %e, "refresh token rejected");
            LibraryError::InvalidToken
        })?;
        let user = self
            .users
            .find_by_id(info.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(LibraryError::InvalidToken)?;
        issue_pair(&self.settings, &user, now)
    }
}

// ── VerifyToken ──────────────────────────────────────────────────────────────

pub struct VerifyTokenUseCase {
    pub settings: TokenSettings,
}

impl VerifyTokenUseCase {
    pub fn execute(&self, token: &str) -> Result<(), LibraryError> {
        validate_any_token(token, &self.settings.secret)
            .map(|_| ())
            .map_err(|_| LibraryError::InvalidToken)
    }
}
