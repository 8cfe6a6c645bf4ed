//! JWT access/refresh token encoding and validation.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Which half of a token pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// User identity extracted from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub user_id: i32,
    pub user_role: u8,
    pub token_type: TokenType,
    pub exp: u64,
}

/// Errors returned by the validation functions.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("wrong token type")]
    WrongTokenType,
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | user id (decimal string) |
/// | `role` | custom | `u8` wire value, see [`libris_domain::user::UserRole`] |
/// | `token_type` | custom | `access` or `refresh` |
/// | `jti` | `jti` | unique token id |
/// | `exp` | `exp` | expiration, seconds since epoch |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub role: u8,
    pub token_type: TokenType,
    pub jti: String,
    pub exp: u64,
}

/// Sign `claims` with HS256.
pub fn encode_token(claims: &JwtClaims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

// ── Core decode (private) ────────────────────────────────────────────────

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256, exp checked with the default 60s leeway, required claims `exp` + `sub`.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

fn token_info(claims: JwtClaims) -> Result<TokenInfo, AuthError> {
    let user_id = claims
        .sub
        .parse::<i32>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        user_role: claims.role,
        token_type: claims.token_type,
        exp: claims.exp,
    })
}

fn validate_typed(token: &str, secret: &str, expected: TokenType) -> Result<TokenInfo, AuthError> {
    let info = token_info(decode_jwt(token, secret)?)?;
    if info.token_type != expected {
        return Err(AuthError::WrongTokenType);
    }
    Ok(info)
}

/// Validate a bearer access token. Refresh tokens are rejected.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    validate_typed(token, secret, TokenType::Access)
}

/// Validate a refresh token. Access tokens are rejected.
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    validate_typed(token, secret, TokenType::Refresh)
}

/// Validate signature and expiry of either token type.
pub fn validate_any_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    token_info(decode_jwt(token, secret)?)
}
