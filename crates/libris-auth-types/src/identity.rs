//! Bearer-token identity extractors.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Authorization, Header, authorization::Bearer};
use http::StatusCode;
use http::request::Parts;

use libris_domain::user::UserRole;

use crate::token::validate_access_token;

/// HMAC secret used to verify bearer tokens. Handlers' state must expose it via `FromRef`.
#[derive(Clone)]
pub struct JwtKeys {
    pub secret: Arc<str>,
}

impl JwtKeys {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

/// Authenticated caller, taken from a valid `Authorization: Bearer <access token>` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub user_role: u8,
}

impl Identity {
    pub fn is_staff(&self) -> bool {
        UserRole::from_u8(self.user_role).is_some_and(UserRole::is_staff)
    }
}

/// Rejection for missing or invalid credentials. Always 401 with a JSON body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityRejection {
    Missing,
    Invalid,
}

impl IntoResponse for IdentityRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::Missing => "authentication credentials were not provided",
            Self::Invalid => "token is invalid or expired",
        };
        let body = serde_json::json!({
            "kind": "UNAUTHORIZED",
            "message": message,
        });
        (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
    }
}

/// Decode the bearer header synchronously.
///
/// `Ok(None)` when no `Authorization` header is present at all.
fn identity_from_parts(parts: &Parts, secret: &str) -> Result<Option<Identity>, IdentityRejection> {
    let mut values = parts.headers.get_all(http::header::AUTHORIZATION).iter();
    if parts.headers.get(http::header::AUTHORIZATION).is_none() {
        return Ok(None);
    }
    let bearer =
        Authorization::<Bearer>::decode(&mut values).map_err(|_| IdentityRejection::Invalid)?;
    let info = validate_access_token(bearer.token(), secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        IdentityRejection::Invalid
    })?;
    Ok(Some(Identity {
        user_id: info.user_id,
        user_role: info.user_role,
    }))
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = IdentityRejection;

    // Decode synchronously and hand back a 'static future; an `async fn` here would
    // capture the `parts` lifetime.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let keys = JwtKeys::from_ref(state);
        let result = identity_from_parts(parts, &keys.secret)
            .and_then(|identity| identity.ok_or(IdentityRejection::Missing));
        async move { result }
    }
}

/// Optional caller identity: `None` for anonymous requests.
///
/// A header that is present but invalid is still rejected with 401.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = IdentityRejection;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let keys = JwtKeys::from_ref(state);
        let result = identity_from_parts(parts, &keys.secret).map(MaybeIdentity);
        async move { result }
    }
}
