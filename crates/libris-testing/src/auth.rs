//! Bearer-token helpers for integration tests.
//!
//! Mints real HS256 access/refresh tokens with the same secret the test router
//! is configured with, so requests pass through the production extractors.

use std::time::{SystemTime, UNIX_EPOCH};

use http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use libris_auth_types::token::{JwtClaims, TokenType, encode_token};
use libris_domain::user::UserRole;
use uuid::Uuid;

/// Secret shared by test routers and [`TestAuth`].
pub const TEST_JWT_SECRET: &str = "libris-test-secret";

/// Identity to authenticate test requests as.
pub struct TestAuth {
    pub user_id: i32,
    pub role: UserRole,
    pub secret: String,
}

impl TestAuth {
    pub fn new(user_id: i32, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            secret: TEST_JWT_SECRET.to_owned(),
        }
    }

    pub fn reader(user_id: i32) -> Self {
        Self::new(user_id, UserRole::Reader)
    }

    pub fn staff(user_id: i32) -> Self {
        Self::new(user_id, UserRole::Staff)
    }

    pub fn token(&self, token_type: TokenType) -> String {
        let exp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 600;
        let claims = JwtClaims {
            sub: self.user_id.to_string(),
            role: self.role.as_u8(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            exp,
        };
        encode_token(&claims, &self.secret).unwrap()
    }

    pub fn access_token(&self) -> String {
        self.token(TokenType::Access)
    }

    pub fn refresh_token(&self) -> String {
        self.token(TokenType::Refresh)
    }

    /// `Authorization: Bearer <access token>` header pair.
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.access_token())).unwrap();
        (AUTHORIZATION, value)
    }
}
