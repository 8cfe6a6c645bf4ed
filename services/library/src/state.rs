use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use libris_auth_types::identity::JwtKeys;

use crate::infra::db::{
    DbAuthorRepository, DbBookRepository, DbChapterRepository, DbCommentaryRepository,
    DbEngagementRepository, DbGenreRepository, DbUserRepository,
};
use crate::infra::password::Argon2Hasher;
use crate::infra::storage::LocalFileStorage;
use crate::usecase::token::TokenSettings;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt: JwtKeys,
    pub tokens: TokenSettings,
    pub storage: LocalFileStorage,
    pub hasher: Argon2Hasher,
    /// Body size cap applied to the upload routes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn genre_repo(&self) -> DbGenreRepository {
        DbGenreRepository {
            db: self.db.clone(),
        }
    }

    pub fn author_repo(&self) -> DbAuthorRepository {
        DbAuthorRepository {
            db: self.db.clone(),
        }
    }

    pub fn book_repo(&self) -> DbBookRepository {
        DbBookRepository {
            db: self.db.clone(),
        }
    }

    pub fn chapter_repo(&self) -> DbChapterRepository {
        DbChapterRepository {
            db: self.db.clone(),
        }
    }

    pub fn commentary_repo(&self) -> DbCommentaryRepository {
        DbCommentaryRepository {
            db: self.db.clone(),
        }
    }

    pub fn engagement_repo(&self) -> DbEngagementRepository {
        DbEngagementRepository {
            db: self.db.clone(),
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
