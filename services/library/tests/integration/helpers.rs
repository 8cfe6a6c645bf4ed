use std::sync::Arc;

use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;

use libris_auth_types::identity::JwtKeys;
use libris_library::domain::repository::{
    AuthorRepository, BookRepository, ChapterRepository, GenreRepository,
};
use libris_library::domain::types::{NewBook, NewChapter};
use libris_library::infra::db::{
    DbAuthorRepository, DbBookRepository, DbChapterRepository, DbCommentaryRepository,
    DbEngagementRepository, DbGenreRepository, DbUserRepository,
};
use libris_library::infra::password::Argon2Hasher;
use libris_library::infra::storage::LocalFileStorage;
use libris_library::router::build_router;
use libris_library::state::AppState;
use libris_library::usecase::token::TokenSettings;
use libris_library_migration::Migrator;
use libris_library_schema::users::ActiveModel as UserRow;
use libris_testing::auth::TEST_JWT_SECRET;

// ── Database ─────────────────────────────────────────────────────────────────

/// Fresh migrated in-memory database. One connection, so every query sees
/// the same memory store.
pub async fn test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

/// Insert an account directly; `staff` sets the role column the API never touches.
pub async fn seed_user(db: &DatabaseConnection, email: &str, staff: bool) -> i32 {
    let model = UserRow {
        email: Set(email.to_owned()),
        password: Set("!".to_owned()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        role: Set(i16::from(staff)),
        is_active: Set(true),
        date_joined: Set(at(2026, 1, 1)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    model.id
}

pub async fn seed_named_user(db: &DatabaseConnection, email: &str, first: &str, last: &str) -> i32 {
    let model = UserRow {
        email: Set(email.to_owned()),
        password: Set("!".to_owned()),
        first_name: Set(first.to_owned()),
        last_name: Set(last.to_owned()),
        role: Set(0),
        is_active: Set(true),
        date_joined: Set(at(2026, 1, 1)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    model.id
}

pub async fn seed_genre(db: &DatabaseConnection, name: &str) -> i32 {
    genres(db).create(name).await.unwrap().id
}

pub async fn seed_author(db: &DatabaseConnection, first: &str, last: &str) -> i32 {
    authors(db).create(first, last).await.unwrap().id
}

pub async fn seed_book(
    db: &DatabaseConnection,
    name: &str,
    pages: i32,
    genre_ids: Vec<i32>,
    author_ids: Vec<i32>,
) -> i32 {
    books(db)
        .create(&NewBook {
            name: name.to_owned(),
            pages,
            summary: String::new(),
            genre_ids,
            author_ids,
        })
        .await
        .unwrap()
}

pub async fn seed_chapter(db: &DatabaseConnection, book_id: i32, name: &str, serial: i32) -> i32 {
    chapters(db)
        .create(&NewChapter {
            book_id,
            name: name.to_owned(),
            serial_number: serial,
        })
        .await
        .unwrap()
        .id
}

// ── Repositories ─────────────────────────────────────────────────────────────

pub fn genres(db: &DatabaseConnection) -> DbGenreRepository {
    DbGenreRepository { db: db.clone() }
}

pub fn authors(db: &DatabaseConnection) -> DbAuthorRepository {
    DbAuthorRepository { db: db.clone() }
}

pub fn books(db: &DatabaseConnection) -> DbBookRepository {
    DbBookRepository { db: db.clone() }
}

pub fn chapters(db: &DatabaseConnection) -> DbChapterRepository {
    DbChapterRepository { db: db.clone() }
}

pub fn commentaries(db: &DatabaseConnection) -> DbCommentaryRepository {
    DbCommentaryRepository { db: db.clone() }
}

pub fn engagement(db: &DatabaseConnection) -> DbEngagementRepository {
    DbEngagementRepository { db: db.clone() }
}

pub fn users(db: &DatabaseConnection) -> DbUserRepository {
    DbUserRepository { db: db.clone() }
}

// ── Router ───────────────────────────────────────────────────────────────────

pub fn test_state(db: DatabaseConnection, media: &TempDir) -> AppState {
    let secret: Arc<str> = Arc::from(TEST_JWT_SECRET);
    AppState {
        db,
        jwt: JwtKeys::new(secret.clone()),
        tokens: TokenSettings {
            secret,
            access_ttl_secs: 300,
            refresh_ttl_secs: 86_400,
        },
        storage: LocalFileStorage::new(media.path()),
        hasher: Argon2Hasher,
        max_upload_bytes: 1024 * 1024,
    }
}

/// Router over a fresh database. Keep the `TempDir` alive for the test's duration.
pub async fn test_server() -> (TestServer, DatabaseConnection, TempDir) {
    let db = test_db().await;
    let media = tempfile::tempdir().unwrap();
    let server = TestServer::new(build_router(test_state(db.clone(), &media))).unwrap();
    (server, db, media)
}
