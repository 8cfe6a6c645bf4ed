use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use libris_auth_types::identity::JwtKeys;
use libris_core::config::Config as _;
use libris_core::tracing::init_tracing;

use libris_library::config::LibraryConfig;
use libris_library::infra::password::Argon2Hasher;
use libris_library::infra::storage::LocalFileStorage;
use libris_library::router::build_router;
use libris_library::state::AppState;
use libris_library::usecase::token::TokenSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info,sqlx=warn,sea_orm=warn");

    let config = LibraryConfig::from_env().context("load configuration")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("create media root {}", config.media_root))?;

    let secret: Arc<str> = Arc::from(config.jwt_secret.as_str());
    let state = AppState {
        db,
        jwt: JwtKeys::new(secret.clone()),
        tokens: TokenSettings {
            secret,
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        },
        storage: LocalFileStorage::new(&config.media_root),
        hasher: Argon2Hasher,
        max_upload_bytes: config.max_upload_bytes,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.library_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;

    info!("library service listening on {addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
