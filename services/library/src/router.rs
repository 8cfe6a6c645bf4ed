use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

use libris_core::health::{healthz, readiness};
use libris_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    author::{create_author, delete_author, get_author, list_authors, update_author},
    book::{
        create_book, delete_book, get_book, list_books, patch_book, popular_this_month,
        replace_book,
    },
    chapter::{create_chapter, delete_chapter, get_chapter, update_chapter},
    commentary::{add_comment, add_reply, delete_commentary, get_commentary},
    genre::{create_genre, delete_genre, get_genre, list_genres, update_genre},
    library::{list_library, toggle_library, toggle_like},
    token::{obtain_token, refresh_token, verify_token},
    upload::{upload_author_picture, upload_book_image, upload_chapter_file},
    user::{delete_me, get_me, register, update_me},
};
use crate::state::AppState;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await)
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    let media = ServeDir::new(state.storage.root.clone());

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Genres
        .route("/genres", get(list_genres))
        .route("/genres", post(create_genre))
        .route("/genres/{id}", get(get_genre))
        .route("/genres/{id}", put(update_genre))
        .route("/genres/{id}", delete(delete_genre))
        // Authors
        .route("/authors", get(list_authors))
        .route("/authors", post(create_author))
        .route("/authors/{id}", get(get_author))
        .route("/authors/{id}", put(update_author))
        .route("/authors/{id}", delete(delete_author))
        .route(
            "/authors/{id}/upload-picture",
            post(upload_author_picture).layer(upload_limit.clone()),
        )
        // Books
        .route("/books", get(list_books))
        .route("/books", post(create_book))
        .route("/books/popular-this-month", get(popular_this_month))
        .route("/books/{id}", get(get_book))
        .route("/books/{id}", put(replace_book))
        .route("/books/{id}", patch(patch_book))
        .route("/books/{id}", delete(delete_book))
        .route("/books/{id}/toggle-library", post(toggle_library))
        .route("/books/{id}/toggle-like", post(toggle_like))
        .route("/books/{id}/add-comment", post(add_comment))
        .route(
            "/books/{id}/upload-image",
            post(upload_book_image).layer(upload_limit.clone()),
        )
        // Chapters
        .route("/chapters", post(create_chapter))
        .route("/chapters/{id}", get(get_chapter))
        .route("/chapters/{id}", put(update_chapter))
        .route("/chapters/{id}", delete(delete_chapter))
        .route(
            "/chapters/{id}/upload-file",
            post(upload_chapter_file).layer(upload_limit),
        )
        // Commentaries
        .route("/commentaries/{id}", get(get_commentary))
        .route("/commentaries/{id}", delete(delete_commentary))
        .route("/commentaries/{id}/add-reply", post(add_reply))
        // Personal library
        .route("/library", get(list_library))
        // Identity
        .route("/user/register", post(register))
        .route("/user/me", get(get_me))
        .route("/user/me", put(update_me))
        .route("/user/me", patch(update_me))
        .route("/user/me", delete(delete_me))
        .route("/user/token", post(obtain_token))
        .route("/user/token/refresh", post(refresh_token))
        .route("/user/token/verify", post(verify_token))
        // Uploaded files
        .nest_service("/media", media)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
