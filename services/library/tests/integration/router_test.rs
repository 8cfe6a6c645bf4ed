use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{Value, json};

use libris_testing::auth::TestAuth;

use crate::helpers::{seed_book, seed_chapter, seed_genre, seed_user, test_server};

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_healthy_and_ready() {
    let (server, _db, _media) = test_server().await;
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

// ── Permissions ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_token_for_writes() {
    let (server, _db, _media) = test_server().await;
    let res = server
        .post("/genres")
        .json(&json!({ "name": "Sci-Fi" }))
        .await;
    res.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>()["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn should_forbid_readers_from_catalog_writes() {
    let (server, _db, _media) = test_server().await;
    let (name, value) = TestAuth::reader(1).header();
    server
        .post("/genres")
        .add_header(name, value)
        .json(&json!({ "name": "Sci-Fi" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_reject_garbage_bearer_token() {
    let (server, _db, _media) = test_server().await;
    server
        .get("/library")
        .add_header(AUTHORIZATION, bearer("not.a.jwt"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_let_staff_build_catalog() {
    let (server, _db, _media) = test_server().await;
    let staff = TestAuth::staff(1);

    let (name, value) = staff.header();
    let genre = server
        .post("/genres")
        .add_header(name, value)
        .json(&json!({ "name": "Sci-Fi" }))
        .await;
    genre.assert_status(StatusCode::CREATED);
    let genre_id = genre.json::<Value>()["id"].as_i64().unwrap();

    let (name, value) = staff.header();
    let author = server
        .post("/authors")
        .add_header(name, value)
        .json(&json!({ "first_name": "Frank", "last_name": "Herbert" }))
        .await;
    author.assert_status(StatusCode::CREATED);
    let author_id = author.json::<Value>()["id"].as_i64().unwrap();

    let (name, value) = staff.header();
    let book = server
        .post("/books")
        .add_header(name, value)
        .json(&json!({
            "name": "Dune",
            "pages": 412,
            "genres": [genre_id],
            "authors": [author_id],
        }))
        .await;
    book.assert_status(StatusCode::CREATED);
    let body = book.json::<Value>();
    assert_eq!(body["genres"], json!([genre_id]));
    assert_eq!(body["authors"], json!([author_id]));

    let list = server.get("/books").await.json::<Value>();
    assert_eq!(list[0]["name"], "Dune");
    assert_eq!(list[0]["genres"], json!(["Sci-Fi"]));
    assert_eq!(list[0]["authors"], json!(["Frank Herbert"]));
}

#[tokio::test]
async fn should_report_field_errors_for_invalid_book() {
    let (server, _db, _media) = test_server().await;
    let (name, value) = TestAuth::staff(1).header();
    let res = server
        .post("/books")
        .add_header(name, value)
        .json(&json!({ "name": "  ", "pages": 0, "genres": [7] }))
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let body = res.json::<Value>();
    assert_eq!(body["kind"], "VALIDATION");
    assert!(body["fields"]["name"].is_array());
    assert!(body["fields"]["pages"].is_array());
    assert!(body["fields"]["genres"].is_array());
}

#[tokio::test]
async fn should_reject_unknown_ordering() {
    let (server, _db, _media) = test_server().await;
    let res = server.get("/books?ordering=summary").await;
    res.assert_status(StatusCode::BAD_REQUEST);
    assert!(res.json::<Value>()["fields"]["ordering"].is_array());
}

#[tokio::test]
async fn should_reject_non_numeric_path_id() {
    let (server, _db, _media) = test_server().await;
    let res = server.get("/books/abc").await;
    res.assert_status(StatusCode::BAD_REQUEST);
    let body = res.json::<Value>();
    assert_eq!(body["kind"], "VALIDATION");
    assert!(body["fields"]["id"][0].is_string());
}

#[tokio::test]
async fn should_filter_books_by_query() {
    let (server, db, _media) = test_server().await;
    let scifi = seed_genre(&db, "Sci-Fi").await;
    seed_book(&db, "Dune", 412, vec![scifi], vec![]).await;
    seed_book(&db, "Emma", 474, vec![], vec![]).await;

    let list = server
        .get(&format!("/books?genres={scifi}&ordering=-name"))
        .await
        .json::<Value>();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Dune");
}

#[tokio::test]
async fn should_bound_popular_limit() {
    let (server, _db, _media) = test_server().await;
    server
        .get("/books/popular-this-month?limit=0")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/books/popular-this-month")
        .await
        .assert_status_ok();
}

// ── Book detail and engagement ───────────────────────────────────────────────

#[tokio::test]
async fn should_show_reader_flags_only_when_authenticated() {
    let (server, db, _media) = test_server().await;
    let reader = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    seed_chapter(&db, book, "Arrakis", 1).await;

    let anonymous = server.get(&format!("/books/{book}")).await.json::<Value>();
    assert!(anonymous.get("in_library").is_none());
    assert!(anonymous.get("is_liked").is_none());
    assert_eq!(anonymous["views"], 0);
    assert_eq!(anonymous["chapters"][0]["name"], "Arrakis");

    let (name, value) = TestAuth::reader(reader).header();
    let seen = server
        .get(&format!("/books/{book}"))
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(seen["in_library"], false);
    assert_eq!(seen["is_liked"], false);
    assert_eq!(seen["views"], 1);
}

#[tokio::test]
async fn should_report_toggle_status_messages() {
    let (server, db, _media) = test_server().await;
    let reader = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let auth = TestAuth::reader(reader);

    let mut statuses = Vec::new();
    for path in ["toggle-library", "toggle-library", "toggle-like", "toggle-like"] {
        let (name, value) = auth.header();
        let res = server
            .post(&format!("/books/{book}/{path}"))
            .add_header(name, value)
            .await;
        res.assert_status_ok();
        statuses.push(res.json::<Value>()["status"].as_str().unwrap().to_owned());
    }
    assert_eq!(
        statuses,
        [
            "Book was added",
            "Book was removed",
            "Like was added",
            "Like was removed"
        ]
    );

    let (name, value) = auth.header();
    server
        .post("/books/999/toggle-like")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_list_personal_library_after_toggle() {
    let (server, db, _media) = test_server().await;
    let reader = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let auth = TestAuth::reader(reader);

    let (name, value) = auth.header();
    server
        .post(&format!("/books/{book}/toggle-library"))
        .add_header(name, value)
        .await
        .assert_status_ok();

    let (name, value) = auth.header();
    let library = server
        .get("/library")
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(library[0]["id"], book);
}

// ── Commentaries ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_unknown_comment_fields() {
    let (server, db, _media) = test_server().await;
    let reader = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;

    let (name, value) = TestAuth::reader(reader).header();
    server
        .post(&format!("/books/{book}/add-comment"))
        .add_header(name, value)
        .json(&json!({ "content": "hi", "user": 42 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_nest_reply_in_book_detail() {
    let (server, db, _media) = test_server().await;
    let reader = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let auth = TestAuth::reader(reader);

    let (name, value) = auth.header();
    let comment = server
        .post(&format!("/books/{book}/add-comment"))
        .add_header(name, value)
        .json(&json!({ "content": "Spice must flow" }))
        .await;
    comment.assert_status(StatusCode::CREATED);
    let comment_id = comment.json::<Value>()["id"].as_i64().unwrap();

    let (name, value) = auth.header();
    server
        .post(&format!("/commentaries/{comment_id}/add-reply"))
        .add_header(name, value)
        .json(&json!({ "content": "Indeed" }))
        .await
        .assert_status(StatusCode::CREATED);

    let detail = server.get(&format!("/books/{book}")).await.json::<Value>();
    let comments = detail["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["replies"][0]["content"], "Indeed");
    assert_eq!(comments[0]["user"], "reader@example.com");
}

// ── Identity ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_obtain_token_and_read_profile() {
    let (server, _db, _media) = test_server().await;

    let registered = server
        .post("/user/register")
        .json(&json!({
            "email": "ada@example.com",
            "password": "analytical",
            "first_name": "Ada",
        }))
        .await;
    registered.assert_status(StatusCode::CREATED);
    assert!(registered.json::<Value>().get("password").is_none());

    server
        .post("/user/register")
        .json(&json!({ "email": "ada@example.com", "password": "analytical" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .post("/user/token")
        .json(&json!({ "email": "ada@example.com", "password": "wrong-one" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let pair = server
        .post("/user/token")
        .json(&json!({ "email": "ada@example.com", "password": "analytical" }))
        .await
        .json::<Value>();
    let access = pair["access"].as_str().unwrap().to_owned();
    let refresh = pair["refresh"].as_str().unwrap().to_owned();

    let me = server
        .get("/user/me")
        .add_header(AUTHORIZATION, bearer(&access))
        .await
        .json::<Value>();
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["first_name"], "Ada");
    assert_eq!(me["is_staff"], false);

    server
        .post("/user/token/refresh")
        .json(&json!({ "refresh": refresh }))
        .await
        .assert_status_ok();
    server
        .post("/user/token/refresh")
        .json(&json!({ "refresh": access }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/user/token/verify")
        .json(&json!({ "token": access }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn should_update_and_delete_own_account() {
    let (server, db, _media) = test_server().await;
    let reader = seed_user(&db, "reader@example.com", false).await;
    let auth = TestAuth::reader(reader);

    let (name, value) = auth.header();
    let updated = server
        .patch("/user/me")
        .add_header(name, value)
        .json(&json!({ "last_name": "Lovelace" }))
        .await;
    updated.assert_status_ok();
    assert_eq!(updated.json::<Value>()["last_name"], "Lovelace");

    let (name, value) = auth.header();
    server
        .delete("/user/me")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let (name, value) = auth.header();
    server
        .get("/user/me")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_treat_token_of_deleted_account_as_invalid() {
    let (server, db, _media) = test_server().await;
    let reader = seed_user(&db, "reader@example.com", false).await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;
    let auth = TestAuth::reader(reader);

    let (name, value) = auth.header();
    server
        .delete("/user/me")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let (name, value) = auth.header();
    let detail = server
        .get(&format!("/books/{book}"))
        .add_header(name, value)
        .await;
    detail.assert_status_ok();
    let detail = detail.json::<Value>();
    assert_eq!(detail["views"], 0);
    assert!(detail.get("is_liked").is_none());

    let (name, value) = auth.header();
    let like = server
        .post(&format!("/books/{book}/toggle-like"))
        .add_header(name, value)
        .await;
    like.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(like.json::<Value>()["kind"], "INVALID_TOKEN");

    let (name, value) = auth.header();
    server
        .post(&format!("/books/{book}/add-comment"))
        .add_header(name, value)
        .json(&json!({ "content": "Anyone?" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

// ── Uploads ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_upload_and_serve_it_under_media() {
    let (server, db, media) = test_server().await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"cover-bytes".as_slice())
            .file_name("cover.PNG")
            .mime_type("image/png"),
    );
    let (name, value) = TestAuth::staff(1).header();
    let res = server
        .post(&format!("/books/{book}/upload-image"))
        .add_header(name, value)
        .multipart(form)
        .await;
    res.assert_status_ok();
    let url = res.json::<Value>()["url"].as_str().unwrap().to_owned();
    assert!(url.starts_with("/media/books/dune-"));
    assert!(url.ends_with(".png"));

    let relative = url.trim_start_matches("/media/");
    assert_eq!(
        std::fs::read(media.path().join(relative)).unwrap(),
        b"cover-bytes"
    );
    let served = server.get(&url).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), b"cover-bytes");
}

#[tokio::test]
async fn should_reject_upload_without_file_part() {
    let (server, db, _media) = test_server().await;
    let book = seed_book(&db, "Dune", 412, vec![], vec![]).await;

    let form = MultipartForm::new().add_text("note", "no file here");
    let (name, value) = TestAuth::staff(1).header();
    let res = server
        .post(&format!("/books/{book}/upload-image"))
        .add_header(name, value)
        .multipart(form)
        .await;
    res.assert_status(StatusCode::BAD_REQUEST);
    assert!(res.json::<Value>()["fields"]["file"].is_array());
}
