use axum::{
    Json,
    extract::{RawQuery, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use libris_auth_types::identity::{Identity, MaybeIdentity};
use libris_domain::ordering::BookOrdering;
use libris_domain::pagination::PageRequest;

use crate::domain::types::{BookFilter, BookPatch, BookWithLinks, NewBook, PopularBook};
use crate::error::{JsonBody, LibraryError, PathParam};
use crate::handlers::author::AuthorResponse;
use crate::handlers::chapter::ChapterSummary;
use crate::handlers::commentary::CommentaryResponse;
use crate::handlers::genre::GenreResponse;
use crate::handlers::{media_url, parse_query, require_staff};
use crate::state::AppState;
use crate::usecase::book::{
    BookDetail, CreateBookUseCase, DeleteBookUseCase, GetBookUseCase, ListBooksUseCase,
    PopularThisMonthUseCase, UpdateBookUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// List projection: genre and author names only.
#[derive(Serialize)]
pub struct BookListItem {
    pub id: i32,
    pub name: String,
    pub pages: i32,
    pub image: Option<String>,
    pub genres: Vec<String>,
    pub authors: Vec<String>,
}

impl From<BookWithLinks> for BookListItem {
    fn from(b: BookWithLinks) -> Self {
        Self {
            id: b.book.id,
            name: b.book.name,
            pages: b.book.pages,
            image: b.book.image.as_deref().map(media_url),
            genres: b.genres.into_iter().map(|g| g.name).collect(),
            authors: b.authors.iter().map(|a| a.full_name()).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct BookDetailResponse {
    pub id: i32,
    pub name: String,
    pub pages: i32,
    pub summary: String,
    pub image: Option<String>,
    pub genres: Vec<GenreResponse>,
    pub authors: Vec<AuthorResponse>,
    pub chapters: Vec<ChapterSummary>,
    pub comments: Vec<CommentaryResponse>,
    pub views: u64,
    pub likes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_library: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
}

impl From<BookDetail> for BookDetailResponse {
    fn from(d: BookDetail) -> Self {
        let BookWithLinks {
            book,
            genres,
            authors,
        } = d.book;
        Self {
            id: book.id,
            name: book.name,
            pages: book.pages,
            summary: book.summary,
            image: book.image.as_deref().map(media_url),
            genres: genres.into_iter().map(GenreResponse::from).collect(),
            authors: authors.into_iter().map(AuthorResponse::from).collect(),
            chapters: d.chapters.into_iter().map(ChapterSummary::from).collect(),
            comments: d
                .comments
                .into_iter()
                .map(CommentaryResponse::from)
                .collect(),
            views: d.stats.views,
            likes: d.stats.likes,
            in_library: d.flags.map(|f| f.in_library),
            is_liked: d.flags.map(|f| f.is_liked),
        }
    }
}

/// Write projection: links as ids.
#[derive(Serialize)]
pub struct BookResponse {
    pub id: i32,
    pub name: String,
    pub pages: i32,
    pub summary: String,
    pub image: Option<String>,
    pub genres: Vec<i32>,
    pub authors: Vec<i32>,
}

impl From<BookWithLinks> for BookResponse {
    fn from(b: BookWithLinks) -> Self {
        Self {
            id: b.book.id,
            name: b.book.name,
            pages: b.book.pages,
            summary: b.book.summary,
            image: b.book.image.as_deref().map(media_url),
            genres: b.genres.iter().map(|g| g.id).collect(),
            authors: b.authors.iter().map(|a| a.id).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct PopularBookResponse {
    #[serde(flatten)]
    pub book: BookListItem,
    pub month_views: u64,
}

impl From<PopularBook> for PopularBookResponse {
    fn from(p: PopularBook) -> Self {
        Self {
            book: p.book.into(),
            month_views: p.month_views,
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct BookListQuery {
    pub genres: Option<String>,
    pub authors: Option<String>,
    pub ordering: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Deserialize, Default)]
pub struct PopularQuery {
    pub limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct BookRequest {
    pub name: String,
    pub pages: i32,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub genres: Vec<i32>,
    #[serde(default)]
    pub authors: Vec<i32>,
}

impl From<BookRequest> for NewBook {
    fn from(req: BookRequest) -> Self {
        Self {
            name: req.name,
            pages: req.pages,
            summary: req.summary,
            genre_ids: req.genres,
            author_ids: req.authors,
        }
    }
}

#[derive(Deserialize)]
pub struct BookPatchRequest {
    pub name: Option<String>,
    pub pages: Option<i32>,
    pub summary: Option<String>,
    pub genres: Option<Vec<i32>>,
    pub authors: Option<Vec<i32>>,
}

impl From<BookPatchRequest> for BookPatch {
    fn from(req: BookPatchRequest) -> Self {
        Self {
            name: req.name,
            pages: req.pages,
            summary: req.summary,
            genre_ids: req.genres,
            author_ids: req.authors,
        }
    }
}

/// Comma-separated ids, e.g. `genres=1,4`.
fn parse_ids(field: &str, raw: Option<&str>) -> Result<Vec<i32>, LibraryError> {
    let Some(raw) = raw else {
        return Ok(vec![]);
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| LibraryError::validation(field, format!("\"{s}\" is not a valid id.")))
        })
        .collect()
}

// ── GET /books ───────────────────────────────────────────────────────────────

pub async fn list_books(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<BookListItem>>, LibraryError> {
    let query: BookListQuery = parse_query(raw_query)?;
    let filter = BookFilter {
        genre_ids: parse_ids("genres", query.genres.as_deref())?,
        author_ids: parse_ids("authors", query.authors.as_deref())?,
    };
    let ordering = query
        .ordering
        .as_deref()
        .map(str::parse::<BookOrdering>)
        .transpose()
        .map_err(|e| LibraryError::validation("ordering", e.to_string()))?
        .unwrap_or_default();
    let page = PageRequest::from_parts(query.per_page, query.page);

    let uc = ListBooksUseCase {
        books: state.book_repo(),
    };
    let books = uc.execute(filter, ordering, page).await?;
    Ok(Json(books.into_iter().map(BookListItem::from).collect()))
}

// ── POST /books ──────────────────────────────────────────────────────────────

pub async fn create_book(
    identity: Identity,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<BookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), LibraryError> {
    require_staff(&identity)?;
    let uc = CreateBookUseCase {
        books: state.book_repo(),
        genres: state.genre_repo(),
        authors: state.author_repo(),
    };
    let book = uc.execute(body.into()).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

// ── GET /books/popular-this-month ────────────────────────────────────────────

pub async fn popular_this_month(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<PopularBookResponse>>, LibraryError> {
    let query: PopularQuery = parse_query(raw_query)?;
    let uc = PopularThisMonthUseCase {
        books: state.book_repo(),
    };
    let books = uc.execute(Utc::now(), query.limit).await?;
    Ok(Json(books.into_iter().map(PopularBookResponse::from).collect()))
}

// ── GET /books/{id} ──────────────────────────────────────────────────────────

pub async fn get_book(
    MaybeIdentity(identity): MaybeIdentity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<BookDetailResponse>, LibraryError> {
    let uc = GetBookUseCase {
        books: state.book_repo(),
        chapters: state.chapter_repo(),
        commentaries: state.commentary_repo(),
        engagement: state.engagement_repo(),
    };
    let detail = uc
        .execute(id, identity.map(|i| i.user_id), Utc::now())
        .await?;
    Ok(Json(detail.into()))
}

// ── PUT /books/{id} ──────────────────────────────────────────────────────────

pub async fn replace_book(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<BookRequest>,
) -> Result<Json<BookResponse>, LibraryError> {
    require_staff(&identity)?;
    let uc = UpdateBookUseCase {
        books: state.book_repo(),
        genres: state.genre_repo(),
        authors: state.author_repo(),
    };
    let book = uc.execute(id, NewBook::from(body).into()).await?;
    Ok(Json(book.into()))
}

// ── PATCH /books/{id} ────────────────────────────────────────────────────────

pub async fn patch_book(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<BookPatchRequest>,
) -> Result<Json<BookResponse>, LibraryError> {
    require_staff(&identity)?;
    let uc = UpdateBookUseCase {
        books: state.book_repo(),
        genres: state.genre_repo(),
        authors: state.author_repo(),
    };
    let book = uc.execute(id, body.into()).await?;
    Ok(Json(book.into()))
}

// ── DELETE /books/{id} ───────────────────────────────────────────────────────

pub async fn delete_book(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode, LibraryError> {
    require_staff(&identity)?;
    let uc = DeleteBookUseCase {
        books: state.book_repo(),
    };
    uc.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
