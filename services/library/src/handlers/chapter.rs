use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use libris_auth_types::identity::Identity;

use crate::domain::types::{Chapter, NewChapter, RelatedChapters};
use crate::error::{JsonBody, LibraryError, PathParam};
use crate::handlers::{media_url, require_staff};
use crate::state::AppState;
use crate::usecase::chapter::{
    ChapterDetail, CreateChapterUseCase, DeleteChapterUseCase, GetChapterUseCase,
    UpdateChapterUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// Chapter as listed inside the book detail.
#[derive(Serialize)]
pub struct ChapterSummary {
    pub id: i32,
    pub name: String,
    pub serial_number: i32,
}

impl From<Chapter> for ChapterSummary {
    fn from(c: Chapter) -> Self {
        Self {
            id: c.id,
            name: c.name,
            serial_number: c.serial_number,
        }
    }
}

#[derive(Serialize)]
pub struct RelatedChaptersResponse {
    pub previous: Option<i32>,
    pub next: Option<i32>,
}

impl From<RelatedChapters> for RelatedChaptersResponse {
    fn from(r: RelatedChapters) -> Self {
        Self {
            previous: r.previous,
            next: r.next,
        }
    }
}

#[derive(Serialize)]
pub struct ChapterResponse {
    pub id: i32,
    pub book: i32,
    pub name: String,
    pub serial_number: i32,
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_chapters: Option<RelatedChaptersResponse>,
}

impl ChapterResponse {
    fn new(c: Chapter, related: Option<RelatedChapters>) -> Self {
        Self {
            id: c.id,
            book: c.book_id,
            name: c.name,
            serial_number: c.serial_number,
            file: c.file.as_deref().map(media_url),
            related_chapters: related.map(RelatedChaptersResponse::from),
        }
    }
}

impl From<ChapterDetail> for ChapterResponse {
    fn from(d: ChapterDetail) -> Self {
        Self::new(d.chapter, Some(d.related))
    }
}

#[derive(Deserialize)]
pub struct ChapterRequest {
    pub book: i32,
    pub name: String,
    pub serial_number: i32,
}

impl From<ChapterRequest> for NewChapter {
    fn from(req: ChapterRequest) -> Self {
        Self {
            book_id: req.book,
            name: req.name,
            serial_number: req.serial_number,
        }
    }
}

// ── POST /chapters ───────────────────────────────────────────────────────────

pub async fn create_chapter(
    identity: Identity,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ChapterRequest>,
) -> Result<(StatusCode, Json<ChapterResponse>), LibraryError> {
    require_staff(&identity)?;
    let uc = CreateChapterUseCase {
        chapters: state.chapter_repo(),
        books: state.book_repo(),
    };
    let chapter = uc.execute(body.into()).await?;
    Ok((StatusCode::CREATED, Json(ChapterResponse::new(chapter, None))))
}

// ── GET /chapters/{id} ───────────────────────────────────────────────────────

pub async fn get_chapter(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<ChapterResponse>, LibraryError> {
    let uc = GetChapterUseCase {
        chapters: state.chapter_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

// ── PUT /chapters/{id} ───────────────────────────────────────────────────────

pub async fn update_chapter(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
    JsonBody(body): JsonBody<ChapterRequest>,
) -> Result<Json<ChapterResponse>, LibraryError> {
    require_staff(&identity)?;
    let uc = UpdateChapterUseCase {
        chapters: state.chapter_repo(),
        books: state.book_repo(),
    };
    let chapter = uc.execute(id, body.into()).await?;
    Ok(Json(ChapterResponse::new(chapter, None)))
}

// ── DELETE /chapters/{id} ────────────────────────────────────────────────────

pub async fn delete_chapter(
    identity: Identity,
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<StatusCode, LibraryError> {
    require_staff(&identity)?;
    let uc = DeleteChapterUseCase {
        chapters: state.chapter_repo(),
    };
    uc.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
