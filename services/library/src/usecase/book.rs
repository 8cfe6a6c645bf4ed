use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use libris_domain::ordering::BookOrdering;
use libris_domain::pagination::PageRequest;

use crate::domain::repository::{
    AuthorRepository, BookRepository, ChapterRepository, CommentaryRepository,
    EngagementRepository, GenreRepository,
};
use crate::domain::types::{
    BookFilter, BookPatch, BookStats, BookWithLinks, Chapter, CommentThread, NewBook, PopularBook,
    ReaderFlags, month_start,
};
use crate::error::{FieldErrors, LibraryError};
use crate::usecase::{missing_pk, required_text};

const BOOK_NAME_MAX: usize = 255;
pub const POPULAR_LIMIT_DEFAULT: u32 = 10;
pub const POPULAR_LIMIT_MAX: u32 = 100;

/// Validate the fields present in `patch` and return them normalised.
///
/// Genre and author ids must all exist; unknown ones are reported per field.
async fn validate_patch<G: GenreRepository, A: AuthorRepository>(
    genres: &G,
    authors: &A,
    patch: BookPatch,
) -> Result<BookPatch, LibraryError> {
    let mut errors = FieldErrors::new();
    let name = patch
        .name
        .map(|name| required_text(&mut errors, "name", &name, BOOK_NAME_MAX));
    if patch.pages.is_some_and(|pages| pages < 1) {
        errors.add("pages", "Ensure this value is greater than or equal to 1.");
    }
    let genre_ids = match patch.genre_ids {
        Some(ids) => {
            let ids = dedup(ids);
            let found: BTreeSet<i32> = genres
                .find_by_ids(&ids)
                .await?
                .iter()
                .map(|g| g.id)
                .collect();
            for id in ids.iter().filter(|id| !found.contains(id)) {
                errors.add("genres", missing_pk(*id));
            }
            Some(ids)
        }
        None => None,
    };
    let author_ids = match patch.author_ids {
        Some(ids) => {
            let ids = dedup(ids);
            let found: BTreeSet<i32> = authors
                .find_by_ids(&ids)
                .await?
                .iter()
                .map(|a| a.id)
                .collect();
            for id in ids.iter().filter(|id| !found.contains(id)) {
                errors.add("authors", missing_pk(*id));
            }
            Some(ids)
        }
        None => None,
    };
    errors.into_result()?;
    Ok(BookPatch {
        name,
        pages: patch.pages,
        summary: patch.summary,
        genre_ids,
        author_ids,
    })
}

fn dedup(mut ids: Vec<i32>) -> Vec<i32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

// ── ListBooks ────────────────────────────────────────────────────────────────

pub struct ListBooksUseCase<B: BookRepository> {
    pub books: B,
}

impl<B: BookRepository> ListBooksUseCase<B> {
    pub async fn execute(
        &self,
        filter: BookFilter,
        ordering: BookOrdering,
        page: PageRequest,
    ) -> Result<Vec<BookWithLinks>, LibraryError> {
        self.books.list(&filter, ordering, page.clamped()).await
    }
}

// ── GetBook ──────────────────────────────────────────────────────────────────

/// Everything the book detail page shows.
#[derive(Debug, Clone)]
pub struct BookDetail {
    pub book: BookWithLinks,
    pub chapters: Vec<Chapter>,
    pub comments: Vec<CommentThread>,
    pub stats: BookStats,
    /// Present only for an authenticated caller.
    pub flags: Option<ReaderFlags>,
}

pub struct GetBookUseCase<B, C, M, E>
where
    B: BookRepository,
    C: ChapterRepository,
    M: CommentaryRepository,
    E: EngagementRepository,
{
    pub books: B,
    pub chapters: C,
    pub commentaries: M,
    pub engagement: E,
}

impl<B, C, M, E> GetBookUseCase<B, C, M, E>
where
    B: BookRepository,
    C: ChapterRepository,
    M: CommentaryRepository,
    E: EngagementRepository,
{
    /// Load the detail projection. An authenticated `viewer` is recorded as
    /// a view of the book before the counts are read.
    pub async fn execute(
        &self,
        id: i32,
        viewer: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<BookDetail, LibraryError> {
        let book = self
            .books
            .find_with_links(id)
            .await?
            .ok_or(LibraryError::BookNotFound)?;

        let flags = match viewer {
            Some(user_id) => match self
                .engagement
                .record_view(user_id, id, now, month_start(now))
                .await
            {
                Ok(()) => Some(self.engagement.flags(user_id, id).await?),
                // Token outlived its account; answer as for an anonymous reader.
                Err(LibraryError::InvalidToken) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };

        let chapters = self.chapters.list_by_book(id).await?;
        let comments = self.commentaries.list_threads(id).await?;
        let stats = self.engagement.stats(id).await?;

        Ok(BookDetail {
            book,
            chapters,
            comments,
            stats,
            flags,
        })
    }
}

// ── CreateBook ───────────────────────────────────────────────────────────────

pub struct CreateBookUseCase<B: BookRepository, G: GenreRepository, A: AuthorRepository> {
    pub books: B,
    pub genres: G,
    pub authors: A,
}

impl<B: BookRepository, G: GenreRepository, A: AuthorRepository> CreateBookUseCase<B, G, A> {
    pub async fn execute(&self, input: NewBook) -> Result<BookWithLinks, LibraryError> {
        let patch = validate_patch(&self.genres, &self.authors, input.into()).await?;
        let book = NewBook {
            name: patch.name.unwrap_or_default(),
            pages: patch.pages.unwrap_or_default(),
            summary: patch.summary.unwrap_or_default(),
            genre_ids: patch.genre_ids.unwrap_or_default(),
            author_ids: patch.author_ids.unwrap_or_default(),
        };
        let id = self.books.create(&book).await?;
        tracing::info!(book_id = id, "book created");
        self.books
            .find_with_links(id)
            .await?
            .ok_or(LibraryError::BookNotFound)
    }
}

// ── UpdateBook ───────────────────────────────────────────────────────────────

pub struct UpdateBookUseCase<B: BookRepository, G: GenreRepository, A: AuthorRepository> {
    pub books: B,
    pub genres: G,
    pub authors: A,
}

impl<B: BookRepository, G: GenreRepository, A: AuthorRepository> UpdateBookUseCase<B, G, A> {
    /// Apply a full (`PUT`) or partial (`PATCH`) update; the caller decides
    /// which by how many fields it fills in.
    pub async fn execute(&self, id: i32, patch: BookPatch) -> Result<BookWithLinks, LibraryError> {
        if self.books.find_by_id(id).await?.is_none() {
            return Err(LibraryError::BookNotFound);
        }
        let patch = validate_patch(&self.genres, &self.authors, patch).await?;
        if !self.books.update(id, &patch).await? {
            return Err(LibraryError::BookNotFound);
        }
        self.books
            .find_with_links(id)
            .await?
            .ok_or(LibraryError::BookNotFound)
    }
}

// ── DeleteBook ───────────────────────────────────────────────────────────────

pub struct DeleteBookUseCase<B: BookRepository> {
    pub books: B,
}

impl<B: BookRepository> DeleteBookUseCase<B> {
    pub async fn execute(&self, id: i32) -> Result<(), LibraryError> {
        if !self.books.delete(id).await? {
            return Err(LibraryError::BookNotFound);
        }
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}

// ── PopularThisMonth ─────────────────────────────────────────────────────────

pub struct PopularThisMonthUseCase<B: BookRepository> {
    pub books: B,
}

impl<B: BookRepository> PopularThisMonthUseCase<B> {
    pub async fn execute(
        &self,
        now: DateTime<Utc>,
        limit: Option<u32>,
    ) -> Result<Vec<PopularBook>, LibraryError> {
        let limit = limit.unwrap_or(POPULAR_LIMIT_DEFAULT);
        if !(1..=POPULAR_LIMIT_MAX).contains(&limit) {
            return Err(LibraryError::validation(
                "limit",
                format!("Ensure this value is between 1 and {POPULAR_LIMIT_MAX}."),
            ));
        }
        self.books
            .popular_in_month(month_start(now), u64::from(limit))
            .await
    }
}

// ── ListLibrary ──────────────────────────────────────────────────────────────

pub struct ListLibraryUseCase<B: BookRepository> {
    pub books: B,
}

impl<B: BookRepository> ListLibraryUseCase<B> {
    pub async fn execute(&self, user_id: i32) -> Result<Vec<BookWithLinks>, LibraryError> {
        self.books.list_library(user_id).await
    }
}
