use crate::domain::repository::{BookRepository, ChapterRepository};
use crate::domain::types::{Chapter, NewChapter, RelatedChapters};
use crate::error::{FieldErrors, LibraryError};
use crate::usecase::{missing_pk, required_text};

const CHAPTER_NAME_MAX: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDetail {
    pub chapter: Chapter,
    pub related: RelatedChapters,
}

async fn validate_chapter<B: BookRepository>(
    books: &B,
    input: NewChapter,
) -> Result<NewChapter, LibraryError> {
    let mut errors = FieldErrors::new();
    let name = required_text(&mut errors, "name", &input.name, CHAPTER_NAME_MAX);
    if input.serial_number < 1 {
        errors.add(
            "serial_number",
            "Ensure this value is greater than or equal to 1.",
        );
    }
    if books.find_by_id(input.book_id).await?.is_none() {
        errors.add("book", missing_pk(input.book_id));
    }
    errors.into_result()?;
    Ok(NewChapter { name, ..input })
}

// ── GetChapter ───────────────────────────────────────────────────────────────

pub struct GetChapterUseCase<C: ChapterRepository> {
    pub chapters: C,
}

impl<C: ChapterRepository> GetChapterUseCase<C> {
    pub async fn execute(&self, id: i32) -> Result<ChapterDetail, LibraryError> {
        let chapter = self
            .chapters
            .find_by_id(id)
            .await?
            .ok_or(LibraryError::ChapterNotFound)?;
        let related = self
            .chapters
            .related(chapter.book_id, chapter.serial_number)
            .await?;
        Ok(ChapterDetail { chapter, related })
    }
}

// ── CreateChapter ────────────────────────────────────────────────────────────

pub struct CreateChapterUseCase<C: ChapterRepository, B: BookRepository> {
    pub chapters: C,
    pub books: B,
}

impl<C: ChapterRepository, B: BookRepository> CreateChapterUseCase<C, B> {
    pub async fn execute(&self, input: NewChapter) -> Result<Chapter, LibraryError> {
        let input = validate_chapter(&self.books, input).await?;
        self.chapters.create(&input).await
    }
}

// ── UpdateChapter ────────────────────────────────────────────────────────────

pub struct UpdateChapterUseCase<C: ChapterRepository, B: BookRepository> {
    pub chapters: C,
    pub books: B,
}

impl<C: ChapterRepository, B: BookRepository> UpdateChapterUseCase<C, B> {
    pub async fn execute(&self, id: i32, input: NewChapter) -> Result<Chapter, LibraryError> {
        if self.chapters.find_by_id(id).await?.is_none() {
            return Err(LibraryError::ChapterNotFound);
        }
        let input = validate_chapter(&self.books, input).await?;
        self.chapters
            .update(id, &input)
            .await?
            .ok_or(LibraryError::ChapterNotFound)
    }
}

// ── DeleteChapter ────────────────────────────────────────────────────────────

pub struct DeleteChapterUseCase<C: ChapterRepository> {
    pub chapters: C,
}

impl<C: ChapterRepository> DeleteChapterUseCase<C> {
    pub async fn execute(&self, id: i32) -> Result<(), LibraryError> {
        if !self.chapters.delete(id).await? {
            return Err(LibraryError::ChapterNotFound);
        }
        Ok(())
    }
}
