use bytes::Bytes;
use uuid::Uuid;

use libris_domain::attachment::Attachment;

use crate::domain::repository::{
    AuthorRepository, BookRepository, ChapterRepository, FileStorage,
};
use crate::error::LibraryError;

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

fn ensure_not_empty(upload: &Upload) -> Result<(), LibraryError> {
    if upload.bytes.is_empty() {
        return Err(LibraryError::validation(
            "file",
            "The submitted file is empty.",
        ));
    }
    Ok(())
}

/// Finish a replacement after the row update.
///
/// `previous` is `None` when the row vanished in between: the new file is
/// discarded and `missing` returned. Otherwise the old file is removed on a
/// best-effort basis.
async fn settle<S: FileStorage>(
    storage: &S,
    new_path: &str,
    previous: Option<Option<String>>,
    missing: LibraryError,
) -> Result<(), LibraryError> {
    let Some(previous) = previous else {
        if let Err(e) = storage.remove(new_path).await {
            tracing::warn!(error = ?e, path = new_path, "failed to discard orphaned upload");
        }
        return Err(missing);
    };
    if let Some(old) = previous.filter(|old| old != new_path) {
        if let Err(e) = storage.remove(&old).await {
            tracing::warn!(error = ?e, path = %old, "failed to remove replaced upload");
        }
    }
    Ok(())
}

// ── UploadAuthorPicture ──────────────────────────────────────────────────────

pub struct UploadAuthorPictureUseCase<A: AuthorRepository, S: FileStorage> {
    pub authors: A,
    pub storage: S,
}

impl<A: AuthorRepository, S: FileStorage> UploadAuthorPictureUseCase<A, S> {
    /// Store the picture and return its relative path.
    pub async fn execute(&self, author_id: i32, upload: Upload) -> Result<String, LibraryError> {
        ensure_not_empty(&upload)?;
        let author = self
            .authors
            .find_by_id(author_id)
            .await?
            .ok_or(LibraryError::AuthorNotFound)?;
        let path = Attachment::AuthorPicture {
            full_name: &author.full_name(),
        }
        .path(&upload.filename, Uuid::new_v4());
        self.storage.save(&path, upload.bytes).await?;
        let previous = self.authors.set_picture(author_id, &path).await?;
        settle(&self.storage, &path, previous, LibraryError::AuthorNotFound).await?;
        tracing::info!(author_id, path = %path, "author picture uploaded");
        Ok(path)
    }
}

// ── UploadBookImage ──────────────────────────────────────────────────────────

pub struct UploadBookImageUseCase<B: BookRepository, S: FileStorage> {
    pub books: B,
    pub storage: S,
}

impl<B: BookRepository, S: FileStorage> UploadBookImageUseCase<B, S> {
    pub async fn execute(&self, book_id: i32, upload: Upload) -> Result<String, LibraryError> {
        ensure_not_empty(&upload)?;
        let book = self
            .books
            .find_by_id(book_id)
            .await?
            .ok_or(LibraryError::BookNotFound)?;
        let path = Attachment::BookImage {
            book_name: &book.name,
        }
        .path(&upload.filename, Uuid::new_v4());
        self.storage.save(&path, upload.bytes).await?;
        let previous = self.books.set_image(book_id, &path).await?;
        settle(&self.storage, &path, previous, LibraryError::BookNotFound).await?;
        tracing::info!(book_id, path = %path, "book image uploaded");
        Ok(path)
    }
}

// ── UploadChapterFile ────────────────────────────────────────────────────────

pub struct UploadChapterFileUseCase<C: ChapterRepository, B: BookRepository, S: FileStorage> {
    pub chapters: C,
    pub books: B,
    pub storage: S,
}

impl<C: ChapterRepository, B: BookRepository, S: FileStorage> UploadChapterFileUseCase<C, B, S> {
    pub async fn execute(&self, chapter_id: i32, upload: Upload) -> Result<String, LibraryError> {
        ensure_not_empty(&upload)?;
        let chapter = self
            .chapters
            .find_by_id(chapter_id)
            .await?
            .ok_or(LibraryError::ChapterNotFound)?;
        let book = self
            .books
            .find_by_id(chapter.book_id)
            .await?
            .ok_or(LibraryError::ChapterNotFound)?;
        let path = Attachment::ChapterFile {
            book_name: &book.name,
            chapter_name: &chapter.name,
        }
        .path(&upload.filename, Uuid::new_v4());
        self.storage.save(&path, upload.bytes).await?;
        let previous = self.chapters.set_file(chapter_id, &path).await?;
        settle(&self.storage, &path, previous, LibraryError::ChapterNotFound).await?;
        tracing::info!(chapter_id, path = %path, "chapter file uploaded");
        Ok(path)
    }
}
