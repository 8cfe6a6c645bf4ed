#![allow(async_fn_in_trait)]

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};

use libris_domain::engagement::ToggleOutcome;
use libris_domain::ordering::BookOrdering;
use libris_domain::pagination::PageRequest;

use crate::domain::types::{
    Author, Book, BookFilter, BookPatch, BookStats, BookWithLinks, Chapter, CommentThread,
    Commentary, Genre, NewBook, NewChapter, NewCommentary, NewUser, PopularBook, ReaderFlags,
    RelatedChapters, User, UserPatch,
};
use crate::error::LibraryError;

/// Repository for genres.
pub trait GenreRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Genre>, LibraryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Genre>, LibraryError>;
    /// Existing genres among `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Genre>, LibraryError>;
    async fn create(&self, name: &str) -> Result<Genre, LibraryError>;
    async fn update(&self, id: i32, name: &str) -> Result<Option<Genre>, LibraryError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, LibraryError>;
}

/// Repository for authors.
pub trait AuthorRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Author>, LibraryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Author>, LibraryError>;
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Author>, LibraryError>;
    async fn create(&self, first_name: &str, last_name: &str) -> Result<Author, LibraryError>;
    async fn update(
        &self,
        id: i32,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<Author>, LibraryError>;
    async fn delete(&self, id: i32) -> Result<bool, LibraryError>;
    /// Store a new picture path. Returns the previous path, `None` if the author is gone.
    async fn set_picture(&self, id: i32, path: &str)
    -> Result<Option<Option<String>>, LibraryError>;
}

/// Repository for books and their genre/author links.
pub trait BookRepository: Send + Sync {
    async fn list(
        &self,
        filter: &BookFilter,
        ordering: BookOrdering,
        page: PageRequest,
    ) -> Result<Vec<BookWithLinks>, LibraryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, LibraryError>;
    async fn find_with_links(&self, id: i32) -> Result<Option<BookWithLinks>, LibraryError>;
    /// Insert the book and its links atomically.
    async fn create(&self, book: &NewBook) -> Result<i32, LibraryError>;
    /// Apply `patch` atomically; links given in the patch replace the old ones.
    /// Returns `false` if the book does not exist.
    async fn update(&self, id: i32, patch: &BookPatch) -> Result<bool, LibraryError>;
    async fn delete(&self, id: i32) -> Result<bool, LibraryError>;
    async fn set_image(&self, id: i32, path: &str) -> Result<Option<Option<String>>, LibraryError>;
    /// Books with the most month-view rows for `month`, ties broken by id.
    async fn popular_in_month(
        &self,
        month: NaiveDate,
        limit: u64,
    ) -> Result<Vec<PopularBook>, LibraryError>;
    /// Books in a user's personal library.
    async fn list_library(&self, user_id: i32) -> Result<Vec<BookWithLinks>, LibraryError>;
}

/// Repository for chapters.
pub trait ChapterRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Chapter>, LibraryError>;
    /// Chapters of a book ordered by serial number, then id.
    async fn list_by_book(&self, book_id: i32) -> Result<Vec<Chapter>, LibraryError>;
    /// Point lookups for `serial_number - 1` and `serial_number + 1` within the book.
    async fn related(
        &self,
        book_id: i32,
        serial_number: i32,
    ) -> Result<RelatedChapters, LibraryError>;
    async fn create(&self, chapter: &NewChapter) -> Result<Chapter, LibraryError>;
    async fn update(&self, id: i32, chapter: &NewChapter) -> Result<Option<Chapter>, LibraryError>;
    async fn delete(&self, id: i32) -> Result<bool, LibraryError>;
    async fn set_file(&self, id: i32, path: &str) -> Result<Option<Option<String>>, LibraryError>;
}

/// Repository for comments and replies.
pub trait CommentaryRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Commentary>, LibraryError>;
    /// Replies to a top-level comment, oldest first.
    async fn list_replies(&self, parent_id: i32) -> Result<Vec<Commentary>, LibraryError>;
    /// Top-level comments of a book with their replies, oldest first.
    async fn list_threads(&self, book_id: i32) -> Result<Vec<CommentThread>, LibraryError>;
    async fn create(&self, commentary: &NewCommentary) -> Result<Commentary, LibraryError>;
    async fn delete(&self, id: i32) -> Result<bool, LibraryError>;
}

/// Per-user book markers: library membership, likes, views.
///
/// Every method runs as a single transaction. Methods taking a `book_id`
/// return `None` when the book does not exist.
pub trait EngagementRepository: Send + Sync {
    async fn toggle_library(
        &self,
        user_id: i32,
        book_id: i32,
    ) -> Result<Option<ToggleOutcome>, LibraryError>;
    async fn toggle_like(
        &self,
        user_id: i32,
        book_id: i32,
    ) -> Result<Option<ToggleOutcome>, LibraryError>;
    /// Get-or-create the view row and stamp the month-view row with `month`.
    async fn record_view(
        &self,
        user_id: i32,
        book_id: i32,
        at: DateTime<Utc>,
        month: NaiveDate,
    ) -> Result<(), LibraryError>;
    async fn stats(&self, book_id: i32) -> Result<BookStats, LibraryError>;
    async fn flags(&self, user_id: i32, book_id: i32) -> Result<ReaderFlags, LibraryError>;
}

/// Repository for accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, LibraryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, LibraryError>;
    /// Fails with `UserAlreadyExists` when the email is taken.
    async fn create(&self, user: &NewUser) -> Result<User, LibraryError>;
    async fn update(&self, id: i32, patch: &UserPatch) -> Result<Option<User>, LibraryError>;
    /// Reassign the user's comments to the sentinel account, then delete the user.
    async fn delete_reassigning_comments(&self, id: i32) -> Result<bool, LibraryError>;
}

/// Password hashing. Verification never errors: malformed hashes do not match.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, LibraryError>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Byte storage for uploaded media, addressed by relative path.
pub trait FileStorage: Send + Sync {
    async fn save(&self, path: &str, bytes: Bytes) -> Result<(), LibraryError>;
    /// Remove a stored file. Missing files are not an error.
    async fn remove(&self, path: &str) -> Result<(), LibraryError>;
}
