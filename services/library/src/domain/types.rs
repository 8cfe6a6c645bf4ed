use chrono::{DateTime, Datelike, NaiveDate, Utc};

use libris_domain::user::{UserRole, display_name};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub picture: Option<String>,
}

impl Author {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }
}

/// Plain `books` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub pages: i32,
    pub summary: String,
    pub image: Option<String>,
}

/// A book together with its genres and authors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookWithLinks {
    pub book: Book,
    pub genres: Vec<Genre>,
    pub authors: Vec<Author>,
}

/// Fields accepted when creating a book or replacing it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub name: String,
    pub pages: i32,
    pub summary: String,
    pub genre_ids: Vec<i32>,
    pub author_ids: Vec<i32>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub name: Option<String>,
    pub pages: Option<i32>,
    pub summary: Option<String>,
    pub genre_ids: Option<Vec<i32>>,
    pub author_ids: Option<Vec<i32>>,
}

impl From<NewBook> for BookPatch {
    fn from(book: NewBook) -> Self {
        Self {
            name: Some(book.name),
            pages: Some(book.pages),
            summary: Some(book.summary),
            genre_ids: Some(book.genre_ids),
            author_ids: Some(book.author_ids),
        }
    }
}

/// Optional listing filters. Empty lists mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub genre_ids: Vec<i32>,
    pub author_ids: Vec<i32>,
}

/// Distinct viewer and liker counts for one book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookStats {
    pub views: u64,
    pub likes: u64,
}

/// Per-caller markers shown on the book detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderFlags {
    pub in_library: bool,
    pub is_liked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularBook {
    pub book: BookWithLinks,
    pub month_views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: i32,
    pub book_id: i32,
    pub name: String,
    pub serial_number: i32,
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChapter {
    pub book_id: i32,
    pub name: String,
    pub serial_number: i32,
}

/// Ids of the chapters numbered one below and one above a chapter in the same book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelatedChapters {
    pub previous: Option<i32>,
    pub next: Option<i32>,
}

/// Author of a comment as shown to readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAuthor {
    pub id: i32,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commentary {
    pub id: i32,
    pub book_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub author: CommentAuthor,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Commentary {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Top-level comment with its (single-level) replies, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentThread {
    pub comment: Commentary,
    pub replies: Vec<Commentary>,
}

/// Row to insert: either a top-level comment (`book_id`) or a reply (`parent_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommentary {
    pub book_id: Option<i32>,
    pub parent_id: Option<i32>,
    pub user_id: i32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Account that inherits the comments of deleted users.
pub const SENTINEL_EMAIL: &str = "deleted-user@libris.invalid";
pub const SENTINEL_FIRST_NAME: &str = "Deleted";
pub const SENTINEL_LAST_NAME: &str = "User";
/// Stored in place of a password hash; never matches any input.
pub const UNUSABLE_PASSWORD: &str = "!";

/// First day of the month `at` falls in, the key for month views.
pub fn month_start(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive().with_day(1).unwrap_or_else(|| at.date_naive())
}
