//! Storage paths for uploaded files (author pictures, book images, chapter files).
//!
//! Paths are built from a slug of the owning entity's name plus a UUID suffix,
//! so repeated uploads never overwrite each other.

use uuid::Uuid;

/// Which entity an uploaded file belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment<'a> {
    AuthorPicture { full_name: &'a str },
    BookImage { book_name: &'a str },
    ChapterFile {
        book_name: &'a str,
        chapter_name: &'a str,
    },
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}

/// Lowercased extension of `filename` including the dot, or empty.
fn extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}

impl Attachment<'_> {
    /// Relative storage path for an upload named `filename`.
    pub fn path(&self, filename: &str, id: Uuid) -> String {
        let ext = extension(filename);
        match self {
            Self::AuthorPicture { full_name } => {
                format!("authors/{}-{id}{ext}", slugify(full_name))
            }
            Self::BookImage { book_name } => {
                format!("books/{}-{id}{ext}", slugify(book_name))
            }
            Self::ChapterFile {
                book_name,
                chapter_name,
            } => format!(
                "books/{}/chapters/{}-{id}{ext}",
                slugify(book_name),
                slugify(chapter_name)
            ),
        }
    }
}
