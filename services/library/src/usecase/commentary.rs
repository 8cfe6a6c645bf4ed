use chrono::{DateTime, Utc};

use libris_auth_types::identity::Identity;

use crate::domain::repository::{BookRepository, CommentaryRepository};
use crate::domain::types::{CommentThread, Commentary, NewCommentary};
use crate::error::LibraryError;

fn validate_content(content: &str) -> Result<String, LibraryError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(LibraryError::validation(
            "content",
            "This field may not be blank.",
        ));
    }
    Ok(content.to_owned())
}

// ── AddComment ───────────────────────────────────────────────────────────────

pub struct AddCommentUseCase<M: CommentaryRepository, B: BookRepository> {
    pub commentaries: M,
    pub books: B,
}

impl<M: CommentaryRepository, B: BookRepository> AddCommentUseCase<M, B> {
    pub async fn execute(
        &self,
        user_id: i32,
        book_id: i32,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Commentary, LibraryError> {
        let content = validate_content(content)?;
        if self.books.find_by_id(book_id).await?.is_none() {
            return Err(LibraryError::BookNotFound);
        }
        self.commentaries
            .create(&NewCommentary {
                book_id: Some(book_id),
                parent_id: None,
                user_id,
                content,
                created_at: now,
            })
            .await
    }
}

// ── AddReply ─────────────────────────────────────────────────────────────────

pub struct AddReplyUseCase<M: CommentaryRepository> {
    pub commentaries: M,
}

impl<M: CommentaryRepository> AddReplyUseCase<M> {
    /// Reply to `target_id`. Replies stay one level deep: answering a reply
    /// attaches to its top-level comment and addresses the reply's author.
    pub async fn execute(
        &self,
        user_id: i32,
        target_id: i32,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Commentary, LibraryError> {
        let content = validate_content(content)?;
        let target = self
            .commentaries
            .find_by_id(target_id)
            .await?
            .ok_or(LibraryError::CommentaryNotFound)?;

        let (parent_id, content) = match target.parent_id {
            Some(top_level) => (
                top_level,
                format!("{}, {content}", target.author.display_name),
            ),
            None => (target.id, content),
        };

        self.commentaries
            .create(&NewCommentary {
                book_id: None,
                parent_id: Some(parent_id),
                user_id,
                content,
                created_at: now,
            })
            .await
    }
}

// ── GetCommentary ────────────────────────────────────────────────────────────

pub struct GetCommentaryUseCase<M: CommentaryRepository> {
    pub commentaries: M,
}

impl<M: CommentaryRepository> GetCommentaryUseCase<M> {
    pub async fn execute(&self, id: i32) -> Result<CommentThread, LibraryError> {
        let comment = self
            .commentaries
            .find_by_id(id)
            .await?
            .ok_or(LibraryError::CommentaryNotFound)?;
        let replies = if comment.is_reply() {
            vec![]
        } else {
            self.commentaries.list_replies(id).await?
        };
        Ok(CommentThread { comment, replies })
    }
}

// ── DeleteCommentary ─────────────────────────────────────────────────────────

pub struct DeleteCommentaryUseCase<M: CommentaryRepository> {
    pub commentaries: M,
}

impl<M: CommentaryRepository> DeleteCommentaryUseCase<M> {
    /// Only the author or staff may delete. Replies go with their parent.
    pub async fn execute(&self, id: i32, caller: &Identity) -> Result<(), LibraryError> {
        let comment = self
            .commentaries
            .find_by_id(id)
            .await?
            .ok_or(LibraryError::CommentaryNotFound)?;
        if comment.author.id != caller.user_id && !caller.is_staff() {
            return Err(LibraryError::Forbidden);
        }
        if !self.commentaries.delete(id).await? {
            return Err(LibraryError::CommentaryNotFound);
        }
        Ok(())
    }
}
