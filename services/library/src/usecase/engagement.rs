use libris_domain::engagement::ToggleOutcome;

use crate::domain::repository::EngagementRepository;
use crate::error::LibraryError;

// ── ToggleLibrary ────────────────────────────────────────────────────────────

pub struct ToggleLibraryUseCase<E: EngagementRepository> {
    pub engagement: E,
}

impl<E: EngagementRepository> ToggleLibraryUseCase<E> {
    pub async fn execute(&self, user_id: i32, book_id: i32) -> Result<ToggleOutcome, LibraryError> {
        let outcome = self
            .engagement
            .toggle_library(user_id, book_id)
            .await?
            .ok_or(LibraryError::BookNotFound)?;
        tracing::debug!(user_id, book_id, ?outcome, "library toggled");
        Ok(outcome)
    }
}

// ── ToggleLike ───────────────────────────────────────────────────────────────

pub struct ToggleLikeUseCase<E: EngagementRepository> {
    pub engagement: E,
}

impl<E: EngagementRepository> ToggleLikeUseCase<E> {
    pub async fn execute(&self, user_id: i32, book_id: i32) -> Result<ToggleOutcome, LibraryError> {
        let outcome = self
            .engagement
            .toggle_like(user_id, book_id)
            .await?
            .ok_or(LibraryError::BookNotFound)?;
        tracing::debug!(user_id, book_id, ?outcome, "like toggled");
        Ok(outcome)
    }
}
