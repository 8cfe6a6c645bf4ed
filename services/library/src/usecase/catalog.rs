use crate::domain::repository::{AuthorRepository, GenreRepository};
use crate::domain::types::{Author, Genre};
use crate::error::{FieldErrors, LibraryError};
use crate::usecase::required_text;

const GENRE_NAME_MAX: usize = 64;
const AUTHOR_NAME_MAX: usize = 64;

fn validate_genre_name(name: &str) -> Result<String, LibraryError> {
    let mut errors = FieldErrors::new();
    let name = required_text(&mut errors, "name", name, GENRE_NAME_MAX);
    errors.into_result()?;
    Ok(name)
}

// ── ListGenres ───────────────────────────────────────────────────────────────

pub struct ListGenresUseCase<R: GenreRepository> {
    pub repo: R,
}

impl<R: GenreRepository> ListGenresUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Genre>, LibraryError> {
        self.repo.list().await
    }
}

// ── GetGenre ─────────────────────────────────────────────────────────────────

pub struct GetGenreUseCase<R: GenreRepository> {
    pub repo: R,
}

impl<R: GenreRepository> GetGenreUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Genre, LibraryError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(LibraryError::GenreNotFound)
    }
}

// ── CreateGenre ──────────────────────────────────────────────────────────────

pub struct CreateGenreUseCase<R: GenreRepository> {
    pub repo: R,
}

impl<R: GenreRepository> CreateGenreUseCase<R> {
    pub async fn execute(&self, name: &str) -> Result<Genre, LibraryError> {
        let name = validate_genre_name(name)?;
        self.repo.create(&name).await
    }
}

// ── UpdateGenre ──────────────────────────────────────────────────────────────

pub struct UpdateGenreUseCase<R: GenreRepository> {
    pub repo: R,
}

impl<R: GenreRepository> UpdateGenreUseCase<R> {
    pub async fn execute(&self, id: i32, name: &str) -> Result<Genre, LibraryError> {
        let name = validate_genre_name(name)?;
        self.repo
            .update(id, &name)
            .await?
            .ok_or(LibraryError::GenreNotFound)
    }
}

// ── DeleteGenre ──────────────────────────────────────────────────────────────

pub struct DeleteGenreUseCase<R: GenreRepository> {
    pub repo: R,
}

impl<R: GenreRepository> DeleteGenreUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<(), LibraryError> {
        if !self.repo.delete(id).await? {
            return Err(LibraryError::GenreNotFound);
        }
        Ok(())
    }
}

// ── Authors ──────────────────────────────────────────────────────────────────

pub struct AuthorInput {
    pub first_name: String,
    pub last_name: String,
}

impl AuthorInput {
    fn validated(&self) -> Result<(String, String), LibraryError> {
        let mut errors = FieldErrors::new();
        let first_name = required_text(&mut errors, "first_name", &self.first_name, AUTHOR_NAME_MAX);
        let last_name = required_text(&mut errors, "last_name", &self.last_name, AUTHOR_NAME_MAX);
        errors.into_result()?;
        Ok((first_name, last_name))
    }
}

pub struct ListAuthorsUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> ListAuthorsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Author>, LibraryError> {
        self.repo.list().await
    }
}

pub struct GetAuthorUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> GetAuthorUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Author, LibraryError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(LibraryError::AuthorNotFound)
    }
}

pub struct CreateAuthorUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> CreateAuthorUseCase<R> {
    pub async fn execute(&self, input: AuthorInput) -> Result<Author, LibraryError> {
        let (first_name, last_name) = input.validated()?;
        self.repo.create(&first_name, &last_name).await
    }
}

pub struct UpdateAuthorUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> UpdateAuthorUseCase<R> {
    pub async fn execute(&self, id: i32, input: AuthorInput) -> Result<Author, LibraryError> {
        let (first_name, last_name) = input.validated()?;
        self.repo
            .update(id, &first_name, &last_name)
            .await?
            .ok_or(LibraryError::AuthorNotFound)
    }
}

pub struct DeleteAuthorUseCase<R: AuthorRepository> {
    pub repo: R,
}

impl<R: AuthorRepository> DeleteAuthorUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<(), LibraryError> {
        if !self.repo.delete(id).await? {
            return Err(LibraryError::AuthorNotFound);
        }
        Ok(())
    }
}
