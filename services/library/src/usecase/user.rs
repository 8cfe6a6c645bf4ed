use chrono::{DateTime, Utc};

use libris_domain::user::{MIN_PASSWORD_LEN, is_plausible_email};

use crate::domain::repository::{PasswordHasher, UserRepository};
use crate::domain::types::{NewUser, SENTINEL_EMAIL, User, UserPatch};
use crate::error::{FieldErrors, LibraryError};
use crate::usecase::optional_text;

const USER_NAME_MAX: usize = 150;
const EMAIL_MAX: usize = 254;

fn check_email(errors: &mut FieldErrors, email: &str) -> String {
    let email = email.trim();
    if !is_plausible_email(email) || email.chars().count() > EMAIL_MAX {
        errors.add("email", "Enter a valid email address.");
    } else if email.eq_ignore_ascii_case(SENTINEL_EMAIL) {
        errors.add("email", "This email address is reserved.");
    }
    email.to_owned()
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Ensure this field has at least {MIN_PASSWORD_LEN} characters."),
        );
    }
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct RegisterUseCase<U: UserRepository, H: PasswordHasher> {
    pub users: U,
    pub hasher: H,
}

impl<U: UserRepository, H: PasswordHasher> RegisterUseCase<U, H> {
    pub async fn execute(
        &self,
        input: RegisterInput,
        now: DateTime<Utc>,
    ) -> Result<User, LibraryError> {
        let mut errors = FieldErrors::new();
        let email = check_email(&mut errors, &input.email);
        check_password(&mut errors, &input.password);
        let first_name = optional_text(
            &mut errors,
            "first_name",
            input.first_name.as_deref().unwrap_or_default(),
            USER_NAME_MAX,
        );
        let last_name = optional_text(
            &mut errors,
            "last_name",
            input.last_name.as_deref().unwrap_or_default(),
            USER_NAME_MAX,
        );
        errors.into_result()?;

        let user = self
            .users
            .create(&NewUser {
                email,
                password_hash: self.hasher.hash(&input.password)?,
                first_name,
                last_name,
                date_joined: now,
            })
            .await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }
}

// ── GetMe ────────────────────────────────────────────────────────────────────

pub struct GetMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetMeUseCase<U> {
    pub async fn execute(&self, user_id: i32) -> Result<User, LibraryError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(LibraryError::UserNotFound)
    }
}

// ── UpdateMe ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateMeInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateMeInput {
    fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }
}

pub struct UpdateMeUseCase<U: UserRepository, H: PasswordHasher> {
    pub users: U,
    pub hasher: H,
}

impl<U: UserRepository, H: PasswordHasher> UpdateMeUseCase<U, H> {
    pub async fn execute(&self, user_id: i32, input: UpdateMeInput) -> Result<User, LibraryError> {
        if input.is_empty() {
            return Err(LibraryError::validation(
                "non_field_errors",
                "At least one field must be provided.",
            ));
        }
        let mut errors = FieldErrors::new();
        let email = input.email.as_deref().map(|e| check_email(&mut errors, e));
        if let Some(password) = &input.password {
            check_password(&mut errors, password);
        }
        let first_name = input
            .first_name
            .as_deref()
            .map(|n| optional_text(&mut errors, "first_name", n, USER_NAME_MAX));
        let last_name = input
            .last_name
            .as_deref()
            .map(|n| optional_text(&mut errors, "last_name", n, USER_NAME_MAX));
        errors.into_result()?;

        let password_hash = input
            .password
            .as_deref()
            .map(|p| self.hasher.hash(p))
            .transpose()?;
        self.users
            .update(
                user_id,
                &UserPatch {
                    email,
                    password_hash,
                    first_name,
                    last_name,
                },
            )
            .await?
            .ok_or(LibraryError::UserNotFound)
    }
}

// ── DeleteMe ─────────────────────────────────────────────────────────────────

pub struct DeleteMeUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteMeUseCase<U> {
    /// Delete the account; its comments are handed to the sentinel user.
    pub async fn execute(&self, user_id: i32) -> Result<(), LibraryError> {
        if !self.users.delete_reassigning_comments(user_id).await? {
            return Err(LibraryError::UserNotFound);
        }
        tracing::info!(user_id, "user deleted");
        Ok(())
    }
}
