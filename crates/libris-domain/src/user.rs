//! User domain types.

use serde::{Deserialize, Serialize};

/// User permission level.
///
/// Wire format: `u8` (0 = Reader, 1 = Staff). Staff may write to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Reader = 0,
    Staff = 1,
}

impl UserRole {
    /// Convert from `u8` wire value. Returns `None` for unknown values.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Reader),
            1 => Some(Self::Staff),
            _ => None,
        }
    }

    /// Convert to `u8` wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_staff(self) -> bool {
        self == Self::Staff
    }
}

/// Name shown for a comment author: `"first last"`, or the email when both
/// names are blank.
pub fn display_name(first_name: &str, last_name: &str, email: &str) -> String {
    let full = format!("{} {}", first_name.trim(), last_name.trim());
    let full = full.trim();
    if full.is_empty() {
        email.to_owned()
    } else {
        full.to_owned()
    }
}

/// Minimal email sanity check: one `@` with non-empty local part and domain.
pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

/// Minimum password length accepted at registration and update.
pub const MIN_PASSWORD_LEN: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_u8_to_user_role() {
        assert_eq!(UserRole::from_u8(0), Some(UserRole::Reader));
        assert_eq!(UserRole::from_u8(1), Some(UserRole::Staff));
        assert_eq!(UserRole::from_u8(2), None);
    }

    #[test]
    fn should_only_treat_staff_as_staff() {
        assert!(UserRole::Staff.is_staff());
        assert!(!UserRole::Reader.is_staff());
        assert_eq!(UserRole::Staff.as_u8(), 1);
    }

    #[test]
    fn should_join_first_and_last_name() {
        assert_eq!(display_name("Ada", "Lovelace", "ada@example.com"), "Ada Lovelace");
        assert_eq!(display_name("Ada", "", "ada@example.com"), "Ada");
        assert_eq!(display_name("", " Lovelace ", "ada@example.com"), "Lovelace");
    }

    #[test]
    fn should_fall_back_to_email_for_blank_names() {
        assert_eq!(display_name("", "  ", "ada@example.com"), "ada@example.com");
    }

    #[test]
    fn should_check_email_shape() {
        assert!(is_plausible_email("reader@example.com"));
        assert!(!is_plausible_email("reader"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("reader@"));
        assert!(!is_plausible_email("a@b@c"));
    }
}
