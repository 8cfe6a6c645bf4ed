pub mod book;
pub mod catalog;
pub mod chapter;
pub mod commentary;
pub mod engagement;
pub mod token;
pub mod upload;
pub mod user;

use crate::error::FieldErrors;

/// Trim `value` and record blank or over-long input under `field`.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max_chars: usize,
) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "This field may not be blank.");
    } else if value.chars().count() > max_chars {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_chars} characters."),
        );
    }
    value.to_owned()
}

/// Like [`required_text`] but blank is allowed.
pub(crate) fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max_chars: usize,
) -> String {
    let value = value.trim();
    if value.chars().count() > max_chars {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_chars} characters."),
        );
    }
    value.to_owned()
}

pub(crate) fn missing_pk(id: i32) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}
