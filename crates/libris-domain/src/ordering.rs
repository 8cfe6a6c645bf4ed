//! Caller-selected ordering for the book listing.
//!
//! Wire format follows the `ordering` query parameter convention: a field
//! name, optionally prefixed with `-` for descending order (`name`, `-pages`).
//! Only allow-listed fields are accepted.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::pagination::Sort;

/// Book columns a caller may order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookOrderField {
    Id,
    Name,
    Pages,
}

impl BookOrderField {
    pub const ALLOWED: [&'static str; 3] = ["id", "name", "pages"];

    fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Pages => "pages",
        }
    }
}

/// Parsed `ordering` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookOrdering {
    pub field: BookOrderField,
    pub sort: Sort,
}

impl Default for BookOrdering {
    fn default() -> Self {
        Self {
            field: BookOrderField::Id,
            sort: Sort::Asc,
        }
    }
}

/// Error returned for an `ordering` value outside the allow-list.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot order by {0:?}; allowed fields: id, name, pages")]
pub struct UnknownOrderField(pub String);

impl FromStr for BookOrdering {
    type Err = UnknownOrderField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sort, name) = match s.strip_prefix('-') {
            Some(rest) => (Sort::Desc, rest),
            None => (Sort::Asc, s),
        };
        let field = match name {
            "id" => BookOrderField::Id,
            "name" => BookOrderField::Name,
            "pages" => BookOrderField::Pages,
            _ => return Err(UnknownOrderField(s.to_owned())),
        };
        Ok(Self { field, sort })
    }
}

impl fmt::Display for BookOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sort == Sort::Desc {
            f.write_str("-")?;
        }
        f.write_str(self.field.as_str())
    }
}
