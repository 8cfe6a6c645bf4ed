//! Pagination and sort direction types.

use serde::{Deserialize, Serialize};

/// Generic sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sort {
    Desc,
    Asc,
}

/// Page window for list endpoints.
///
/// - `per_page`: 1–100, default 25
/// - `page`: ≥ 1, default 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_per_page", rename = "per-page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_per_page() -> u32 {
    25
}

fn default_page() -> u32 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            page: default_page(),
        }
    }
}

impl PageRequest {
    /// Build from optional query values, falling back to defaults and clamping.
    pub fn from_parts(per_page: Option<u32>, page: Option<u32>) -> Self {
        Self {
            per_page: per_page.unwrap_or_else(default_per_page),
            page: page.unwrap_or_else(default_page),
        }
        .clamped()
    }

    /// Clamp `per_page` to 1–100 and `page` to ≥ 1.
    pub fn clamped(self) -> Self {
        Self {
            per_page: self.per_page.clamp(1, 100),
            page: self.page.max(1),
        }
    }

    /// Row offset of the first item on this page.
    pub fn offset(self) -> u64 {
        let Self { per_page, page } = self.clamped();
        u64::from(page - 1) * u64::from(per_page)
    }

    pub fn limit(self) -> u64 {
        u64::from(self.clamped().per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_per_page_25_page_1() {
        let p = PageRequest::default();
        assert_eq!(p.per_page, 25);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn should_deserialize_defaults_when_fields_absent() {
        let p: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(p, PageRequest::default());
    }

    #[test]
    fn should_clamp_values_built_from_parts() {
        let p = PageRequest::from_parts(Some(500), Some(0));
        assert_eq!(p.per_page, 100);
        assert_eq!(p.page, 1);

        let p = PageRequest::from_parts(None, Some(3));
        assert_eq!(p.per_page, 25);
        assert_eq!(p.page, 3);
    }

    #[test]
    fn should_compute_offset_and_limit() {
        let p = PageRequest {
            per_page: 10,
            page: 3,
        };
        assert_eq!(p.offset(), 20);
        assert_eq!(p.limit(), 10);
        assert_eq!(PageRequest::default().offset(), 0);
    }

    #[test]
    fn should_clamp_before_computing_offset() {
        let p = PageRequest {
            per_page: 0,
            page: 0,
        };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 1);
    }
}
