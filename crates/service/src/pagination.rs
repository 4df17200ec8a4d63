//! Pagination utilities for the service layer.
//!
//! `Pagination` is the normalized request, `Page` the slice handed back with
//! its `PageMeta`.

use serde::Serialize;

/// Hard upper bound on page size, whatever the configuration asks for.
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self { Self { page, per_page } }

    /// Build from raw query values. Missing or unparsable values fall back to
    /// page 1 and `default_per_page`; the size is capped at `max_per_page`.
    pub fn from_query(page: Option<&str>, per_page: Option<&str>, default_per_page: u32, max_per_page: u32) -> Self {
        let page = page.and_then(|p| p.trim().parse::<u32>().ok()).filter(|p| *p > 0).unwrap_or(1);
        let per_page = per_page
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(default_per_page)
            .min(max_per_page.max(1));
        Self { page, per_page }
    }

    /// Clamp to sane defaults and convert to `u64` (zero-based page index).
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub last_page: u64,
}

impl PageMeta {
    pub fn new(total: u64, pagination: Pagination) -> Self {
        let (idx, per_page) = pagination.normalize();
        let last_page = total.div_ceil(per_page).max(1);
        Self { total, page: idx + 1, per_page, last_page }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self { items, meta: PageMeta::new(total, pagination) }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), meta: self.meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }

    #[test]
    fn from_query_falls_back_and_caps() {
        assert_eq!(Pagination::from_query(None, None, 20, 50), Pagination::new(1, 20));
        assert_eq!(Pagination::from_query(Some("3"), Some("500"), 20, 50), Pagination::new(3, 50));
        assert_eq!(Pagination::from_query(Some("zero"), Some("-2"), 15, 50), Pagination::new(1, 15));
        assert_eq!(Pagination::from_query(Some("0"), Some("0"), 15, 50), Pagination::new(1, 15));
    }

    #[test]
    fn meta_computes_last_page() {
        let meta = PageMeta::new(41, Pagination::new(2, 20));
        assert_eq!(meta.page, 2);
        assert_eq!(meta.last_page, 3);
        assert_eq!(PageMeta::new(0, Pagination::default()).last_page, 1);
    }
}
