// ABOUTME: Page-number pagination module for list endpoints
// ABOUTME: Provides page requests, the count/next/previous/results envelope and link building
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use serde::{Deserialize, Serialize};

/// A validated page request (1-based page number and page size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Number of items per page
    pub limit: u32,
}

impl PageRequest {
    /// Build a page request from raw query values
    ///
    /// Missing or zero values fall back to page 1 and `default_limit`; the
    /// limit is capped at `max_limit`.
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .min(max_limit.max(1));
        Self { page, limit }
    }

    /// Number of rows to skip
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Whether a page follows this one given the total row count
    #[must_use]
    pub const fn has_next(&self, count: u64) -> bool {
        self.offset() + (self.limit as u64) < count
    }
}

/// Where the paginated resource lives, used to build `next`/`previous` links
#[derive(Debug, Clone, Copy)]
pub struct PageLink<'a> {
    /// Public base URL without trailing slash (e.g. `https://larder.example`)
    pub base_url: &'a str,
    /// Request path (e.g. `/api/recipes`)
    pub path: &'a str,
    /// Raw request query string, if any
    pub query: Option<&'a str>,
}

impl PageLink<'_> {
    /// Absolute URL of `page`, preserving every query pair except `page`
    #[must_use]
    pub fn url_for(&self, page: u32) -> String {
        let mut pairs: Vec<String> = self
            .query
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty() && *pair != "page" && !pair.starts_with("page="))
            .map(str::to_owned)
            .collect();
        // Page 1 is the canonical URL without a page parameter
        if page > 1 {
            pairs.push(format!("page={page}"));
        }

        let base = self.base_url.trim_end_matches('/');
        if pairs.is_empty() {
            format!("{base}{}", self.path)
        } else {
            format!("{base}{}?{}", self.path, pairs.join("&"))
        }
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page<T> {
    /// Total number of items across all pages
    pub count: u64,
    /// Absolute URL of the next page
    pub next: Option<String>,
    /// Absolute URL of the previous page
    pub previous: Option<String>,
    /// Items on this page
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page from one slice of results and the total count
    #[must_use]
    pub fn new(results: Vec<T>, count: u64, request: PageRequest, link: PageLink<'_>) -> Self {
        let next = request
            .has_next(count)
            .then(|| link.url_for(request.page + 1));
        let previous = (request.page > 1).then(|| link.url_for(request.page - 1));
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    /// Transform the items while keeping the pagination metadata
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK: PageLink<'static> = PageLink {
        base_url: "http://localhost:8081/",
        path: "/api/recipes",
        query: Some("tags=lunch&page=2&limit=2"),
    };

    #[test]
    fn test_page_request_defaults_and_caps() {
        let request = PageRequest::new(None, None, 6, 100);
        assert_eq!(request, PageRequest { page: 1, limit: 6 });

        let request = PageRequest::new(Some(0), Some(500), 6, 100);
        assert_eq!(request, PageRequest { page: 1, limit: 100 });
        assert_eq!(PageRequest::new(Some(3), Some(10), 6, 100).offset(), 20);
    }

    #[test]
    fn test_links_keep_filters_and_replace_page() {
        let request = PageRequest::new(Some(2), Some(2), 6, 100);
        let page = Page::new(vec![3, 4], 5, request, LINK);

        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost:8081/api/recipes?tags=lunch&limit=2&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost:8081/api/recipes?tags=lunch&limit=2")
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let request = PageRequest::new(Some(3), Some(2), 6, 100);
        let page = Page::new(vec![5], 5, request, LINK);
        assert!(page.next.is_none());
        assert!(page.previous.is_some());

        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.results, vec![50]);
    }
}
