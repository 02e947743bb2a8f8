// ABOUTME: Recipe tag model with slug validation
// ABOUTME: Tags are created administratively and referenced by id from recipes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use crate::constants::limits::{TAG_NAME_MAX, TAG_SLUG_MAX};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// A recipe tag such as "Breakfast"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Primary key
    pub id: i64,
    /// Display name
    pub name: String,
    /// Unique URL-safe identifier used in filters
    pub slug: String,
}

/// Request to create a tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTag {
    /// Display name
    pub name: String,
    /// Unique slug
    pub slug: String,
}

impl NewTag {
    /// Validate name and slug
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for blank or oversized names and malformed slugs
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() || self.name.chars().count() > TAG_NAME_MAX {
            return Err(AppError::invalid_input(format!(
                "Tag name must be 1..={TAG_NAME_MAX} characters"
            )));
        }
        let slug_ok = !self.slug.is_empty()
            && self.slug.len() <= TAG_SLUG_MAX
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !slug_ok {
            return Err(AppError::invalid_input(format!(
                "Tag slug must be 1..={TAG_SLUG_MAX} characters of [-a-zA-Z0-9_]"
            )));
        }
        Ok(())
    }
}
