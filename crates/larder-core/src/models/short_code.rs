// ABOUTME: Short code newtype identifying a recipe in shareable links
// ABOUTME: Fixed-width zero-padded decimal strings, parsed strictly from path segments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use crate::constants::short_codes::MAX_SUPPORTED_LENGTH;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compact decimal token identifying a recipe, distinct from its primary key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// Render `value` as a code of exactly `length` digits
    ///
    /// Returns `None` when the value does not fit in `length` digits or the
    /// length is outside `1..=18`.
    #[must_use]
    pub fn from_number(value: u64, length: usize) -> Option<Self> {
        if length == 0 || length > MAX_SUPPORTED_LENGTH || value >= 10_u64.pow(length as u32) {
            return None;
        }
        Some(Self(format!("{value:0length$}")))
    }

    /// Parse a code received from a client
    ///
    /// Only ASCII digits are accepted; anything else cannot name a recipe.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_SUPPORTED_LENGTH
            && raw.bytes().all(|b| b.is_ascii_digit());
        valid.then(|| Self(raw.to_owned()))
    }

    /// Borrow the code as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of digits in the code
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the code has no digits; always `false` for a parsed code
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
