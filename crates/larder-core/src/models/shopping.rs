// ABOUTME: Shopping list row produced by ingredient aggregation
// ABOUTME: Display renders the exact line format of the downloadable text file
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use serde::{Deserialize, Serialize};
use std::fmt;

/// One consolidated ingredient requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Sum of the amounts across the distinct recipes in the cart
    pub total_amount: u64,
}

impl fmt::Display for ShoppingListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) \u{2014} {}",
            self.name, self.measurement_unit, self.total_amount
        )
    }
}
