// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for limits, defaults, endpoints and service identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Constants module
//!
//! Constants are grouped into small domain modules rather than being kept in a
//! single flat namespace.

/// Service identity used in logs and health responses
pub mod service_names {
    /// Name of the HTTP API service
    pub const LARDER_SERVER: &str = "larder-server";
}

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
    /// API base path
    pub const API_BASE: &str = "/api";
    /// Prefix of shareable short links
    pub const SHORT_LINK_PREFIX: &str = "/s";
    /// Canonical recipe detail path prefix (redirect target of short links)
    pub const RECIPE_DETAIL_PREFIX: &str = "/api/recipes";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8081;
}

/// Short code generation defaults
pub mod short_codes {
    /// Initial number of digits in a freshly generated code
    pub const DEFAULT_LENGTH: usize = 6;
    /// Widest code the generator may fall back to
    pub const DEFAULT_MAX_LENGTH: usize = 10;
    /// Attempts at one length before the code space is widened
    pub const DEFAULT_ATTEMPTS_PER_LENGTH: u32 = 8;
    /// Hard ceiling: 10^18 still fits in a `u64` draw
    pub const MAX_SUPPORTED_LENGTH: usize = 18;
}

/// Pagination defaults
pub mod pagination {
    /// Default page size for list endpoints
    pub const DEFAULT_PAGE_SIZE: u32 = 6;
    /// Upper bound for the `limit` query parameter
    pub const MAX_PAGE_SIZE: u32 = 100;
}

/// Field length limits
pub mod limits {
    /// Maximum username length
    pub const USERNAME_MAX: usize = 150;
    /// Maximum email length
    pub const EMAIL_MAX: usize = 254;
    /// Maximum first/last name length
    pub const PERSON_NAME_MAX: usize = 150;
    /// Maximum ingredient name and unit length
    pub const INGREDIENT_FIELD_MAX: usize = 64;
    /// Maximum tag name length
    pub const TAG_NAME_MAX: usize = 64;
    /// Maximum tag slug length
    pub const TAG_SLUG_MAX: usize = 32;
    /// Maximum recipe name length
    pub const RECIPE_NAME_MAX: usize = 100;
    /// Minimum cooking time in minutes
    pub const MIN_COOKING_TIME: u32 = 1;
    /// Minimum ingredient amount
    pub const MIN_AMOUNT: u32 = 1;
}

/// Shopping list export
pub mod shopping_list {
    /// Attachment filename of the downloaded shopping list
    pub const FILENAME: &str = "shopping_list.txt";
    /// Content type of the downloaded shopping list
    pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";
}

/// Authentication header handling
pub mod auth {
    /// Scheme used by API tokens
    pub const TOKEN_SCHEME: &str = "Token";
    /// Alternative scheme accepted for the same tokens
    pub const BEARER_SCHEME: &str = "Bearer";
    /// Number of random bytes in a freshly issued token
    pub const TOKEN_BYTES: usize = 32;
}

/// HTTP server limits
pub mod http {
    /// Largest accepted request body; recipe images arrive inline as base64
    pub const REQUEST_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;
    /// Per-request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
