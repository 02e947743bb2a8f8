// ABOUTME: Environment-based server configuration with defaults and validation
// ABOUTME: Covers listen port, database URL, public base URL, short codes, paging and CORS
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Environment-based configuration management for production deployment

use std::env;

use anyhow::{Context, Result};
use tracing::info;

use crate::constants::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::constants::ports::DEFAULT_HTTP_PORT;
use crate::constants::short_codes::{
    DEFAULT_ATTEMPTS_PER_LENGTH, DEFAULT_LENGTH, DEFAULT_MAX_LENGTH,
};
use crate::short_codes::ShortCodePolicy;

/// Default database location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/larder.db";

/// Default public base URL
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8081";

/// Short code generation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortCodeConfig {
    /// Digits in the first candidates
    pub length: usize,
    /// Widest code ever generated
    pub max_length: usize,
    /// Collisions tolerated per width before widening
    pub attempts_per_length: u32,
}

/// Page-number pagination settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Page size when the request has no `limit`
    pub page_size: u32,
    /// Upper bound for `limit`
    pub max_page_size: u32,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// `SQLite` connection URL
    pub database_url: String,
    /// Externally visible origin used for short links and page links
    pub public_base_url: String,
    /// Short code generation
    pub short_codes: ShortCodeConfig,
    /// List pagination
    pub pagination: PaginationConfig,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_owned(),
            short_codes: ShortCodeConfig {
                length: DEFAULT_LENGTH,
                max_length: DEFAULT_MAX_LENGTH,
                attempts_per_length: DEFAULT_ATTEMPTS_PER_LENGTH,
            },
            pagination: PaginationConfig {
                page_size: DEFAULT_PAGE_SIZE,
                max_page_size: MAX_PAGE_SIZE,
            },
            cors_origins: vec!["*".to_owned()],
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed, or the
    /// resulting configuration is inconsistent
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            database_url: env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            public_base_url: env_var_or("PUBLIC_BASE_URL", DEFAULT_PUBLIC_BASE_URL)
                .trim_end_matches('/')
                .to_owned(),
            short_codes: ShortCodeConfig {
                length: env_var_or("SHORT_CODE_LENGTH", &DEFAULT_LENGTH.to_string())
                    .parse()
                    .context("Invalid SHORT_CODE_LENGTH value")?,
                max_length: env_var_or("SHORT_CODE_MAX_LENGTH", &DEFAULT_MAX_LENGTH.to_string())
                    .parse()
                    .context("Invalid SHORT_CODE_MAX_LENGTH value")?,
                attempts_per_length: env_var_or(
                    "SHORT_CODE_ATTEMPTS",
                    &DEFAULT_ATTEMPTS_PER_LENGTH.to_string(),
                )
                .parse()
                .context("Invalid SHORT_CODE_ATTEMPTS value")?,
            },
            pagination: PaginationConfig {
                page_size: env_var_or("PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string())
                    .parse()
                    .context("Invalid PAGE_SIZE value")?,
                max_page_size: env_var_or("MAX_PAGE_SIZE", &MAX_PAGE_SIZE.to_string())
                    .parse()
                    .context("Invalid MAX_PAGE_SIZE value")?,
            },
            cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", "*")),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error for inconsistent short code or pagination settings
    pub fn validate(&self) -> Result<()> {
        self.short_code_policy()
            .map_err(|e| anyhow::anyhow!(e.message))
            .context("Invalid short code configuration")?;

        if self.pagination.page_size == 0 || self.pagination.max_page_size == 0 {
            return Err(anyhow::anyhow!("PAGE_SIZE and MAX_PAGE_SIZE must be positive"));
        }
        if self.pagination.page_size > self.pagination.max_page_size {
            return Err(anyhow::anyhow!("PAGE_SIZE cannot exceed MAX_PAGE_SIZE"));
        }
        if !self.public_base_url.starts_with("http://") && !self.public_base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "PUBLIC_BASE_URL must start with http:// or https://"
            ));
        }
        Ok(())
    }

    /// Short code policy derived from the configured lengths
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for inconsistent lengths or a zero attempt budget
    pub fn short_code_policy(&self) -> crate::errors::AppResult<ShortCodePolicy> {
        ShortCodePolicy::new(
            self.short_codes.length,
            self.short_codes.max_length,
            self.short_codes.attempts_per_length,
        )
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Larder Server Configuration:\n\
             - HTTP Port: {}\n\
             - Database: {}\n\
             - Public URL: {}\n\
             - Short Codes: {}..={} digits, {} attempts per length\n\
             - Page Size: {} (max {})\n\
             - CORS Origins: {}",
            self.http_port,
            if self.database_url.contains(":memory:") {
                "SQLite (in-memory)"
            } else {
                "SQLite"
            },
            self.public_base_url,
            self.short_codes.length,
            self.short_codes.max_length,
            self.short_codes.attempts_per_length,
            self.pagination.page_size,
            self.pagination.max_page_size,
            self.cors_origins.join(", "),
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse comma-separated origins
fn parse_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}
