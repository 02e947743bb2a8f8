// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Defaults, overrides, validation failures and derived short code policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use larder_server::config::ServerConfig;
use serial_test::serial;

const VARS: [&str; 9] = [
    "HTTP_PORT",
    "DATABASE_URL",
    "PUBLIC_BASE_URL",
    "SHORT_CODE_LENGTH",
    "SHORT_CODE_MAX_LENGTH",
    "SHORT_CODE_ATTEMPTS",
    "PAGE_SIZE",
    "MAX_PAGE_SIZE",
    "CORS_ORIGINS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 8081);
    assert_eq!(config.database_url, "sqlite:./data/larder.db");
    assert_eq!(config.public_base_url, "http://localhost:8081");
    assert_eq!(config.short_codes.length, 6);
    assert_eq!(config.short_codes.max_length, 10);
    assert_eq!(config.short_codes.attempts_per_length, 8);
    assert_eq!(config.pagination.page_size, 6);
    assert_eq!(config.cors_origins, vec!["*".to_owned()]);
}

#[test]
#[serial]
fn test_overrides_are_applied() {
    clear_env();
    env::set_var("HTTP_PORT", "9000");
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("PUBLIC_BASE_URL", "https://larder.example.com/");
    env::set_var("SHORT_CODE_LENGTH", "4");
    env::set_var("SHORT_CODE_MAX_LENGTH", "5");
    env::set_var("CORS_ORIGINS", "https://a.example.com, https://b.example.com/");

    let config = ServerConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.http_port, 9000);
    assert_eq!(config.public_base_url, "https://larder.example.com");
    let policy = config.short_code_policy().unwrap();
    assert_eq!(policy.initial_length(), 4);
    assert_eq!(policy.max_length(), 5);
    assert_eq!(
        config.cors_origins,
        vec!["https://a.example.com".to_owned(), "https://b.example.com".to_owned()]
    );
    assert!(config.summary().contains("SQLite (in-memory)"));
}

#[test]
#[serial]
fn test_inconsistent_values_are_rejected() {
    clear_env();
    env::set_var("SHORT_CODE_LENGTH", "8");
    env::set_var("SHORT_CODE_MAX_LENGTH", "6");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("PAGE_SIZE", "500");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
    env::set_var("HTTP_PORT", "not-a-port");
    assert!(ServerConfig::from_env().is_err());

    clear_env();
}
