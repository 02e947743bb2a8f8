// ABOUTME: Core types and constants for the Larder recipe sharing API
// ABOUTME: Foundation crate with error handling, domain models, pagination, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

#![deny(unsafe_code)]

//! # Larder Core
//!
//! Foundation crate providing shared types and constants for the Larder recipe
//! sharing API. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Application-wide constants organized by domain
//! - **pagination**: Page-number pagination envelope and link building
//! - **models**: Recipes, ingredients, tags, users and short codes

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants and configuration values organized by domain
pub mod constants;

/// Page-number pagination for list endpoints
pub mod pagination;

/// Core data models (Recipe, Ingredient, Tag, User, `ShortCode`)
pub mod models;
