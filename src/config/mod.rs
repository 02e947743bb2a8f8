// ABOUTME: Configuration management module for server settings
// ABOUTME: Loads the environment-driven ServerConfig used by the binaries and router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Configuration module for the Larder server
//!
//! - **Environment**: server configuration from environment variables

/// Environment and server configuration
pub mod environment;

pub use environment::ServerConfig;
