// ABOUTME: HTTP middleware for the Larder router
// ABOUTME: Request id assignment with a per-request tracing span, plus CORS setup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

/// CORS configuration
pub mod cors;
/// Request id and request span middleware
pub mod request_id;

pub use cors::setup_cors;
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
