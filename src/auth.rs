// ABOUTME: API token authentication for incoming requests
// ABOUTME: Tokens are random hex keys; only their SHA-256 digest is stored with the user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! # Authentication
//!
//! Requests carry `Authorization: Token <key>` (or `Bearer <key>`). The key
//! is hashed and matched against the digest stored at user creation. Read
//! endpoints accept anonymous callers; writes require a resolved user.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::constants::auth::{BEARER_SCHEME, TOKEN_BYTES, TOKEN_SCHEME};
use crate::database::UsersManager;
use crate::errors::{AppError, AppResult};
use crate::models::User;

/// A freshly issued API token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Plain key handed to the user exactly once
    pub token: String,
    /// SHA-256 hex digest persisted with the user
    pub token_hash: String,
}

/// Generate a random API token and its digest
#[must_use]
pub fn issue_token() -> IssuedToken {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let token_hash = hash_token(&token);
    IssuedToken { token, token_hash }
}

/// Hash an API token for storage and comparison
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolves request credentials to users
#[derive(Clone)]
pub struct AuthManager {
    users: UsersManager,
}

impl AuthManager {
    /// Create an auth manager backed by the user table
    #[must_use]
    pub const fn new(users: UsersManager) -> Self {
        Self { users }
    }

    /// Identify the caller, if any credentials were sent
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` for a malformed header or an unknown token
    pub async fn authenticate(&self, headers: &HeaderMap) -> AppResult<Option<User>> {
        let Some(token) = extract_token(headers)? else {
            return Ok(None);
        };
        let user = self
            .users
            .get_by_token_hash(&hash_token(token))
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid token"))?;
        debug!(user_id = %user.id, "Authenticated request");
        Ok(Some(user))
    }

    /// Identify the caller, failing when no credentials were sent
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` without credentials, `AuthInvalid` for bad ones
    pub async fn require_user(&self, headers: &HeaderMap) -> AppResult<User> {
        self.authenticate(headers)
            .await?
            .ok_or_else(AppError::auth_required)
    }
}

/// Pull the key out of the `Authorization` header
fn extract_token(headers: &HeaderMap) -> AppResult<Option<&str>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid text"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AppError::auth_invalid("Authorization header must be '<scheme> <token>'"))?;
    if !scheme.eq_ignore_ascii_case(TOKEN_SCHEME) && !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AppError::auth_invalid(format!(
            "Unsupported authorization scheme '{scheme}'"
        )));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::auth_invalid("Empty token"));
    }
    Ok(Some(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_issued_token_matches_hash() {
        let issued = issue_token();
        assert_eq!(issued.token.len(), TOKEN_BYTES * 2);
        assert_eq!(hash_token(&issued.token), issued.token_hash);
        assert_ne!(issued.token, issued.token_hash);
    }

    #[test]
    fn test_extract_token_schemes() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_token(&headers).unwrap(), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc123"));
        assert_eq!(extract_token(&headers).unwrap(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_token(&headers).unwrap(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert!(extract_token(&headers).is_err());
    }
}
