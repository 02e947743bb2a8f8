// ABOUTME: User model and registration request validation
// ABOUTME: Usernames follow the [\w.@+-] alphabet and may not shadow the `me` route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

use crate::constants::limits::{EMAIL_MAX, PERSON_NAME_MAX, USERNAME_MAX};
use crate::errors::{AppError, AppResult};
use crate::models::recipe::validate_image;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Unique login name
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Avatar as a base64 data URL
    pub avatar: Option<String>,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// Request to register a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Unique login name
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl NewUser {
    /// Validate all registration fields
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first offending field
    pub fn validate(&self) -> AppResult<()> {
        let username_ok = !self.username.is_empty()
            && self.username.chars().count() <= USERNAME_MAX
            && self
                .username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'));
        if !username_ok {
            return Err(AppError::invalid_input(
                "username may only contain letters, digits and . @ + - _",
            ));
        }
        if self.username == "me" {
            return Err(AppError::invalid_input("username 'me' is reserved"));
        }

        let email_ok = self.email.len() <= EMAIL_MAX
            && self
                .email
                .split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !email_ok {
            return Err(AppError::invalid_input("email is not a valid address"));
        }

        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.trim().is_empty() || value.chars().count() > PERSON_NAME_MAX {
                return Err(AppError::invalid_input(format!(
                    "{field} must be 1..={PERSON_NAME_MAX} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Request body for `PUT /api/users/me/avatar`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarUpdate {
    /// Avatar as a base64 data URL
    pub avatar: String,
}

impl AvatarUpdate {
    /// Validate the avatar payload
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless the avatar is a base64 `data:image` URL
    pub fn validate(&self) -> AppResult<()> {
        validate_image(&self.avatar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_owned(),
            email: email.to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Byron".to_owned(),
        }
    }

    #[test]
    fn test_username_alphabet() {
        assert!(new_user("ada.b+1@home", "ada@example.com").validate().is_ok());
        assert!(new_user("ada b", "ada@example.com").validate().is_err());
        assert!(new_user("me", "ada@example.com").validate().is_err());
    }

    #[test]
    fn test_avatar_must_be_a_data_url() {
        let avatar = AvatarUpdate {
            avatar: "data:image/png;base64,iVBORw0KGgo=".to_owned(),
        };
        assert!(avatar.validate().is_ok());

        let avatar = AvatarUpdate {
            avatar: "https://example.com/me.png".to_owned(),
        };
        assert!(avatar.validate().is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(new_user("ada", "ada-example.com").validate().is_err());
        assert!(new_user("ada", "@example.com").validate().is_err());
    }
}
