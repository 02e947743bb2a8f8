// ABOUTME: Short code generation with collision retry and length widening
// ABOUTME: Codes are claimed atomically by the store; a lost race just draws again
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! # Short Codes
//!
//! Every recipe gets a compact decimal code, assigned once at creation and
//! never changed. Codes are drawn at random from a fixed-width space. When a
//! draw collides with an existing code a new one is drawn; after
//! `attempts_per_length` collisions at one width the generator moves to the
//! next wider width, up to `max_length`. Running past the widest width is an
//! explicit `ShortCodeSpaceExhausted` error, never an endless loop.
//!
//! The collision check and the insert are a single atomic step owned by the
//! store (a unique index for `SQLite`, an entry claim for the in-memory
//! store). The generator only decides which candidate to try next.

use std::future::Future;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, error, info};

use crate::constants::short_codes::{
    DEFAULT_ATTEMPTS_PER_LENGTH, DEFAULT_LENGTH, DEFAULT_MAX_LENGTH, MAX_SUPPORTED_LENGTH,
};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{Recipe, ShortCode};
use crate::stores::RecipeStore;

/// Result of trying to persist a record under a candidate code
#[derive(Debug)]
pub enum CodeCommit<T> {
    /// The record was stored under the candidate code
    Committed(T),
    /// Another record already owns the candidate code; nothing was stored
    CodeTaken,
}

/// Widths and attempt budget for code generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortCodePolicy {
    initial_length: usize,
    max_length: usize,
    attempts_per_length: u32,
}

impl ShortCodePolicy {
    /// Build a policy, rejecting widths outside `1..=18` or a zero attempt budget
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` when the bounds are inconsistent
    pub fn new(initial_length: usize, max_length: usize, attempts_per_length: u32) -> AppResult<Self> {
        if initial_length == 0 || initial_length > max_length || max_length > MAX_SUPPORTED_LENGTH {
            return Err(AppError::new(
                ErrorCode::ConfigInvalid,
                format!(
                    "short code lengths must satisfy 1 <= initial ({initial_length}) <= max ({max_length}) <= {MAX_SUPPORTED_LENGTH}"
                ),
            ));
        }
        if attempts_per_length == 0 {
            return Err(AppError::new(
                ErrorCode::ConfigInvalid,
                "short code attempts per length must be at least 1",
            ));
        }
        Ok(Self {
            initial_length,
            max_length,
            attempts_per_length,
        })
    }

    /// Width of the first candidates
    #[must_use]
    pub const fn initial_length(&self) -> usize {
        self.initial_length
    }

    /// Widest width ever tried
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Collisions tolerated at one width before widening
    #[must_use]
    pub const fn attempts_per_length(&self) -> u32 {
        self.attempts_per_length
    }

    /// Candidate widths in the order they are tried, one entry per attempt
    fn schedule(&self) -> impl Iterator<Item = usize> + '_ {
        (self.initial_length..=self.max_length)
            .flat_map(move |length| (0..self.attempts_per_length).map(move |_| length))
    }
}

impl Default for ShortCodePolicy {
    fn default() -> Self {
        Self {
            initial_length: DEFAULT_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            attempts_per_length: DEFAULT_ATTEMPTS_PER_LENGTH,
        }
    }
}

/// Source of raw candidate values
pub trait CodeSource: Send + Sync {
    /// Uniform value in `0..upper`
    fn next_value(&self, upper: u64) -> u64;
}

/// Thread-local RNG backed source used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeSource;

impl CodeSource for RandomCodeSource {
    fn next_value(&self, upper: u64) -> u64 {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Draws short codes according to a policy
#[derive(Clone)]
pub struct ShortCodeGenerator {
    policy: ShortCodePolicy,
    source: Arc<dyn CodeSource>,
}

impl std::fmt::Debug for ShortCodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortCodeGenerator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for ShortCodeGenerator {
    fn default() -> Self {
        Self::new(ShortCodePolicy::default())
    }
}

impl ShortCodeGenerator {
    /// Generator backed by the thread-local RNG
    #[must_use]
    pub fn new(policy: ShortCodePolicy) -> Self {
        Self::with_source(policy, Arc::new(RandomCodeSource))
    }

    /// Generator with a custom value source
    #[must_use]
    pub fn with_source(policy: ShortCodePolicy, source: Arc<dyn CodeSource>) -> Self {
        Self { policy, source }
    }

    /// Active policy
    #[must_use]
    pub const fn policy(&self) -> &ShortCodePolicy {
        &self.policy
    }

    fn draw(&self, length: usize) -> AppResult<ShortCode> {
        let upper = 10_u64.pow(length as u32);
        ShortCode::from_number(self.source.next_value(upper) % upper, length)
            .ok_or_else(|| AppError::internal(format!("cannot render a {length}-digit code")))
    }

    /// Find a code not currently used by any recipe in `store`
    ///
    /// The answer is only a snapshot: a concurrent writer may claim the same
    /// code before it is used. Recipe creation therefore goes through
    /// [`ShortCodeGenerator::assign`], which claims and checks in one step.
    ///
    /// # Errors
    ///
    /// Returns `ShortCodeSpaceExhausted` when every attempt collides, or a
    /// storage error from the lookup
    pub async fn generate_unique_code(&self, store: &dyn RecipeStore) -> AppResult<ShortCode> {
        self.assign(|code| async move {
            if store.get_recipe_by_code(&code).await?.is_some() {
                Ok(CodeCommit::CodeTaken)
            } else {
                Ok(CodeCommit::Committed(code))
            }
        })
        .await
    }

    /// Draw candidates and hand each to `commit` until one is stored
    ///
    /// `commit` must check and claim the code atomically, returning
    /// `CodeTaken` when the code already belongs to another record.
    ///
    /// # Errors
    ///
    /// Returns `ShortCodeSpaceExhausted` after the final attempt at
    /// `max_length` collides; errors from `commit` are returned unchanged
    pub async fn assign<T, F, Fut>(&self, mut commit: F) -> AppResult<T>
    where
        F: FnMut(ShortCode) -> Fut,
        Fut: Future<Output = AppResult<CodeCommit<T>>>,
    {
        let mut current_length = self.policy.initial_length;
        let mut attempts = 0_u32;

        for length in self.policy.schedule() {
            if length != current_length {
                info!(
                    from_length = current_length,
                    to_length = length,
                    "Short code space crowded, widening codes"
                );
                current_length = length;
            }
            attempts += 1;

            let code = self.draw(length)?;
            match commit(code.clone()).await? {
                CodeCommit::Committed(value) => {
                    debug!(short_code = %code, attempts = attempts, "Short code assigned");
                    return Ok(value);
                }
                CodeCommit::CodeTaken => {
                    debug!(short_code = %code, attempt = attempts, "Short code collision, redrawing");
                }
            }
        }

        error!(
            initial_length = self.policy.initial_length,
            max_length = self.policy.max_length,
            attempts = attempts,
            "Short code space exhausted"
        );
        Err(AppError::new(
            ErrorCode::ShortCodeSpaceExhausted,
            format!(
                "no free short code after {attempts} attempts up to {} digits",
                self.policy.max_length
            ),
        ))
    }
}

/// Look up the recipe a client-supplied code refers to
///
/// # Errors
///
/// Returns `ResourceNotFound` for malformed or unknown codes
pub async fn resolve(store: &dyn RecipeStore, raw: &str) -> AppResult<Recipe> {
    let code = ShortCode::parse(raw)
        .ok_or_else(|| AppError::not_found(format!("Short link {raw}")))?;
    store
        .get_recipe_by_code(&code)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Short link {raw}")))
}
