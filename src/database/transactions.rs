// ABOUTME: Transaction management with RAII guards and retry patterns for SQLite writes
// ABOUTME: Provides automatic rollback on drop and exponential backoff for locked databases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Larder Contributors

//! Transaction management with RAII guards and retry patterns
//!
//! - `TransactionGuard`: RAII wrapper ensuring automatic rollback if not committed
//! - `retry_transaction`: exponential backoff for "database is locked" / busy errors
//!
//! Constraint violations are never retried here. A short-code collision is not
//! an error at this layer at all: the recipe store reports it as a distinct
//! outcome so the code generator can draw a new code.

use std::future::Future;
use std::time::Duration;

use sqlx::{Sqlite, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult};

/// Default number of attempts for write transactions
pub const DEFAULT_WRITE_ATTEMPTS: u32 = 5;

/// Retry a transaction operation if it fails due to a locked or busy database
///
/// Backoff doubles from 10ms: 20ms, 40ms, 80ms, ...
///
/// # Errors
///
/// Returns the last error once `max_attempts` is reached, or the first
/// non-retryable error immediately.
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_attempts: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts >= max_attempts {
                    error!(
                        attempts = attempts,
                        max_attempts = max_attempts,
                        error = %e,
                        "Transaction failed after max attempts"
                    );
                    return Err(e);
                }

                if !is_retryable_error(&e) {
                    return Err(e);
                }

                let backoff_ms = 10 * (1_u64 << attempts);
                warn!(
                    attempt = attempts,
                    max_attempts = max_attempts,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "Transaction failed with retryable error, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Check if a database error is transient
fn is_retryable_error(error: &AppError) -> bool {
    let message = error.message.to_lowercase();

    if message.contains("unique constraint")
        || message.contains("foreign key constraint")
        || message.contains("check constraint")
        || message.contains("not null constraint")
    {
        return false;
    }

    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("busy")
        || message.contains("timed out")
        || message.contains("timeout")
}

/// RAII transaction guard; rolls back on drop unless committed
pub struct TransactionGuard<'c> {
    transaction: Option<Transaction<'c, Sqlite>>,
}

impl<'c> TransactionGuard<'c> {
    /// Wrap a transaction obtained from `pool.begin().await`
    #[must_use]
    pub const fn new(transaction: Transaction<'c, Sqlite>) -> Self {
        Self {
            transaction: Some(transaction),
        }
    }

    /// Commit the transaction and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already consumed or the commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        let tx = self
            .transaction
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed - cannot commit"))?;
        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Transaction commit failed: {e}")))?;
        debug!("TransactionGuard committed");
        Ok(())
    }

    /// Explicitly roll back and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already consumed or the rollback fails
    pub async fn rollback(mut self) -> AppResult<()> {
        let tx = self
            .transaction
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed - cannot rollback"))?;
        tx.rollback()
            .await
            .map_err(|e| AppError::database(format!("Transaction rollback failed: {e}")))?;
        debug!("TransactionGuard rolled back explicitly");
        Ok(())
    }

    /// Connection to execute queries on inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was used after commit/rollback
    pub fn executor(&mut self) -> AppResult<&mut sqlx::SqliteConnection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit/rollback")
        })
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            debug!("TransactionGuard dropped without commit - rolling back");
        }
    }
}
