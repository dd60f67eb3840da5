//! Error types for retry-with-recovery
//!
//! Each variant records which recovery transform was involved so callers can
//! report whether the original failure, the transform, or the retry is to blame.

use std::error::Error;
use std::fmt;

/// Errors returned by `retry_with_recovery`
#[derive(Debug)]
pub enum RecoveryError<E> {
    /// The first attempt failed and the transform had nothing to change
    /// (or the policy allows no retries); the original error is returned.
    NotRecoverable(E),

    /// The recovery transform itself failed
    RecoveryFailed {
        /// Name of the transform
        transform: String,
        /// The transform's error
        source: E,
    },

    /// The transform was applied but every retry still failed
    RetryFailed {
        /// Name of the transform
        transform: String,
        /// Total attempts, including the first
        attempts: u32,
        /// Message of the error that triggered the recovery
        first_error: String,
        /// Error from the final attempt
        source: E,
    },
}

impl<E: fmt::Display> fmt::Display for RecoveryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryError::NotRecoverable(source) => write!(f, "{}", source),
            RecoveryError::RecoveryFailed { transform, source } => {
                write!(f, "recovery '{}' failed: {}", transform, source)
            }
            RecoveryError::RetryFailed {
                transform,
                attempts,
                first_error,
                source,
            } => write!(
                f,
                "still failing after recovery '{}' ({} attempts): {} (first failure: {})",
                transform, attempts, source, first_error
            ),
        }
    }
}

impl<E: Error + 'static> Error for RecoveryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecoveryError::NotRecoverable(source) => Some(source),
            RecoveryError::RecoveryFailed { source, .. } => Some(source),
            RecoveryError::RetryFailed { source, .. } => Some(source),
        }
    }
}
