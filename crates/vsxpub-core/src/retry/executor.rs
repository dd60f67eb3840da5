//! Bounded retry with a named recovery transform

use std::fmt;
use std::future::Future;

use tracing::{debug, info, warn};

use super::error::RecoveryError;

/// How many times an operation may be retried after recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryPolicy {
    /// Retries after the first attempt; each retry is preceded by the transform
    pub max_retries: u32,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self { max_retries: 1 }
    }
}

impl RecoveryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self { max_retries: 0 }
    }
}

/// Run `op`; on failure apply `recover` and try again, up to the policy's cap
///
/// `recover` returns `Ok(true)` when it changed something worth retrying and
/// `Ok(false)` when it had nothing to do, in which case the most recent error is
/// returned without another attempt.
pub async fn retry_with_recovery<T, E, Op, Fut, Rec, RecFut>(
    policy: &RecoveryPolicy,
    transform: &str,
    mut op: Op,
    mut recover: Rec,
) -> Result<T, RecoveryError<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    Rec: FnMut() -> RecFut,
    RecFut: Future<Output = Result<bool, E>>,
    E: fmt::Display,
{
    let first = match op().await {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if policy.max_retries == 0 {
        return Err(RecoveryError::NotRecoverable(first));
    }

    let first_error = first.to_string();
    let mut last = first;
    let mut attempts = 1;

    for _ in 0..policy.max_retries {
        warn!("Attempt {} failed: {}; applying '{}'", attempts, last, transform);

        match recover().await {
            Ok(true) => debug!("Recovery '{}' applied", transform),
            Ok(false) if attempts == 1 => {
                debug!("Recovery '{}' not applicable", transform);
                return Err(RecoveryError::NotRecoverable(last));
            }
            Ok(false) => break,
            Err(e) => {
                return Err(RecoveryError::RecoveryFailed {
                    transform: transform.to_string(),
                    source: e,
                })
            }
        }

        attempts += 1;
        match op().await {
            Ok(value) => {
                info!("Succeeded after recovery '{}'", transform);
                return Ok(value);
            }
            Err(e) => last = e,
        }
    }

    Err(RecoveryError::RetryFailed {
        transform: transform.to_string(),
        attempts,
        first_error,
        source: last,
    })
}
