//! Retry-with-recovery
//!
//! Some failures can be fixed by rewriting local state and trying once more
//! (for example, migrating a legacy manifest after a dependency install fails).
//! This module makes that pattern explicit: a `RecoveryPolicy` caps the number
//! of retries, a named transform runs before each retry, and a retry that still
//! fails surfaces as its own error variant.
//!
//! # Example
//!
//! ```rust,no_run
//! use vsxpub_core::retry::{retry_with_recovery, RecoveryError, RecoveryPolicy};
//!
//! async fn example() -> Result<(), RecoveryError<std::io::Error>> {
//!     retry_with_recovery(
//!         &RecoveryPolicy::default(),
//!         "clear-cache",
//!         || async { Ok(()) },
//!         || async { Ok(true) },
//!     )
//!     .await
//! }
//! ```

mod error;
mod executor;

pub use error::RecoveryError;
pub use executor::{retry_with_recovery, RecoveryPolicy};
