//! Error types for the expirekit library.
//!
//! ## Key Components
//!
//! - [`UnsupportedError`]: Returned by the deliberately disabled bulk-view
//!   accessors on [`ExpiringMap`](crate::map::ExpiringMap). Those accessors
//!   would either leak the internal `(value, timestamp)` representation or
//!   hand out entries without the per-key expiration check, so they fail
//!   loudly instead of silently misbehaving.
//!
//! Lookups that miss (absent or expired keys) are *not* errors anywhere in
//! this crate; they surface as `Option`/default-fallback returns.
//!
//! ## Example Usage
//!
//! ```
//! use expirekit::map::ExpiringMap;
//!
//! let map: ExpiringMap<u64, String> = ExpiringMap::new();
//! let err = map.view_values().unwrap_err();
//! assert!(err.message().contains("not supported"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// UnsupportedError
// ---------------------------------------------------------------------------

/// Error returned when a deliberately disabled operation is invoked.
///
/// Produced by the view-style accessors on
/// [`ExpiringMap`](crate::map::ExpiringMap). Carries a human-readable
/// description of why the operation is unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedError(String);

impl UnsupportedError {
    /// Creates a new `UnsupportedError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnsupportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for UnsupportedError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
