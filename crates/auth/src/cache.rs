//! Permission cache port.
//!
//! A subject-keyed snapshot of the permission set last seen in that subject's
//! claims. It backs identity endpoints only; [`crate::authorize`] never reads
//! it. Entries expire after a fixed TTL and are invalidated explicitly on
//! logout and on permission change.

use std::time::Duration;

use thiserror::Error;

use crate::{PermissionSet, SubjectId};

/// TTL applied when configuration does not override it.
pub const DEFAULT_PERMISSION_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("permission cache unavailable: {0}")]
    Unavailable(String),

    #[error("permission cache entry is corrupt: {0}")]
    Corrupt(String),
}

/// Calls are synchronous and may block on network I/O; async callers run
/// them off the runtime's worker threads.
pub trait PermissionCache: Send + Sync {
    /// Cached set for `subject`, or `None` when absent or expired.
    fn get(&self, subject: &SubjectId) -> Result<Option<PermissionSet>, CacheError>;

    /// Store `permissions` for `subject` for one TTL.
    fn put(&self, subject: &SubjectId, permissions: &PermissionSet) -> Result<(), CacheError>;

    /// Drop the entry for `subject` (no-op when absent).
    fn invalidate(&self, subject: &SubjectId) -> Result<(), CacheError>;

    fn ttl(&self) -> Duration;
}

/// Cache key for a subject.
pub fn cache_key(subject: &SubjectId) -> String {
    format!("user_permissions_{subject}")
}
