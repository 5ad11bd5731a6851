//! Instance identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_ID: AtomicU64 = AtomicU64::new(1000);

/// A process-unique identifier for a model instance.
///
/// Allocated from a monotonic counter, so ids are never reused during the
/// lifetime of the process. On the wire an id is its decimal string.
///
/// # Examples
///
/// ```
/// use mg_core::ModelId;
///
/// let a = ModelId::next();
/// let b = ModelId::next();
/// assert_ne!(a, b);
/// assert!(b > a);
/// assert_eq!(a.to_string(), a.as_u64().to_string());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(u64);

impl ModelId {
    /// Allocates a fresh id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the inner u64 value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<ModelId> for u64 {
    #[inline]
    fn from(id: ModelId) -> Self {
        id.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let ids: Vec<_> = (0..16).map(|_| ModelId::next()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_id_conversion() {
        let id = ModelId::next();
        assert_eq!(u64::from(id), id.as_u64());
    }
}
