//! Fast hash map and hash set type aliases.
//!
//! Property names, type names, and instance ids are all small keys hashed
//! on every property access, so the workspace uses the Fx hash from
//! `rustc-hash` instead of SipHash. None of these tables are exposed to
//! untrusted input.

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// The hasher used by [`FxHashMap`] and [`FxHashSet`].
pub type FxBuildHasher = rustc_hash::FxBuildHasher;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_map_lookup() {
        let mut map: FxHashMap<String, u64> = FxHashMap::default();
        map.insert("line_color".to_owned(), 1);
        assert_eq!(map.get("line_color"), Some(&1));
    }

    #[test]
    fn test_fx_hash_set_dedup() {
        let mut set: FxHashSet<&str> = FxHashSet::default();
        assert!(set.insert("Range"));
        assert!(!set.insert("Range"));
        assert_eq!(set.len(), 1);
    }
}
