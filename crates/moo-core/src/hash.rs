//! Fast hash map and hash set type aliases.
//!
//! Registry stores, model catalogs, and the resolver's pending-parameter set
//! are keyed by short strings and never exposed to untrusted input, so the
//! Fx hash from `rustc-hash` is used instead of `SipHash`.

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new [`FxHashMap`] able to hold `capacity` entries without
/// reallocating.
///
/// # Examples
///
/// ```
/// use moo_core::fx_hash_map_with_capacity;
///
/// let map: moo_core::FxHashMap<String, u32> = fx_hash_map_with_capacity(8);
/// assert!(map.capacity() >= 8);
/// ```
#[inline]
#[must_use]
pub fn fx_hash_map_with_capacity<K, V>(capacity: usize) -> FxHashMap<K, V> {
    FxHashMap::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

/// Creates a new [`FxHashSet`] able to hold `capacity` entries without
/// reallocating.
#[inline]
#[must_use]
pub fn fx_hash_set_with_capacity<V>(capacity: usize) -> FxHashSet<V> {
    FxHashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_set_with_capacity() {
        let mut set: FxHashSet<&str> = fx_hash_set_with_capacity(4);
        assert!(set.capacity() >= 4);
        assert!(set.insert("milk"));
        assert!(!set.insert("milk"));
    }
}
