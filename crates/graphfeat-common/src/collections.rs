//! Standard collection type aliases for graphfeat.
//!
//! Use these instead of a direct HashMap so hashing stays consistent across
//! the workspace.
//!
//! # Example
//!
//! ```rust
//! use graphfeat_common::collections::{FeatMap, feat_map};
//!
//! let mut map: FeatMap<String, i32> = feat_map();
//! map.insert("key".to_string(), 42);
//! ```

use rustc_hash::FxBuildHasher;

/// HashMap with FxHash (fast, non-cryptographic).
///
/// FxHash is well suited to the small integer and string keys used for
/// vertex IDs and feature names.
pub type FeatMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

/// Create a new empty [`FeatMap`].
#[inline]
#[must_use]
pub fn feat_map<K, V>() -> FeatMap<K, V> {
    FeatMap::with_hasher(FxBuildHasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feat_map() {
        let mut map = feat_map::<String, i32>();
        map.insert("key".to_string(), 42);
        assert_eq!(map.get("key"), Some(&42));
    }
}
