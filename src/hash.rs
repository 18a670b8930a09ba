//! Hash map used for mint lookups.
//!
//! Exactly one hasher feature selects a fast map; any other combination (including none)
//! falls back to the std `HashMap`.

#[cfg(all(feature = "rustc-hash", not(feature = "ahash"), not(feature = "std-hash")))]
pub type FastMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(all(feature = "ahash", not(feature = "rustc-hash"), not(feature = "std-hash")))]
pub type FastMap<K, V> = ahash::AHashMap<K, V>;

#[cfg(not(any(
    all(feature = "rustc-hash", not(feature = "ahash"), not(feature = "std-hash")),
    all(feature = "ahash", not(feature = "rustc-hash"), not(feature = "std-hash")),
)))]
pub type FastMap<K, V> = std::collections::HashMap<K, V>;
