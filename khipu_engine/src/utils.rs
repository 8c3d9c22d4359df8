/*! Utility methods and data structures.*/

pub mod errors;
pub mod diagnostics;

/// A [`HashMap`](std::collections::HashMap) with [`rustc_hash::FxBuildHasher`] as hasher.
pub type HMap<A,B> = rustc_hash::FxHashMap<A,B>;
/// A [`HashSet`](std::collections::HashSet) with [`rustc_hash::FxBuildHasher`] as hasher.
pub type HSet<A> = rustc_hash::FxHashSet<A>;
