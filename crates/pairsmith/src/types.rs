//! # Common Types and Traits
use core::{
    fmt::{Debug, Display},
    hash::Hash,
};

use num_traits::{FromPrimitive, PrimInt, ToPrimitive, Unsigned};

/// A type that can be used as a symbol id in a trained vocabulary.
///
/// These are constrained to be unsigned primitive integers;
/// such that the max token in a vocabulary is less than `T::max()`.
pub trait TokenType:
    'static
    + PrimInt
    + FromPrimitive
    + ToPrimitive
    + Unsigned
    + Hash
    + Default
    + Debug
    + Display
    + Send
    + Sync
{
}

impl<T> TokenType for T where
    T: 'static
        + PrimInt
        + FromPrimitive
        + ToPrimitive
        + Unsigned
        + Hash
        + Default
        + Debug
        + Display
        + Send
        + Sync
{
}

/// A pair of adjacent tokens.
pub type Pair<T> = (T, T);

cfg_if::cfg_if! {
    if #[cfg(feature = "ahash")] {
        /// Type Alias for hash maps in this crate.
        pub type CommonHashMap<K, V> = ahash::AHashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type CommonHashSet<V> = ahash::AHashSet<V>;
    } else {
        /// Type Alias for hash maps in this crate.
        pub type CommonHashMap<K, V> = std::collections::HashMap<K, V>;

        /// Type Alias for hash sets in this crate.
        pub type CommonHashSet<V> = std::collections::HashSet<V>;
    }
}
