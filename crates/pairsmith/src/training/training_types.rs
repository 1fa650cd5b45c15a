//! # Training Types
use core::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::{AddAssign, SubAssign},
};

use num_traits::{FromPrimitive, PrimInt, ToPrimitive};

/// A type that can be used as a string key.
pub trait StringChunkType:
    for<'a> From<&'a str> + AsRef<str> + Debug + Clone + Send + Sync + Eq + Hash + Ord
{
}

impl<T> StringChunkType for T where
    T: for<'a> From<&'a str> + AsRef<str> + Debug + Clone + Send + Sync + Eq + Hash + Ord
{
}

/// A type that can be used as a pre-token count.
pub trait CountType:
    'static
    + PrimInt
    + FromPrimitive
    + ToPrimitive
    + Hash
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + AddAssign
    + SubAssign
{
}

impl<T> CountType for T where
    T: 'static
        + PrimInt
        + FromPrimitive
        + ToPrimitive
        + Hash
        + Default
        + Debug
        + Display
        + Send
        + Sync
        + AddAssign
        + SubAssign
{
}
