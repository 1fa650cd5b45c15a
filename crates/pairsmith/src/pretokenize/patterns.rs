//! # Patterns

use crate::regex::ConstRegexWrapperPattern;

/// A macro to concatenate multiple string literals with a specified separator.
///
/// # Examples
///
/// ```rust
/// use pairsmith::join_strs;
///
/// let result = join_strs!(",", ("Hello", "World", "Rust"));
/// assert_eq!(result, "Hello,World,Rust");
///
/// let result = join_strs!(";", ("OnlyOne"));
/// assert_eq!(result, "OnlyOne");
/// ```
#[macro_export]
macro_rules! join_strs {
    ($sep:literal, ($first:literal $(, $rest:literal)* $(,)?)) => {
        concat!($first $(, $sep, $rest)*)
    };
}

/// An extension of [`join_strs!()`] which uses the "|" as the separator.
#[macro_export]
macro_rules! join_patterns {
    ($($e:expr),* $(,)?) => { $crate::join_strs!("|", ($($e),*)) };
}

/// The GPT-2 pre-tokenization grammar.
///
/// Branches are tried in order, at each position:
///
/// | Branch                 | Matches                                   |
/// |------------------------|-------------------------------------------|
/// | `'s` .. `'d`           | contraction suffixes                      |
/// | ` ?\p{L}+`             | optional space, then letters              |
/// | ` ?\p{N}+`             | optional space, then digits               |
/// | ` ?[^\s\p{L}\p{N}]+`   | optional space, then other symbols        |
/// | `\s+(?!\S)`            | whitespace not followed by non-whitespace |
/// | `\s+`                  | any remaining whitespace run              |
pub const GPT2_PRETOKENIZE_PATTERN: ConstRegexWrapperPattern =
    ConstRegexWrapperPattern::Fancy(join_patterns!(
        r"'s",
        r"'d",
        r"'m",
        r"'t",
        r"'ll",
        r"'ve",
        r"'re",
        r" ?\p{L}+",
        r" ?\p{N}+",
        r" ?[^\s\p{L}\p{N}]+",
        r"\s+(?!\S)",
        r"\s+",
    ));
