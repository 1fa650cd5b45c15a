//! Exact Match Union Patterns

use crate::regex::regex_wrapper::RegexWrapperPattern;

/// Create a union pattern of exact matches.
///
/// This will always be a [`RegexWrapperPattern::Basic`] variant.
///
/// Alternatives are ordered longest first, so that when one alternative
/// is a prefix of another, the longer one wins at a shared start position.
///
/// ## Arguments
/// * `alts` - A slice of string-like alternatives to union.
///
/// ## Returns
/// A new `RegexWrapperPattern::Basic` containing the union pattern.
pub fn exact_match_union_regex_pattern<S: AsRef<str>>(alts: &[S]) -> RegexWrapperPattern {
    let mut alts: Vec<&str> = alts.iter().map(|s| s.as_ref()).collect();
    // Stable; equal length alternatives keep their order.
    alts.sort_by_key(|s| core::cmp::Reverse(s.len()));

    let parts = alts.iter().map(|s| regex::escape(s)).collect::<Vec<_>>();
    RegexWrapperPattern::Basic(format!("({})", parts.join("|")))
}
