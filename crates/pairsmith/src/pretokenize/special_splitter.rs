//! # Special Token Splitter

use crate::{
    PSResult,
    regex::{RegexWrapper, exact_match_union_regex_pattern},
};

/// Splits text into documents on special-token occurrences.
///
/// The special tokens themselves are discarded; they never become part of a
/// pre-token.
#[derive(Debug, Clone, Default)]
pub struct SpecialSplitter {
    special_re: Option<RegexWrapper>,
}

impl SpecialSplitter {
    /// Build a splitter for a set of special tokens.
    ///
    /// An empty set yields a splitter which never splits.
    /// Empty strings are ignored.
    pub fn new<S: AsRef<str>>(special_tokens: &[S]) -> PSResult<Self> {
        let specials: Vec<&str> = special_tokens
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| !s.is_empty())
            .collect();

        let special_re = if specials.is_empty() {
            None
        } else {
            Some(exact_match_union_regex_pattern(&specials).compile()?)
        };

        Ok(Self { special_re })
    }

    /// Does this splitter match any special tokens?
    pub fn is_empty(&self) -> bool {
        self.special_re.is_none()
    }

    /// Visit each non-empty document fragment between special tokens.
    pub fn for_each_fragment<F>(
        &self,
        text: &str,
        mut f: F,
    ) -> PSResult<()>
    where
        F: FnMut(&str) -> PSResult<()>,
    {
        let Some(special_re) = &self.special_re else {
            if !text.is_empty() {
                f(text)?;
            }
            return Ok(());
        };

        let mut last = 0;
        let mut result = Ok(());
        special_re.for_each_match(text, |range| {
            if result.is_ok() && range.start > last {
                result = f(&text[last..range.start]);
            }
            last = range.end;
        })?;
        result?;

        if last < text.len() {
            f(&text[last..])?;
        }
        Ok(())
    }

    /// Collect the document fragments of `text`.
    pub fn fragments<'a>(
        &self,
        text: &'a str,
    ) -> PSResult<Vec<&'a str>> {
        let mut fragments = Vec::new();
        let base = text.as_ptr() as usize;
        self.for_each_fragment(text, |fragment| {
            let start = fragment.as_ptr() as usize - base;
            fragments.push(&text[start..start + fragment.len()]);
            Ok(())
        })?;
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_specials() {
        let splitter = SpecialSplitter::new::<&str>(&[]).unwrap();
        assert!(splitter.is_empty());

        assert_eq!(splitter.fragments("a<|x|>b").unwrap(), vec!["a<|x|>b"]);
        assert!(splitter.fragments("").unwrap().is_empty());
    }

    #[test]
    fn test_split_on_specials() {
        let splitter = SpecialSplitter::new(&["<|endoftext|>", "<|pad|>"]).unwrap();
        assert!(!splitter.is_empty());

        assert_eq!(
            splitter
                .fragments("one<|endoftext|>two<|pad|><|pad|>three<|endoftext|>")
                .unwrap(),
            vec!["one", "two", "three"]
        );

        assert!(splitter.fragments("<|pad|>").unwrap().is_empty());
    }

    #[test]
    fn test_overlapping_specials() {
        let splitter = SpecialSplitter::new(&["<|a|>", "<|a|><|a|>", "|"]).unwrap();
        assert_eq!(
            splitter.fragments("x<|a|><|a|>y|z").unwrap(),
            vec!["x", "y", "z"]
        );
    }

    #[test]
    fn test_fragment_error_stops() {
        let splitter = SpecialSplitter::new(&["#"]).unwrap();
        let mut seen = vec![];
        let result = splitter.for_each_fragment("a#b#c", |fragment| {
            seen.push(fragment.to_string());
            Err(crate::PairsmithError::InvalidSpecialToken(
                fragment.to_string(),
            ))
        });
        assert!(result.is_err());
        assert_eq!(seen, vec!["a"]);
    }
}
