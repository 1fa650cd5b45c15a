//! # Pre-Tokenizer Trait

use std::sync::Arc;

use crate::{
    PSResult,
    pretokenize::patterns::GPT2_PRETOKENIZE_PATTERN,
    regex::{RegexWrapper, RegexWrapperPattern},
};

/// Splits a document into pre-token spans.
///
/// Implementations must be pure: the same text always yields the same
/// spans, in the same order.
pub trait PreTokenizer: Send + Sync {
    /// Visit each pre-token of `text`, in order.
    ///
    /// ## Arguments
    /// * `text` - a single document fragment; contains no special tokens.
    /// * `f` - called with each pre-token substring.
    fn for_each_pretoken(
        &self,
        text: &str,
        f: &mut dyn FnMut(&str),
    ) -> PSResult<()>;

    /// Collect the pre-tokens of `text`.
    fn pretokens(
        &self,
        text: &str,
    ) -> PSResult<Vec<String>> {
        let mut pieces = Vec::new();
        self.for_each_pretoken(text, &mut |piece| pieces.push(piece.to_string()))?;
        Ok(pieces)
    }
}

impl<P: PreTokenizer + ?Sized> PreTokenizer for Arc<P> {
    fn for_each_pretoken(
        &self,
        text: &str,
        f: &mut dyn FnMut(&str),
    ) -> PSResult<()> {
        self.as_ref().for_each_pretoken(text, f)
    }
}

/// A [`PreTokenizer`] driven by a regex pattern's successive matches.
///
/// Text between matches is not part of any pre-token.
#[derive(Debug, Clone)]
pub struct RegexPreTokenizer {
    regex: RegexWrapper,
}

impl Default for RegexPreTokenizer {
    fn default() -> Self {
        Self::gpt2()
    }
}

impl RegexPreTokenizer {
    /// Wrap a compiled regex.
    pub fn new(regex: RegexWrapper) -> Self {
        Self { regex }
    }

    /// Compile a pattern into a new pre-tokenizer.
    pub fn from_pattern<P: Into<RegexWrapperPattern>>(pattern: P) -> PSResult<Self> {
        let pattern: RegexWrapperPattern = pattern.into();
        Ok(Self::new(pattern.compile()?))
    }

    /// The GPT-2 grammar; see [`GPT2_PRETOKENIZE_PATTERN`].
    pub fn gpt2() -> Self {
        Self::new(
            GPT2_PRETOKENIZE_PATTERN
                .compile()
                .expect("regex pattern compilation failed"),
        )
    }

    /// The underlying regex.
    pub fn regex(&self) -> &RegexWrapper {
        &self.regex
    }
}

impl PreTokenizer for RegexPreTokenizer {
    fn for_each_pretoken(
        &self,
        text: &str,
        f: &mut dyn FnMut(&str),
    ) -> PSResult<()> {
        self.regex
            .for_each_match(text, |range| f(&text[range]))
            .map_err(Into::into)
    }
}
