//! # Token Span Buffer

use crate::types::{Pair, TokenType};

/// The byte-level token for `byte`; ids ``0..=255`` are the raw bytes.
pub fn byte_token<T: TokenType>(byte: u8) -> T {
    // Every unsigned primitive holds a u8.
    T::from_u8(byte).unwrap_or_default()
}

/// A mutable span of tokens (a pre-token or "word").
///
/// Iteratively rewritten during BPE vocabulary training.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenSpanBuf<T: TokenType> {
    tokens: Vec<T>,
}

impl<T: TokenType, S: AsRef<[T]>> From<S> for TokenSpanBuf<T> {
    fn from(tokens: S) -> Self {
        Self::from_tokens(tokens)
    }
}

impl<T: TokenType> TokenSpanBuf<T> {
    const DEC: i32 = -1;
    const INC: i32 = 1;

    /// Create a new span buffer from tokens.
    pub fn from_tokens<S>(tokens: S) -> Self
    where
        S: AsRef<[T]>,
    {
        Self {
            tokens: tokens.as_ref().to_vec(),
        }
    }

    /// Create a new span buf of byte-level tokens.
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Self {
        Self {
            tokens: bytes.as_ref().iter().map(|&b| byte_token(b)).collect(),
        }
    }

    /// Create a new span buf from the UTF-8 bytes of a string slice.
    pub fn from_string<S: AsRef<str>>(text: S) -> Self {
        Self::from_bytes(text.as_ref().as_bytes())
    }

    /// View the tokens as a slice.
    pub fn tokens(&self) -> &[T] {
        &self.tokens
    }

    /// Get the length of the span.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is this span empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get an iterator over [`Pair<T>`] windows of this span.
    pub fn pairs(&self) -> impl Iterator<Item = Pair<T>> + '_ {
        self.tokens.windows(2).map(|w| (w[0], w[1]))
    }

    /// Does this span contain `pair` as adjacent tokens?
    pub fn contains_pair(
        &self,
        pair: Pair<T>,
    ) -> bool {
        self.pairs().any(|p| p == pair)
    }

    /// Merge all non-overlapping occurrences of `pair -> replacement`.
    ///
    /// Occurrences are rewritten left to right.
    ///
    /// # Arguments
    /// * `pair` - the pair to merge.
    /// * `replacement` - the token to replace `pair` with.
    /// * `on_merge` - a callback function to invoke for each incremental pair delta.
    ///   The function is called with:
    ///   - `pair` - the adjacent pair which was created or destroyed.
    ///   - `delta` - the pair count delta: `+1` for an added pair, `-1` for a removed pair.
    pub fn merge_pair_cb<F>(
        &mut self,
        pair: Pair<T>,
        replacement: T,
        on_merge: &mut F,
    ) where
        F: FnMut(Pair<T>, i32),
    {
        let (a, b) = pair;
        let n = self.tokens.len();

        if n < 2 {
            // Single-token words have no pairs to merge.
            return;
        }

        let mut new_tokens: Vec<T> = Vec::with_capacity(n);

        let mut i = 0;
        while i < n {
            let current = self.tokens[i];

            if i + 1 < n && pair == (current, self.tokens[i + 1]) {
                // Remove Previous Pair?
                if let Some(&x) = new_tokens.last() {
                    on_merge((x, a), Self::DEC);
                    on_merge((x, replacement), Self::INC);
                }

                // Remove Current Pair.
                on_merge(pair, Self::DEC);

                // Remove Next Pair?
                if i + 2 < n {
                    let y = self.tokens[i + 2];
                    on_merge((b, y), Self::DEC);
                    on_merge((replacement, y), Self::INC);
                };

                new_tokens.push(replacement);

                // Skip 'a' and 'b'.
                i += 2;
            } else {
                new_tokens.push(current);
                i += 1;
            }
        }

        self.tokens = new_tokens;
    }

    /// Merge all non-overlapping occurrences of `pair -> replacement`.
    ///
    /// # Returns
    /// a delta list of pair count deltas for this span:
    /// * `(Pair, +1)` - for each instance of an added `Pair`.
    /// * `(Pair, -1)` - for each instance of a removed `Pair`.
    pub fn merge_pair(
        &mut self,
        pair: Pair<T>,
        replacement: T,
    ) -> Vec<(Pair<T>, i32)> {
        let mut deltas: Vec<(Pair<T>, i32)> = Vec::with_capacity(6);
        self.merge_pair_cb(pair, replacement, &mut |p, d| deltas.push((p, d)));
        deltas
    }
}
