//! # Trained Vocabulary

use std::collections::BTreeMap;

use crate::types::{Pair, TokenType};

/// The size of the u8 space.
pub const U8_SIZE: usize = u8::MAX as usize + 1;

/// A learned merge: ``pair -> token``.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeRule<T: TokenType> {
    /// The adjacent pair which was merged.
    pub pair: Pair<T>,

    /// The token the pair was merged into.
    pub token: T,
}

/// A trained byte-pair vocabulary.
///
/// Token ids are dense:
/// * ``0..256`` - the raw bytes, ``id == byte``.
/// * ``256..256 + specials`` - the special tokens, in the order given.
/// * the learned merges, in the order they were learned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BpeVocab<T: TokenType> {
    token_bytes: Vec<Vec<u8>>,
    num_special_tokens: usize,
    merges: Vec<MergeRule<T>>,
}

impl<T: TokenType> BpeVocab<T> {
    /// The seed vocabulary: the 256 bytes, followed by the special tokens.
    pub fn seed<S: AsRef<str>>(special_tokens: &[S]) -> Self {
        let mut token_bytes: Vec<Vec<u8>> = (0..=u8::MAX).map(|b| vec![b]).collect();
        token_bytes.extend(special_tokens.iter().map(|s| s.as_ref().as_bytes().to_vec()));

        Self {
            token_bytes,
            num_special_tokens: special_tokens.len(),
            merges: Vec::new(),
        }
    }

    /// The number of tokens in the vocabulary.
    pub fn len(&self) -> usize {
        self.token_bytes.len()
    }

    /// Is the vocabulary empty?
    ///
    /// Never true; the seed contains the 256 byte tokens.
    pub fn is_empty(&self) -> bool {
        self.token_bytes.is_empty()
    }

    /// The size of the seed vocabulary.
    pub fn seed_len(&self) -> usize {
        U8_SIZE + self.num_special_tokens
    }

    /// The next token id to be assigned.
    pub fn next_token(&self) -> Option<T> {
        T::from_usize(self.token_bytes.len())
    }

    /// Look up the bytes of a token.
    pub fn get(
        &self,
        token: T,
    ) -> Option<&[u8]> {
        self.token_bytes
            .get(token.to_usize()?)
            .map(|bytes| bytes.as_slice())
    }

    /// Iterate over ``(token, bytes)`` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (T, &[u8])> + '_ {
        self.token_bytes
            .iter()
            .enumerate()
            .filter_map(|(idx, bytes)| Some((T::from_usize(idx)?, bytes.as_slice())))
    }

    /// The special token ids, with their text, in id order.
    pub fn special_tokens(&self) -> impl Iterator<Item = (T, &[u8])> + '_ {
        self.iter().skip(U8_SIZE).take(self.num_special_tokens)
    }

    /// The learned merges, in the order they were learned.
    pub fn merges(&self) -> &[MergeRule<T>] {
        &self.merges
    }

    /// The learned merges as ``(left bytes, right bytes)``, in order.
    pub fn merges_as_bytes(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.merges
            .iter()
            .filter_map(|rule| {
                let (a, b) = rule.pair;
                Some((self.get(a)?.to_vec(), self.get(b)?.to_vec()))
            })
            .collect()
    }

    /// Build the ``{ token -> bytes }`` map.
    pub fn to_token_map(&self) -> BTreeMap<T, Vec<u8>> {
        self.iter()
            .map(|(token, bytes)| (token, bytes.to_vec()))
            .collect()
    }

    /// Append a merge of `pair` as the next token.
    ///
    /// ## Returns
    /// The new merge rule; `None` if either token is unknown, or the next
    /// id does not fit in `T`.
    pub fn push_merge(
        &mut self,
        pair: Pair<T>,
    ) -> Option<MergeRule<T>> {
        let token = self.next_token()?;

        let mut bytes = self.get(pair.0)?.to_vec();
        bytes.extend_from_slice(self.get(pair.1)?);
        self.token_bytes.push(bytes);

        let rule = MergeRule { pair, token };
        self.merges.push(rule);
        Some(rule)
    }
}
