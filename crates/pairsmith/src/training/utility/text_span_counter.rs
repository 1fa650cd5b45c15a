//! # Pre-Token Counter

use compact_str::CompactString;

use crate::{
    training::{CountType, StringChunkType, utility::token_span_buffer::TokenSpanBuf},
    types::{CommonHashMap, TokenType},
};

/// A frequency table from pre-token text to occurrence count.
pub type SpanCountMap<K, C> = CommonHashMap<K, C>;

/// Options for [`TextSpanCounter`].
#[derive(Debug, Clone)]
pub struct TextSpanCounterOptions {
    /// Expected number of distinct pre-tokens.
    /// Used when pre-allocating the table.
    pub capacity: usize,
}

impl Default for TextSpanCounterOptions {
    fn default() -> Self {
        Self { capacity: 4096 }
    }
}

impl TextSpanCounterOptions {
    /// Set the expected number of distinct pre-tokens.
    pub fn with_capacity(
        self,
        capacity: usize,
    ) -> Self {
        Self { capacity }
    }
}

/// Pre-token frequency table.
///
/// Two pre-tokens with the same text are the same entry; every count
/// present is at least one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSpanCounter<K = CompactString, C = u64>
where
    K: StringChunkType,
    C: CountType,
{
    /// The pre-token counts.
    pub span_counts: SpanCountMap<K, C>,
}

impl<K, C> Default for TextSpanCounter<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    fn default() -> Self {
        Self::new(TextSpanCounterOptions::default())
    }
}

impl<K, C> From<SpanCountMap<K, C>> for TextSpanCounter<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    fn from(span_counts: SpanCountMap<K, C>) -> Self {
        Self { span_counts }
    }
}

impl<K, C> TextSpanCounter<K, C>
where
    K: StringChunkType,
    C: CountType,
{
    /// Create a new, empty counter.
    pub fn new(options: TextSpanCounterOptions) -> Self {
        Self {
            span_counts: SpanCountMap::with_capacity(options.capacity),
        }
    }

    /// Release the counts and return them.
    pub fn release(self) -> SpanCountMap<K, C> {
        self.span_counts
    }

    /// The number of distinct pre-tokens.
    pub fn len(&self) -> usize {
        self.span_counts.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.span_counts.is_empty()
    }

    /// The total number of pre-token occurrences counted.
    pub fn total(&self) -> C {
        self.span_counts
            .values()
            .fold(C::zero(), |acc, &count| acc + count)
    }

    /// The count of a pre-token; zero when absent.
    pub fn get(
        &self,
        span: &str,
    ) -> C {
        self.span_counts
            .get(&K::from(span))
            .copied()
            .unwrap_or_else(C::zero)
    }

    /// Count one occurrence of a pre-token.
    pub fn add_span(
        &mut self,
        span: &str,
    ) {
        self.add_count(K::from(span), C::one());
    }

    /// Add `count` occurrences of a pre-token.
    pub fn add_count(
        &mut self,
        span: K,
        count: C,
    ) {
        if count > C::zero() {
            *self.span_counts.entry(span).or_default() += count;
        }
    }

    /// Sum another table into this one.
    pub fn merge_counts(
        &mut self,
        other: SpanCountMap<K, C>,
    ) {
        self.span_counts.reserve(other.len());
        for (span, count) in other {
            self.add_count(span, count);
        }
    }

    /// Convert the table to a [`TokenSpanBuf<T>`] count iterator.
    ///
    /// Each span is the byte-level token sequence of the pre-token's UTF-8 bytes.
    pub fn to_text_span_counts_iter<T: TokenType>(
        &self
    ) -> impl Iterator<Item = (TokenSpanBuf<T>, C)> + '_ {
        self.span_counts
            .iter()
            .map(|(k, v)| (TokenSpanBuf::from_string(k), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_counter() {
        let mut counter: TextSpanCounter<String, u64> = Default::default();
        assert!(counter.is_empty());

        for span in ["Hello", " world", " world", "!", " world"] {
            counter.add_span(span);
        }

        assert_eq!(counter.len(), 3);
        assert_eq!(counter.total(), 5);
        assert_eq!(counter.get(" world"), 3);
        assert_eq!(counter.get("missing"), 0);

        // Zero counts are never stored.
        counter.add_count("zero".to_string(), 0);
        assert_eq!(counter.len(), 3);

        let mut counts = counter.release().into_iter().collect::<Vec<_>>();
        counts.sort();
        assert_eq!(
            counts,
            vec![
                (" world".to_string(), 3),
                ("!".to_string(), 1),
                ("Hello".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_merge_counts() {
        let mut a: TextSpanCounter = Default::default();
        a.add_span("x");
        a.add_span("y");

        let mut b: TextSpanCounter = Default::default();
        b.add_span("y");
        b.add_span("z");
        b.add_span("z");

        a.merge_counts(b.release());
        assert_eq!(a.get("x"), 1);
        assert_eq!(a.get("y"), 2);
        assert_eq!(a.get("z"), 2);
        assert_eq!(a.total(), 5);
    }

    #[test]
    fn test_to_text_span_counts_iter() {
        let mut counter: TextSpanCounter<CompactString, u32> = Default::default();
        counter.add_span("ab");
        counter.add_span("ab");
        counter.add_span("\u{00e9}");

        let mut spans: Vec<(TokenSpanBuf<u16>, u32)> = counter.to_text_span_counts_iter().collect();
        spans.sort();

        assert_eq!(
            spans,
            vec![
                (TokenSpanBuf::from_tokens([97, 98]), 2),
                (TokenSpanBuf::from_tokens([0xC3, 0xA9]), 1),
            ]
        );
    }
}
