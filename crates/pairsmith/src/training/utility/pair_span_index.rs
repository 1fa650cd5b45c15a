//! # `PairIndex` Builder

use crate::{
    training::{CountType, utility::token_span_buffer::TokenSpanBuf},
    types::{CommonHashMap, CommonHashSet, Pair, TokenType},
};

/// A map from [`Pair`] to its occurrence count.
pub type PairCountMap<T, C> = CommonHashMap<Pair<T>, C>;

/// A map from [`Pair`] to indices over ``words``.
pub type PairIndexMap<T> = CommonHashMap<Pair<T>, CommonHashSet<usize>>;

/// An index of ``(T, T)`` pair information relative to a ``&[TokenSpanBuf<T>]``.
///
/// Invariants, relative to the spans and counts it was built from:
/// * ``pair_counts[p] == sum(windows_equal(spans[i], p) * counts[i])``,
///   and only non-zero counts are present.
/// * ``pair_index[p]`` is exactly the set of span indices containing `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSpanIndex<T: TokenType, C: CountType> {
    /// A map from [`Pair`] to its occurrence count.
    pub pair_counts: PairCountMap<T, C>,

    /// A map from [`Pair`] to span indices.
    pub pair_index: PairIndexMap<T>,
}

impl<T: TokenType, C: CountType> PairSpanIndex<T, C> {
    /// Build a [`PairSpanIndex`] from a slice of [`TokenSpanBuf`]s, using a count table.
    ///
    /// # Arguments
    /// * `spans` - a sequence of text spans; assumed to be unique.
    /// * `counts` - `counts[i]` is the count of `spans[i]`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(spans, counts)))]
    pub fn from_span_count_table(
        spans: &[TokenSpanBuf<T>],
        counts: &[C],
    ) -> Self {
        let size_hint = spans.len() / 16;

        let mut pair_index = PairSpanIndex {
            pair_counts: PairCountMap::with_capacity(size_hint),
            pair_index: PairIndexMap::with_capacity(size_hint),
        };

        let zero = C::zero();

        for (index, span) in spans.iter().enumerate() {
            let count = counts[index];

            if count != zero && span.len() >= 2 {
                for p in span.pairs() {
                    *pair_index.pair_counts.entry(p).or_default() += count;
                    pair_index.pair_index.entry(p).or_default().insert(index);
                }
            }
        }

        pair_index
    }

    /// The current count of `pair`; zero when absent.
    pub fn count(
        &self,
        pair: &Pair<T>,
    ) -> C {
        self.pair_counts.get(pair).copied().unwrap_or_else(C::zero)
    }

    /// Is the index exhausted of mergeable pairs?
    pub fn is_empty(&self) -> bool {
        self.pair_counts.is_empty()
    }

    /// Merge `pair -> replacement` in every span containing it.
    ///
    /// Only the spans listed in ``pair_index[pair]`` are visited; the counts
    /// and the inverted index are updated incrementally.
    ///
    /// # Arguments
    /// * `spans` - the spans this index was built over; rewritten in place.
    /// * `counts` - `counts[i]` is the count of `spans[i]`.
    /// * `pair` - the pair to merge.
    /// * `replacement` - the new token.
    ///
    /// # Returns
    /// The pairs created by the merge which are still live; each contains
    /// `replacement`.
    pub fn merge_pair(
        &mut self,
        spans: &mut [TokenSpanBuf<T>],
        counts: &[C],
        pair: Pair<T>,
        replacement: T,
    ) -> Vec<Pair<T>> {
        let Some(span_indices) = self.pair_index.remove(&pair) else {
            return Vec::new();
        };

        let zero = C::zero();
        let pair_counts = &mut self.pair_counts;
        let pair_index = &mut self.pair_index;

        let mut created: CommonHashSet<Pair<T>> = CommonHashSet::with_capacity(16);
        let mut removed: Vec<Pair<T>> = Vec::with_capacity(8);

        for span_idx in span_indices {
            let count = counts[span_idx];
            let span = &mut spans[span_idx];

            removed.clear();
            span.merge_pair_cb(pair, replacement, &mut |p, delta| {
                if delta < 0 {
                    // This (a, b) pair was removed from this span.
                    let remaining = {
                        let c = pair_counts.entry(p).or_default();
                        *c -= count;
                        *c
                    };
                    if remaining == zero {
                        pair_counts.remove(&p);
                    }
                    removed.push(p);
                } else {
                    // This (a, b) pair was added to this span.
                    // And either a or b is replacement.
                    *pair_counts.entry(p).or_default() += count;
                    pair_index.entry(p).or_default().insert(span_idx);
                    created.insert(p);
                }
            });

            // A removed adjacency may survive elsewhere in the span.
            for p in removed.iter() {
                if *p == pair || span.contains_pair(*p) {
                    continue;
                }
                if let Some(indices) = pair_index.get_mut(p) {
                    indices.remove(&span_idx);
                    if indices.is_empty() {
                        pair_index.remove(p);
                    }
                }
            }
        }

        debug_assert!(!pair_counts.contains_key(&pair));
        pair_counts.remove(&pair);

        let mut created: Vec<Pair<T>> = created
            .into_iter()
            .filter(|p| pair_counts.contains_key(p))
            .collect();
        created.sort();
        created
    }
}
