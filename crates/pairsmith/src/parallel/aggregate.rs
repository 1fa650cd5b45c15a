//! # Frequency Table Aggregation

use crate::training::{CountType, StringChunkType, utility::SpanCountMap};

/// Sum per-chunk frequency tables into one.
///
/// Summation is commutative and associative, so the result does not depend
/// on the order the tables arrive in. The largest table is reused as the
/// accumulator.
pub fn aggregate_span_counts<K, C, I>(maps: I) -> SpanCountMap<K, C>
where
    K: StringChunkType,
    C: CountType,
    I: IntoIterator<Item = SpanCountMap<K, C>>,
{
    let mut maps: Vec<SpanCountMap<K, C>> = maps.into_iter().collect();

    let Some(largest) = (0..maps.len()).max_by_key(|&idx| maps[idx].len()) else {
        return SpanCountMap::default();
    };
    let mut acc = maps.swap_remove(largest);

    let zero = C::zero();
    for map in maps {
        for (span, count) in map {
            if count > zero {
                *acc.entry(span).or_default() += count;
            }
        }
    }
    acc
}
