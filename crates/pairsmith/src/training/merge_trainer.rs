//! # Merge Trainer
//!
//! The BPE merge learning loop.
//!
//! Each step pops the most frequent pair from a lazily refreshed heap, and
//! propagates the merge to only the spans the [`PairSpanIndex`] lists for it.

use core::cmp::Ordering;

use dary_heap::OctonaryHeap;

use crate::{
    errors::{PSResult, PairsmithError},
    training::{
        CountType,
        StringChunkType,
        bpe_vocab::{BpeVocab, MergeRule, U8_SIZE},
        utility::{PairSpanIndex, TextSpanCounter, TokenSpanBuf},
    },
    types::{CommonHashSet, Pair, TokenType},
};

/// Info about a [`Pair`] that could be merged.
///
/// Jobs are ordered by count; ties are broken towards the lexicographically
/// greatest ``(left bytes, right bytes)``.
#[derive(Debug, Eq)]
pub struct MergeJob<T: TokenType, C: CountType> {
    /// The number of instances of this pair in the corpus, when queued.
    pub count: C,

    /// The bytes of the left token.
    pub left: Vec<u8>,

    /// The bytes of the right token.
    pub right: Vec<u8>,

    /// The pair to merge.
    pub pair: Pair<T>,
}

impl<T: TokenType, C: CountType> MergeJob<T, C> {
    /// The job key.
    ///
    /// Max-heap by count; tie-break to the greatest byte pair.
    pub fn heap_key(&self) -> (C, &[u8], &[u8]) {
        (self.count, self.left.as_slice(), self.right.as_slice())
    }
}

impl<T: TokenType, C: CountType> PartialEq for MergeJob<T, C> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.heap_key() == other.heap_key()
    }
}

impl<T: TokenType, C: CountType> PartialOrd for MergeJob<T, C> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TokenType, C: CountType> Ord for MergeJob<T, C> {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.heap_key().cmp(&other.heap_key())
    }
}

/// Validate the special tokens and target size against the token type.
///
/// ## Returns
/// The seed vocabulary size.
pub fn validate_vocab_config<T: TokenType, S: AsRef<str>>(
    vocab_size: usize,
    special_tokens: &[S],
) -> PSResult<usize> {
    let mut seen: CommonHashSet<&str> = CommonHashSet::with_capacity(special_tokens.len());
    for special in special_tokens {
        let special = special.as_ref();
        if special.is_empty() || !seen.insert(special) {
            return Err(PairsmithError::InvalidSpecialToken(special.to_string()));
        }
    }

    let min = U8_SIZE + special_tokens.len();
    if vocab_size < min {
        return Err(PairsmithError::VocabSizeTooSmall {
            size: vocab_size,
            min,
        });
    }
    if T::from_usize(vocab_size - 1).is_none() {
        return Err(PairsmithError::VocabSizeOverflow { size: vocab_size });
    }
    Ok(min)
}

/// Trainer state for learning binary pair merges.
///
/// The trainer exclusively owns the spans, the pair index, and the heap.
///
/// # Parameters
/// * `T` - the token type.
/// * `C` - the type used to store counts.
pub struct MergeTrainer<T: TokenType, C: CountType> {
    vocab_size: usize,
    vocab: BpeVocab<T>,
    spans: Vec<TokenSpanBuf<T>>,
    counts: Vec<C>,
    index: PairSpanIndex<T, C>,
    heap: OctonaryHeap<MergeJob<T, C>>,
}

impl<T: TokenType, C: CountType> MergeTrainer<T, C> {
    /// Initialize a trainer over unique spans and their counts.
    ///
    /// # Arguments
    /// * `spans` - the distinct pre-tokens, as byte-level token spans.
    /// * `counts` - `counts[i]` is the corpus count of `spans[i]`.
    /// * `special_tokens` - reserved tokens, assigned ids after the bytes.
    /// * `vocab_size` - the target vocabulary size.
    ///
    /// # Errors
    /// A configuration error for bad sizes or special tokens, and
    /// [`PairsmithError::SpanCountMismatch`] if the tables differ in length.
    pub fn new<S: AsRef<str>>(
        spans: Vec<TokenSpanBuf<T>>,
        counts: Vec<C>,
        special_tokens: &[S],
        vocab_size: usize,
    ) -> PSResult<Self> {
        validate_vocab_config::<T, S>(vocab_size, special_tokens)?;
        if spans.len() != counts.len() {
            return Err(PairsmithError::SpanCountMismatch {
                spans: spans.len(),
                counts: counts.len(),
            });
        }

        let vocab = BpeVocab::seed(special_tokens);

        log::info!("Building pair index over {} unique spans...", spans.len());
        let index = PairSpanIndex::from_span_count_table(&spans, &counts);

        let mut trainer = Self {
            vocab_size,
            vocab,
            spans,
            counts,
            index,
            heap: OctonaryHeap::new(),
        };

        log::info!(
            "Building heap with {} unique pairs",
            trainer.index.pair_counts.len()
        );
        let pairs: Vec<Pair<T>> = trainer.index.pair_counts.keys().copied().collect();
        trainer.heap = OctonaryHeap::with_capacity(pairs.len());
        for pair in pairs {
            trainer.push_job(pair);
        }

        Ok(trainer)
    }

    /// Initialize a trainer from a pre-token frequency table.
    pub fn from_span_counter<K, S>(
        span_counter: &TextSpanCounter<K, C>,
        special_tokens: &[S],
        vocab_size: usize,
    ) -> PSResult<Self>
    where
        K: StringChunkType,
        S: AsRef<str>,
    {
        let (spans, counts): (Vec<TokenSpanBuf<T>>, Vec<C>) =
            span_counter.to_text_span_counts_iter().unzip();
        Self::new(spans, counts, special_tokens, vocab_size)
    }

    /// The target vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// The vocabulary learned so far.
    pub fn vocab(&self) -> &BpeVocab<T> {
        &self.vocab
    }

    /// The current spans.
    pub fn spans(&self) -> &[TokenSpanBuf<T>] {
        &self.spans
    }

    /// The span counts.
    pub fn counts(&self) -> &[C] {
        &self.counts
    }

    /// The incremental pair index.
    pub fn pair_index(&self) -> &PairSpanIndex<T, C> {
        &self.index
    }

    /// Is the vocabulary at its target size?
    pub fn is_full(&self) -> bool {
        self.vocab.len() >= self.vocab_size
    }

    /// The number of merges still to learn to reach the target size.
    pub fn remaining_merges(&self) -> usize {
        self.vocab_size.saturating_sub(self.vocab.len())
    }

    fn push_job(
        &mut self,
        pair: Pair<T>,
    ) {
        let count = self.index.count(&pair);
        if count <= C::zero() {
            return;
        }
        let (Some(left), Some(right)) = (self.vocab.get(pair.0), self.vocab.get(pair.1)) else {
            return;
        };
        let job = MergeJob {
            count,
            left: left.to_vec(),
            right: right.to_vec(),
            pair,
        };
        self.heap.push(job);
    }

    /// Pop the current best pair.
    ///
    /// Stale jobs (whose queued count no longer matches the index) are
    /// refreshed and re-queued; jobs for dead pairs are dropped.
    fn pop_best(&mut self) -> Option<MergeJob<T, C>> {
        let zero = C::zero();
        while let Some(mut job) = self.heap.pop() {
            let current = self.index.count(&job.pair);
            if current == zero {
                continue;
            }
            if job.count != current {
                job.count = current;
                self.heap.push(job);
                continue;
            }
            return Some(job);
        }
        None
    }

    /// Learn one merge.
    ///
    /// ## Returns
    /// The new merge rule; `None` when the vocabulary is full, or no pairs remain.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn step(&mut self) -> Option<MergeRule<T>> {
        if self.is_full() {
            return None;
        }

        let job = self.pop_best()?;
        let rule = self.vocab.push_merge(job.pair)?;

        let created = self
            .index
            .merge_pair(&mut self.spans, &self.counts, job.pair, rule.token);

        // Every created pair contains the new token; none are queued yet.
        for pair in created {
            self.push_job(pair);
        }

        log::trace!(
            "merge {:?} -> {} (frequency: {})",
            job.pair,
            rule.token,
            job.count
        );
        Some(rule)
    }

    /// Learn merges until the vocabulary is full, or no pairs remain.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub fn train(mut self) -> BpeVocab<T> {
        let num_merges = self.remaining_merges();
        log::info!("Starting BPE training: {} merges to compute", num_merges);

        let mut merges_done = 0;
        let mut last_log_percent = 0;

        while let Some(rule) = self.step() {
            merges_done += 1;

            // Log progress every 1%
            let current_percent = (merges_done * 100) / num_merges;
            if current_percent > last_log_percent {
                log::info!(
                    "Progress: {}% ({}/{} merges) - Last merge: {:?} -> {:?}",
                    current_percent,
                    merges_done,
                    num_merges,
                    rule.pair,
                    rule.token,
                );
                last_log_percent = current_percent;
            }
        }

        if merges_done < num_merges {
            log::info!(
                "Stopped early: no pairs remain after {} of {} merges",
                merges_done,
                num_merges
            );
        }

        log::info!("Finished training: {} merges completed", merges_done);
        self.vocab
    }
}
