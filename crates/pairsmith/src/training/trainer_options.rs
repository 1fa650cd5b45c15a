//! # Trainer Options
//!
//! The end-to-end training pipeline:
//! corpus -> chunk boundaries -> parallel pre-token counts -> merges.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use compact_str::CompactString;

use crate::{
    corpus::CorpusFile,
    errors::PSResult,
    parallel::{est_max_parallelism, pretokenize_corpus},
    pretokenize::{
        DecodePolicy,
        GPT2_PRETOKENIZE_PATTERN,
        PreTokenizeConfig,
        pretokenize_bytes,
        pretokenize_text,
    },
    regex::RegexWrapperPattern,
    training::{
        BpeVocab,
        CountType,
        StringChunkType,
        merge_trainer::{MergeTrainer, validate_vocab_config},
        utility::{SpanCountMap, TextSpanCounter},
    },
    types::TokenType,
};

/// Options for training a [`BpeVocab`].
#[derive(Debug, Clone)]
pub struct TrainerOptions {
    /// The target vocabulary size; bytes and special tokens included.
    pub vocab_size: usize,

    /// The special tokens; assigned ids ``256..`` in this order.
    ///
    /// These are also the document delimiters of the corpus.
    pub special_tokens: Vec<String>,

    /// The number of corpus chunks (and worker threads).
    ///
    /// `None` uses the available parallelism.
    pub num_chunks: Option<usize>,

    /// The pre-tokenization pattern.
    pub pattern: RegexWrapperPattern,

    /// How invalid UTF-8 in the corpus is handled.
    pub decode_policy: DecodePolicy,
}

impl TrainerOptions {
    /// Create new options.
    ///
    /// ## Arguments
    /// * `vocab_size` - The target vocabulary size.
    ///
    /// ## Returns
    /// Options using the GPT-2 pre-tokenization pattern, and no special tokens.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            special_tokens: Vec::new(),
            num_chunks: None,
            pattern: GPT2_PRETOKENIZE_PATTERN.to_pattern(),
            decode_policy: DecodePolicy::default(),
        }
    }

    /// Sets the vocab size.
    pub fn with_vocab_size(
        self,
        vocab_size: usize,
    ) -> Self {
        Self { vocab_size, ..self }
    }

    /// Sets the special tokens.
    pub fn with_special_tokens<I, S>(
        self,
        special_tokens: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            special_tokens: special_tokens
                .into_iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
            ..self
        }
    }

    /// Sets the number of chunks; `None` uses the available parallelism.
    pub fn with_num_chunks(
        self,
        num_chunks: Option<usize>,
    ) -> Self {
        Self { num_chunks, ..self }
    }

    /// Sets the pre-tokenization pattern.
    ///
    /// The pattern is compiled when training starts.
    pub fn with_pattern<P: Into<RegexWrapperPattern>>(
        self,
        pattern: P,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            ..self
        }
    }

    /// Sets the decode policy.
    pub fn with_decode_policy(
        self,
        decode_policy: DecodePolicy,
    ) -> Self {
        Self {
            decode_policy,
            ..self
        }
    }

    /// The effective chunk count; always at least one.
    pub fn resolved_num_chunks(&self) -> usize {
        self.num_chunks
            .unwrap_or_else(est_max_parallelism)
            .max(1)
    }

    /// Validate the vocab size and special tokens for token type `T`.
    ///
    /// ## Returns
    /// The seed vocabulary size.
    pub fn validate<T: TokenType>(&self) -> PSResult<usize> {
        validate_vocab_config::<T, String>(self.vocab_size, &self.special_tokens)
    }

    /// Compile the pre-tokenization config.
    pub fn pretokenize_config(&self) -> PSResult<PreTokenizeConfig> {
        PreTokenizeConfig::from_pattern(&self.pattern, &self.special_tokens, self.decode_policy)
    }

    /// Count the pre-tokens of a corpus file, in parallel.
    pub fn count_path<K, C>(
        &self,
        path: impl AsRef<Path>,
    ) -> PSResult<TextSpanCounter<K, C>>
    where
        K: StringChunkType,
        C: CountType,
    {
        let config = Arc::new(self.pretokenize_config()?);

        let mut corpus = CorpusFile::open(path)?;
        let num_chunks = self.resolved_num_chunks();
        log::info!(
            "Chunking corpus {:?} ({} bytes) into {} chunks",
            corpus.path(),
            corpus.len(),
            num_chunks
        );

        let boundaries = corpus.chunk_boundaries(num_chunks, &self.special_tokens)?;

        pretokenize_corpus(corpus.path(), &boundaries, config, num_chunks)
    }

    /// Learn merges from a pre-token frequency table.
    pub fn train_counts<T, K, C>(
        &self,
        span_counter: &TextSpanCounter<K, C>,
    ) -> PSResult<BpeVocab<T>>
    where
        T: TokenType,
        K: StringChunkType,
        C: CountType,
    {
        let trainer: MergeTrainer<T, C> =
            MergeTrainer::from_span_counter(span_counter, &self.special_tokens, self.vocab_size)?;
        Ok(trainer.train())
    }

    /// Train a vocabulary on a corpus file.
    ///
    /// Configuration is validated before the corpus is opened.
    ///
    /// ## Parameters
    /// * `T` - the token type.
    /// * `C` - the type used to store counts.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, path)))]
    pub fn train_path<T, C>(
        &self,
        path: impl AsRef<Path>,
    ) -> PSResult<BpeVocab<T>>
    where
        T: TokenType,
        C: CountType,
    {
        self.validate::<T>()?;
        let span_counter: TextSpanCounter<CompactString, C> = self.count_path(path)?;
        self.train_counts(&span_counter)
    }

    /// Train a vocabulary on an in-memory corpus.
    pub fn train_from_bytes<T, C>(
        &self,
        corpus: &[u8],
    ) -> PSResult<BpeVocab<T>>
    where
        T: TokenType,
        C: CountType,
    {
        self.validate::<T>()?;
        let config = self.pretokenize_config()?;
        let counts: SpanCountMap<CompactString, C> = pretokenize_bytes(corpus, &config)?;
        self.train_counts(&TextSpanCounter::from(counts))
    }

    /// Train a vocabulary on a stream of text samples.
    ///
    /// Each sample is split on special tokens, like a corpus.
    pub fn train_from_samples<T, C, I, S>(
        &self,
        samples: I,
    ) -> PSResult<BpeVocab<T>>
    where
        T: TokenType,
        C: CountType,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.validate::<T>()?;
        let config = self.pretokenize_config()?;
        let mut span_counter: TextSpanCounter<CompactString, C> = Default::default();
        for sample in samples {
            pretokenize_text(sample.as_ref(), &config, &mut span_counter)?;
        }
        self.train_counts(&span_counter)
    }
}

/// Train a byte-level BPE vocabulary on a corpus file.
///
/// Uses the GPT-2 pre-tokenization pattern, and one chunk per available core.
///
/// ## Returns
/// ``(vocab, merges)``:
/// * `vocab` - ``{ id -> bytes }``; bytes at ``0..256``, then the special tokens, then merges.
/// * `merges` - ``(left bytes, right bytes)``, in the order they were learned.
pub fn train_bpe<S: AsRef<str>>(
    input_path: impl AsRef<Path>,
    vocab_size: usize,
    special_tokens: &[S],
) -> PSResult<(BTreeMap<u32, Vec<u8>>, Vec<(Vec<u8>, Vec<u8>)>)> {
    let vocab: BpeVocab<u32> = TrainerOptions::new(vocab_size)
        .with_special_tokens(special_tokens)
        .train_path::<u32, u64>(input_path)?;

    Ok((vocab.to_token_map(), vocab.merges_as_bytes()))
}
