//! # Chunk Pre-Tokenization
//!
//! Turns one corpus byte range into a local pre-token frequency table.

use std::{fmt::Debug, path::Path, sync::Arc};

use crate::{
    PSResult,
    corpus::read_corpus_range,
    pretokenize::{DecodePolicy, PreTokenizer, RegexPreTokenizer, SpecialSplitter, decode_lossy},
    regex::RegexWrapperPattern,
    training::{
        CountType,
        StringChunkType,
        utility::{SpanCountMap, TextSpanCounter},
    },
};

/// Everything a pre-tokenization worker needs; immutable and shared.
#[derive(Clone)]
pub struct PreTokenizeConfig {
    /// The pre-tokenization grammar.
    pub pretokenizer: Arc<dyn PreTokenizer>,

    /// The document splitter over special tokens.
    pub splitter: SpecialSplitter,

    /// How invalid UTF-8 is handled.
    pub decode_policy: DecodePolicy,
}

impl Debug for PreTokenizeConfig {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("PreTokenizeConfig")
            .field("splitter", &self.splitter)
            .field("decode_policy", &self.decode_policy)
            .finish_non_exhaustive()
    }
}

impl PreTokenizeConfig {
    /// Build a config from an injected pre-tokenizer.
    pub fn new<S: AsRef<str>>(
        pretokenizer: Arc<dyn PreTokenizer>,
        special_tokens: &[S],
        decode_policy: DecodePolicy,
    ) -> PSResult<Self> {
        Ok(Self {
            pretokenizer,
            splitter: SpecialSplitter::new(special_tokens)?,
            decode_policy,
        })
    }

    /// Build a config from a regex pattern.
    pub fn from_pattern<S: AsRef<str>>(
        pattern: &RegexWrapperPattern,
        special_tokens: &[S],
        decode_policy: DecodePolicy,
    ) -> PSResult<Self> {
        let pretokenizer = RegexPreTokenizer::new(pattern.compile()?);
        Self::new(Arc::new(pretokenizer), special_tokens, decode_policy)
    }

    /// The GPT-2 grammar, ignoring invalid UTF-8.
    pub fn gpt2<S: AsRef<str>>(special_tokens: &[S]) -> PSResult<Self> {
        Self::new(
            Arc::new(RegexPreTokenizer::gpt2()),
            special_tokens,
            DecodePolicy::default(),
        )
    }
}

/// Count the pre-tokens of `text` into `counter`.
///
/// The text is split into documents on special tokens first; special
/// tokens are never counted.
pub fn pretokenize_text<K, C>(
    text: &str,
    config: &PreTokenizeConfig,
    counter: &mut TextSpanCounter<K, C>,
) -> PSResult<()>
where
    K: StringChunkType,
    C: CountType,
{
    config.splitter.for_each_fragment(text, |document| {
        config
            .pretokenizer
            .for_each_pretoken(document, &mut |piece| counter.add_span(piece))
    })
}

/// Count the pre-tokens of a raw byte buffer.
///
/// Invalid UTF-8 is handled per [`PreTokenizeConfig::decode_policy`].
pub fn pretokenize_bytes<K, C>(
    bytes: &[u8],
    config: &PreTokenizeConfig,
) -> PSResult<SpanCountMap<K, C>>
where
    K: StringChunkType,
    C: CountType,
{
    let text = decode_lossy(bytes, config.decode_policy);
    let mut counter = TextSpanCounter::default();
    pretokenize_text(&text, config, &mut counter)?;
    Ok(counter.release())
}

/// Count the pre-tokens of the corpus byte range ``[start, end)``.
///
/// Reads only its assigned range, through its own file handle.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(config)))]
pub fn pretokenize_chunk<K, C>(
    path: &Path,
    start: u64,
    end: u64,
    config: &PreTokenizeConfig,
) -> PSResult<SpanCountMap<K, C>>
where
    K: StringChunkType,
    C: CountType,
{
    let bytes = read_corpus_range(path, start, end)?;
    pretokenize_bytes(&bytes, config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use compact_str::CompactString;
    use tempdir::TempDir;

    use super::*;

    fn sorted_counts(counts: SpanCountMap<CompactString, u64>) -> Vec<(String, u64)> {
        let mut counts: Vec<(String, u64)> = counts
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        counts.sort();
        counts
    }

    #[test]
    fn test_pretokenize_bytes() {
        let config = PreTokenizeConfig::gpt2(&["<|endoftext|>"]).unwrap();

        let counts = pretokenize_bytes(
            b"the cat<|endoftext|>the dog<|endoftext|> the",
            &config,
        )
        .unwrap();

        assert_eq!(
            sorted_counts(counts),
            vec![
                (" cat".to_string(), 1),
                (" dog".to_string(), 1),
                (" the".to_string(), 1),
                ("the".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_specials_never_counted() {
        let config = PreTokenizeConfig::gpt2(&["<|endoftext|>"]).unwrap();
        let counts: SpanCountMap<CompactString, u64> =
            pretokenize_bytes(b"<|endoftext|><|endoftext|>", &config).unwrap();
        assert!(counts.is_empty());

        // Without the special, it is just text.
        let config = PreTokenizeConfig::gpt2::<&str>(&[]).unwrap();
        let counts = pretokenize_bytes(b"a<|endoftext|>", &config).unwrap();
        assert_eq!(
            sorted_counts(counts),
            vec![
                ("<|".to_string(), 1),
                ("a".to_string(), 1),
                ("endoftext".to_string(), 1),
                ("|>".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_is_dropped() {
        let config = PreTokenizeConfig::gpt2::<&str>(&[]).unwrap();
        let counts = pretokenize_bytes(b"ab\xffcd", &config).unwrap();
        assert_eq!(sorted_counts(counts), vec![("abcd".to_string(), 1)]);

        let config = PreTokenizeConfig::from_pattern(
            &RegexWrapperPattern::Basic(r"\S+".to_string()),
            &["#"],
            DecodePolicy::Replace,
        )
        .unwrap();
        let counts = pretokenize_bytes(b"ab\xffcd#ab\xffcd", &config).unwrap();
        assert_eq!(
            sorted_counts(counts),
            vec![("ab\u{fffd}cd".to_string(), 2)]
        );
    }

    #[test]
    fn test_pretokenize_chunk() {
        let dir = TempDir::new("pretokenize_chunk").unwrap();
        let path = dir.path().join("corpus.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"low lower<|endoftext|>low").unwrap();
        drop(file);

        let config = PreTokenizeConfig::gpt2(&["<|endoftext|>"]).unwrap();

        let counts = pretokenize_chunk(&path, 0, 9, &config).unwrap();
        assert_eq!(
            sorted_counts(counts),
            vec![(" lower".to_string(), 1), ("low".to_string(), 1)]
        );

        let counts = pretokenize_chunk(&path, 9, 25, &config).unwrap();
        assert_eq!(sorted_counts(counts), vec![("low".to_string(), 1)]);
    }
}
