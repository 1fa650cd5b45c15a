//! # Pre-Tokenization Worker Pool

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    path::Path,
    sync::{Arc, mpsc},
};

use crate::{
    errors::{PSResult, PairsmithError},
    parallel::aggregate_span_counts,
    pretokenize::{PreTokenizeConfig, pretokenize_chunk},
    training::{
        CountType,
        StringChunkType,
        utility::{SpanCountMap, TextSpanCounter},
    },
};

type ChunkResult<K, C> = (usize, PSResult<SpanCountMap<K, C>>);

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Pre-tokenize every chunk of a corpus in parallel, and sum the counts.
///
/// One task is spawned per chunk ``[boundaries[i], boundaries[i + 1])``;
/// each sends exactly one result through a channel. The caller drains one
/// message per task, in whatever order they finish, and the scope joins all
/// tasks before returning.
///
/// ## Arguments
/// * `path` - the corpus file; each task opens its own handle.
/// * `boundaries` - strictly increasing chunk boundaries.
/// * `config` - the shared, immutable pre-tokenization config.
/// * `num_threads` - the pool size; zero is treated as one.
///
/// ## Errors
/// Any task failure fails the whole run; partial results are discarded.
/// * [`PairsmithError::ChunkFailed`] - a task returned an I/O or regex error.
/// * [`PairsmithError::WorkerFailed`] - a task panicked.
/// * [`PairsmithError::IncompleteAggregation`] - fewer results than tasks.
/// * [`PairsmithError::ThreadPool`] - the pool could not be built.
///
/// Task errors are reported for the lowest failing chunk index.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(config)))]
pub fn pretokenize_corpus<K, C>(
    path: &Path,
    boundaries: &[u64],
    config: Arc<PreTokenizeConfig>,
    num_threads: usize,
) -> PSResult<TextSpanCounter<K, C>>
where
    K: StringChunkType,
    C: CountType,
{
    let chunks: Vec<(u64, u64)> = boundaries.windows(2).map(|w| (w[0], w[1])).collect();
    let expected = chunks.len();
    if expected == 0 {
        return Ok(TextSpanCounter::default());
    }

    let num_threads = num_threads.clamp(1, expected);
    log::info!("Pre-tokenizing {expected} chunks on {num_threads} threads");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|idx| format!("pairsmith-pretokenize-{idx}"))
        .build()?;

    let (tx, rx) = mpsc::channel::<ChunkResult<K, C>>();

    // The drain runs on the calling thread; the tasks run on the pool.
    let mut results: Vec<ChunkResult<K, C>> = pool.in_place_scope(|scope| {
        for (idx, &(start, end)) in chunks.iter().enumerate() {
            let tx = tx.clone();
            let config = Arc::clone(&config);

            scope.spawn(move |_| {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    pretokenize_chunk::<K, C>(path, start, end, &config).map_err(|source| {
                        PairsmithError::ChunkFailed {
                            chunk: idx,
                            source: Box::new(source),
                        }
                    })
                }))
                .unwrap_or_else(|payload| {
                    Err(PairsmithError::WorkerFailed {
                        chunk: idx,
                        reason: panic_reason(payload.as_ref()),
                    })
                });

                if let Ok(counts) = &result {
                    log::debug!(
                        "chunk {idx} [{start}, {end}): {} distinct pre-tokens",
                        counts.len()
                    );
                }

                // The receiver only hangs up early if the caller is gone.
                let _ = tx.send((idx, result));
            });
        }
        drop(tx);

        let mut received = Vec::with_capacity(expected);
        for _ in 0..expected {
            match rx.recv() {
                Ok(msg) => received.push(msg),
                Err(_) => break,
            }
        }
        received
    });

    if results.len() < expected {
        return Err(PairsmithError::IncompleteAggregation {
            expected,
            received: results.len(),
        });
    }

    results.sort_by_key(|(idx, _)| *idx);
    let maps = results
        .into_iter()
        .map(|(_, result)| result)
        .collect::<PSResult<Vec<_>>>()?;

    let counter = TextSpanCounter::from(aggregate_span_counts(maps));
    log::info!(
        "Counted {} distinct pre-tokens ({} total)",
        counter.len(),
        counter.total()
    );
    Ok(counter)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use compact_str::CompactString;
    use tempdir::TempDir;

    use super::*;
    use crate::{
        corpus::CorpusFile,
        errors::TrainingPhase,
        pretokenize::{DecodePolicy, PreTokenizer, pretokenize_bytes},
    };

    const EOT: &str = "<|endoftext|>";

    fn write_corpus(
        dir: &TempDir,
        text: &str,
    ) -> std::path::PathBuf {
        let path = dir.path().join("corpus.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(text.as_bytes())
            .unwrap();
        path
    }

    fn sample_corpus() -> String {
        let docs = [
            "The quick brown fox jumps over the lazy dog.",
            "It's 2024; the fox's den has 3 exits.",
            "  spaced   out\n\ntext\t",
            "caf\u{00e9} na\u{00ef}ve \u{2603}\u{2603}",
        ];
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(docs[i % docs.len()]);
            text.push_str(EOT);
        }
        text
    }

    #[test]
    fn test_matches_single_pass() {
        let dir = TempDir::new("pretokenize_corpus").unwrap();
        let text = sample_corpus();
        let path = write_corpus(&dir, &text);

        let config = Arc::new(PreTokenizeConfig::gpt2(&[EOT]).unwrap());
        let expected: SpanCountMap<CompactString, u64> =
            pretokenize_bytes(text.as_bytes(), &config).unwrap();

        for (chunks, threads) in [(1, 1), (2, 2), (4, 2), (8, 4), (16, 3)] {
            let boundaries = CorpusFile::open(&path)
                .unwrap()
                .chunk_boundaries(chunks, &[EOT])
                .unwrap();

            let counter: TextSpanCounter<CompactString, u64> =
                pretokenize_corpus(&path, &boundaries, config.clone(), threads).unwrap();

            assert_eq!(counter.span_counts, expected, "chunks={chunks}");
        }
    }

    #[test]
    fn test_no_chunks() {
        let dir = TempDir::new("pretokenize_corpus").unwrap();
        let path = write_corpus(&dir, "");

        let config = Arc::new(PreTokenizeConfig::gpt2(&[EOT]).unwrap());
        let counter: TextSpanCounter =
            pretokenize_corpus(&path, &[0], config, 4).unwrap();
        assert!(counter.is_empty());
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = TempDir::new("pretokenize_corpus").unwrap();
        let path = dir.path().join("missing.txt");

        let config = Arc::new(PreTokenizeConfig::gpt2(&[EOT]).unwrap());
        let result: PSResult<TextSpanCounter> =
            pretokenize_corpus(&path, &[0, 10, 20], config, 2);
        let err = result.unwrap_err();
        match &err {
            PairsmithError::ChunkFailed { chunk: 0, source } => {
                assert!(matches!(source.as_ref(), PairsmithError::Io(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.phase(), TrainingPhase::PreTokenization);
    }

    struct PanickingPreTokenizer;

    impl PreTokenizer for PanickingPreTokenizer {
        fn for_each_pretoken(
            &self,
            text: &str,
            f: &mut dyn FnMut(&str),
        ) -> PSResult<()> {
            if text.contains("boom") {
                panic!("cannot pre-tokenize {text:?}");
            }
            text.split_whitespace().for_each(f);
            Ok(())
        }
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let dir = TempDir::new("pretokenize_corpus").unwrap();
        let path = write_corpus(&dir, "fine text<|endoftext|>boom<|endoftext|>more");

        let config = Arc::new(
            PreTokenizeConfig::new(Arc::new(PanickingPreTokenizer), &[EOT], DecodePolicy::Ignore)
                .unwrap(),
        );
        let boundaries = CorpusFile::open(&path)
            .unwrap()
            .chunk_boundaries(5, &[EOT])
            .unwrap();
        assert_eq!(boundaries, vec![0, 9, 26, 43]);

        let err = pretokenize_corpus::<CompactString, u64>(&path, &boundaries, config, 3)
            .unwrap_err();
        match &err {
            PairsmithError::WorkerFailed { chunk, reason } => {
                assert_eq!(*chunk, 1);
                assert!(reason.contains("boom"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.phase(), TrainingPhase::PreTokenization);
    }
}
