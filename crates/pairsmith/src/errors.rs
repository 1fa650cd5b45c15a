//! # Error Types

use std::path::PathBuf;

use crate::regex::ErrorWrapper;

/// The pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainingPhase {
    /// Options validation, before any corpus access.
    Configuration,

    /// Opening the corpus and computing chunk boundaries.
    Chunking,

    /// Parallel pre-tokenization and aggregation.
    PreTokenization,

    /// The merge learning loop.
    Merging,
}

/// Errors from pairsmith operations.
#[derive(Debug, thiserror::Error)]
pub enum PairsmithError {
    /// Vocab size is below the seed size (256 bytes + special tokens).
    #[error("vocab size ({size}) must be >= {min} (256 bytes + special tokens)")]
    VocabSizeTooSmall {
        /// The vocab size that was too small.
        size: usize,

        /// The seed vocabulary size.
        min: usize,
    },

    /// Vocab size exceeds the capacity of the target token type.
    #[error("vocab size ({size}) exceeds token type capacity")]
    VocabSizeOverflow {
        /// The vocab size that exceeded the capacity.
        size: usize,
    },

    /// A special token is empty, or listed twice.
    #[error("invalid special token: {0:?}")]
    InvalidSpecialToken(String),

    /// A pre-tokenization pattern failed to compile or to match.
    #[error("regex error: {0}")]
    Regex(#[from] ErrorWrapper),

    /// The corpus could not be opened.
    #[error("failed to open corpus {path:?}: {source}")]
    CorpusOpen {
        /// The corpus path.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A pre-tokenization task returned an error for its chunk.
    #[error("pre-tokenization of chunk {chunk} failed: {source}")]
    ChunkFailed {
        /// The chunk index the task was assigned.
        chunk: usize,

        /// The error the task returned.
        #[source]
        source: Box<PairsmithError>,
    },

    /// The pre-tokenization thread pool could not be built.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A pre-tokenization worker terminated abnormally.
    #[error("pre-tokenization worker for chunk {chunk} failed: {reason}")]
    WorkerFailed {
        /// The chunk index the worker was assigned.
        chunk: usize,

        /// A description of the failure.
        reason: String,
    },

    /// Fewer worker results were delivered than workers were started.
    #[error("incomplete aggregation: expected {expected} chunk results, received {received}")]
    IncompleteAggregation {
        /// The number of workers started.
        expected: usize,

        /// The number of results drained.
        received: usize,
    },

    /// The span and count tables handed to the merge trainer differ in length.
    #[error("span table has {spans} entries, but count table has {counts}")]
    SpanCountMismatch {
        /// The number of spans.
        spans: usize,

        /// The number of counts.
        counts: usize,
    },
}

impl PairsmithError {
    /// The pipeline phase this error aborted.
    pub fn phase(&self) -> TrainingPhase {
        use PairsmithError::*;
        match self {
            VocabSizeTooSmall { .. } | VocabSizeOverflow { .. } | InvalidSpecialToken(_) => {
                TrainingPhase::Configuration
            }
            Regex(_) => TrainingPhase::Configuration,
            CorpusOpen { .. } | Io(_) => TrainingPhase::Chunking,
            ChunkFailed { .. }
            | ThreadPool(_)
            | WorkerFailed { .. }
            | IncompleteAggregation { .. } => TrainingPhase::PreTokenization,
            SpanCountMismatch { .. } => TrainingPhase::Merging,
        }
    }
}

/// Result type for pairsmith operations.
pub type PSResult<T> = core::result::Result<T, PairsmithError>;
