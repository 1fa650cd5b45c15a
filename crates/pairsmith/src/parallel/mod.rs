//! # Parallel Pre-Tokenization
//!
//! Chunks are pre-tokenized on a `rayon` thread pool; each worker reads its
//! own byte range and delivers exactly one local frequency table through a
//! channel. The tables are summed into the corpus-wide table.

pub mod aggregate;
pub mod threads;
pub mod worker_pool;

#[doc(inline)]
pub use aggregate::aggregate_span_counts;
#[doc(inline)]
pub use threads::est_max_parallelism;
#[doc(inline)]
pub use worker_pool::pretokenize_corpus;
