//! # `pairsmith` BPE Vocabulary Trainer
//!
//! This trains byte-pair-encoding vocabularies from raw text corpora.
//!
//! Training produces a vocabulary (``{ id -> bytes }``) and an ordered list of
//! merge rules; compatible with GPT-2 style byte-level BPE tokenizers.
//!
//! The pipeline is:
//! * [`corpus`] - find chunk boundaries which never split a special token.
//! * [`pretokenize`] - split each chunk into pre-token spans, and count them.
//! * [`parallel`] - fan the chunks out over worker threads, and sum the counts.
//! * [`training`] - learn the merges with an incremental pair index.
//!
//! ## Crate Features
//!
//! #### feature: ``ahash``
//!
//! This swaps all HashMap/HashSet implementations for ``ahash``; which is a performance
//! win on many/(most?) modern CPUs.
//!
//! This is done by the ``types::CommonHash{*}`` type alias machinery.
//!
//! #### feature: ``tracing``
//!
//! This enables a number of ``tracing`` instrumentation points.
//! This is only useful for timing tracing of the library itself.
//!
//! ## Training a Vocabulary
//!
//! ```rust,no_run
//! use pairsmith::training::{BpeVocab, TrainerOptions};
//!
//! let options = TrainerOptions::new(10_000)
//!     .with_special_tokens(["<|endoftext|>"]);
//!
//! let vocab: BpeVocab<u32> = options
//!     .train_path::<u32, u64>("corpus.txt")
//!     .expect("training failed");
//!
//! for (left, right) in vocab.merges_as_bytes() {
//!     println!("{left:?} {right:?}");
//! }
//! ```
#![warn(missing_docs, unused)]

pub mod corpus;
pub mod errors;
pub mod parallel;
pub mod pretokenize;
pub mod regex;
pub mod training;
pub mod types;

#[doc(inline)]
pub use errors::{PSResult, PairsmithError, TrainingPhase};
#[doc(inline)]
pub use training::{BpeVocab, MergeRule, TrainerOptions, train_bpe};
#[doc(inline)]
pub use types::{Pair, TokenType};
