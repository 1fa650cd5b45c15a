//! # Vocabulary Training
//!
//! Support for training byte-level BPE vocabularies.
//!
//! Training proceeds in two phases:
//! * counting - the corpus is pre-tokenized (in parallel) into a frequency
//!   table of distinct pre-tokens; see [`crate::parallel`].
//! * merging - a single-threaded [`MergeTrainer`] repeatedly merges the most
//!   frequent adjacent pair, until the vocabulary is full or no pairs remain.
//!
//! Expect the merge phase to be dominated by the size of the distinct
//! pre-token table, not the corpus; the pair index only ever visits the
//! spans which contain the merged pair.
//!
//! ```rust,no_run
//! use pairsmith::training::TrainerOptions;
//!
//! // We can pick any unsigned integer type > vocab_size;
//! // See [`pairsmith::TokenType`].
//! type T = u32;
//! type C = u64;
//!
//! let vocab = TrainerOptions::new(32_000)
//!     .with_special_tokens(["<|endoftext|>"])
//!     .with_num_chunks(Some(16))
//!     .train_path::<T, C>("data/corpus.txt")
//!     .expect("training failed");
//!
//! println!("learned {} merges", vocab.merges().len());
//! ```

pub mod utility;

mod bpe_vocab;
mod merge_trainer;
mod trainer_options;
mod training_types;

#[doc(inline)]
pub use bpe_vocab::{BpeVocab, MergeRule, U8_SIZE};
#[doc(inline)]
pub use merge_trainer::{MergeJob, MergeTrainer, validate_vocab_config};
#[doc(inline)]
pub use trainer_options::{TrainerOptions, train_bpe};
#[doc(inline)]
pub use training_types::{CountType, StringChunkType};
