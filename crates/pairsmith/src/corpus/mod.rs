//! # Corpus Access
//!
//! Corpora are read as raw bytes; they are split into chunks whose internal
//! boundaries always sit at the start of a delimiter (special token), so
//! that chunks can be pre-tokenized independently.

pub mod chunk_boundaries;
pub mod corpus_reader;

#[doc(inline)]
pub use chunk_boundaries::{BOUNDARY_SCAN_WINDOW, find_chunk_boundaries};
#[doc(inline)]
pub use corpus_reader::{CorpusFile, read_corpus_range};
