//! # Pre-Tokenization
//!
//! Pre-tokenization happens in three stages:
//! * decode the raw corpus bytes, per a [`DecodePolicy`].
//! * split the text into documents on special tokens, with a [`SpecialSplitter`].
//! * split each document into pre-token spans, with a [`PreTokenizer`].
//!
//! Merges are only ever learned within a single pre-token.

pub mod chunk_pretokenizer;
pub mod lossy_decode;
pub mod patterns;
pub mod pre_tokenizer;
pub mod special_splitter;

#[doc(inline)]
pub use chunk_pretokenizer::{
    PreTokenizeConfig,
    pretokenize_bytes,
    pretokenize_chunk,
    pretokenize_text,
};
#[doc(inline)]
pub use lossy_decode::{DecodePolicy, decode_lossy};
#[doc(inline)]
pub use patterns::GPT2_PRETOKENIZE_PATTERN;
#[doc(inline)]
pub use pre_tokenizer::{PreTokenizer, RegexPreTokenizer};
#[doc(inline)]
pub use special_splitter::SpecialSplitter;
