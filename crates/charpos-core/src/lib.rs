//! # Charpos Core
//!
//! A character-augmented LSTM part-of-speech tagger on top of candle.
//! Provides the tag set, corpus vocabularies, sequence encoders, the
//! hierarchical char → word → tag model and greedy decoding.
//!
//! ## Quick Start
//!
//! ```rust
//! use candle_core::Device;
//! use charpos_core::{TaggedSentence, build_vocabularies, encode_word_sequence};
//!
//! let corpus = vec![TaggedSentence::parse("The dog ate", &["DET", "NN", "V"]).unwrap()];
//! let (words, chars) = build_vocabularies(&corpus);
//!
//! let ids = encode_word_sequence(corpus[0].words(), &words, &Device::Cpu).unwrap();
//! assert_eq!(ids.to_vec1::<u32>().unwrap(), vec![0, 1, 2]);
//! assert_eq!(chars.index_of('T').unwrap(), 1);
//! ```
pub mod decode;
pub mod encode;
pub mod error;
pub mod init;
pub mod model;
pub mod sentence;
pub mod tags;
pub mod vocab;

// Re-export primary API
pub use decode::{argmax_rows, decode_tags};
pub use encode::{encode_char_sequences, encode_tags, encode_word_sequence};
pub use error::{Result, TaggerError};
pub use init::{ParamInit, reinitialize};
pub use model::{CharLstmTagger, CharStateMode, TaggerConfig, TaggerState};
pub use sentence::TaggedSentence;
pub use tags::PosTag;
pub use vocab::{CharVocab, PAD, PAD_INDEX, WordVocab, build_vocabularies};
