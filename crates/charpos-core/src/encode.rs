//! # Sequence Encoders
//!
//! Turn words, characters and tags into `u32` index tensors ready for
//! embedding lookup or loss computation. There is no out-of-vocabulary
//! handling: an unseen symbol is an error.

use candle_core::{Device, Tensor};

use crate::error::Result;
use crate::tags::PosTag;
use crate::vocab::{CharVocab, WordVocab};

/// Encode a sequence of words as a 1-D index tensor of the same length.
pub fn encode_word_sequence<S: AsRef<str>>(
    tokens: &[S],
    vocab: &WordVocab,
    device: &Device,
) -> Result<Tensor> {
    let ids = tokens
        .iter()
        .map(|t| vocab.index_of(t.as_ref()))
        .collect::<Result<Vec<u32>>>()?;
    let len = ids.len();
    Ok(Tensor::from_vec(ids, len, device)?)
}

/// Encode every word as its own 1-D tensor of character indices, in word order.
pub fn encode_char_sequences<S: AsRef<str>>(
    words: &[S],
    vocab: &CharVocab,
    device: &Device,
) -> Result<Vec<Tensor>> {
    words
        .iter()
        .map(|word| -> Result<Tensor> {
            let ids = word
                .as_ref()
                .chars()
                .map(|c| vocab.index_of(c))
                .collect::<Result<Vec<u32>>>()?;
            let len = ids.len();
            Ok(Tensor::from_vec(ids, len, device)?)
        })
        .collect()
}

/// Encode gold tags as the 1-D target tensor expected by the NLL loss.
pub fn encode_tags(tags: &[PosTag], device: &Device) -> Result<Tensor> {
    let ids: Vec<u32> = tags.iter().map(|t| t.index() as u32).collect();
    let len = ids.len();
    Ok(Tensor::from_vec(ids, len, device)?)
}
