//! Greedy decoding of tag score matrices.

use candle_core::{D, Tensor};

use crate::error::{Result, TaggerError};
use crate::tags::PosTag;

/// Index of the highest score in every row of a `(rows, cols)` matrix.
pub fn argmax_rows(scores: &Tensor) -> Result<Vec<usize>> {
    let (_rows, cols) = scores.dims2()?;
    if cols == 0 {
        return Err(TaggerError::ShapeMismatch(
            "score matrix has no columns".into(),
        ));
    }
    let best = scores.argmax(D::Minus1)?.to_vec1::<u32>()?;
    Ok(best.into_iter().map(|i| i as usize).collect())
}

/// Best tag per position of a `(sentence_len, NUM_TAGS)` score matrix.
pub fn decode_tags(scores: &Tensor) -> Result<Vec<PosTag>> {
    argmax_rows(scores)?
        .into_iter()
        .map(|i| PosTag::from_index(i).ok_or(TaggerError::UnknownTagIndex(i)))
        .collect()
}
