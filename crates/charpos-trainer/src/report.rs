//! Printable evaluation of one scored sentence.

use std::fmt;

use candle_core::Tensor;
use charpos_core::{PosTag, TaggedSentence, decode_tags};

/// Score matrix of one sentence together with decoded and gold tags.
#[derive(Debug, Clone)]
pub struct ScoreReport {
    pub words: Vec<String>,
    pub gold: Vec<PosTag>,
    pub predicted: Vec<PosTag>,
    /// Log-probabilities, one row per word, one column per tag.
    pub scores: Vec<Vec<f32>>,
}

impl ScoreReport {
    pub fn new(sentence: &TaggedSentence, scores: &Tensor) -> charpos_core::Result<Self> {
        let predicted = decode_tags(scores)?;
        let scores = scores.to_vec2::<f32>()?;
        Ok(Self {
            words: sentence.words().to_vec(),
            gold: sentence.tags().to_vec(),
            predicted,
            scores,
        })
    }

    /// Fraction of positions where the predicted tag equals the gold tag.
    pub fn accuracy(&self) -> f32 {
        if self.gold.is_empty() {
            return 0.0;
        }
        let correct = self
            .gold
            .iter()
            .zip(&self.predicted)
            .filter(|(g, p)| g == p)
            .count();
        correct as f32 / self.gold.len() as f32
    }
}

impl fmt::Display for ScoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.words.iter().map(String::len).max().unwrap_or(0).max(4);

        write!(f, "{:<width$}", "word")?;
        for tag in PosTag::all_tags() {
            write!(f, " {:>9}", tag.label())?;
        }
        writeln!(f, "  {:<4} {:<4}", "pred", "gold")?;

        for (i, word) in self.words.iter().enumerate() {
            write!(f, "{word:<width$}")?;
            for score in &self.scores[i] {
                write!(f, " {score:>9.4}")?;
            }
            writeln!(f, "  {:<4} {:<4}", self.predicted[i], self.gold[i])?;
        }

        write!(f, "accuracy: {:.2}%", self.accuracy() * 100.0)
    }
}
