//! Tagged training sentences.

use crate::error::{Result, TaggerError};
use crate::tags::PosTag;

/// A sentence paired position by position with its gold tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSentence {
    words: Vec<String>,
    tags: Vec<PosTag>,
}

impl TaggedSentence {
    /// Pair words with tags.
    ///
    /// Fails with [`TaggerError::ShapeMismatch`] when the sentence is empty or
    /// the two sequences differ in length.
    pub fn new(words: Vec<String>, tags: Vec<PosTag>) -> Result<Self> {
        if words.is_empty() {
            return Err(TaggerError::ShapeMismatch("sentence is empty".into()));
        }
        if words.len() != tags.len() {
            return Err(TaggerError::ShapeMismatch(format!(
                "sentence has {} words but {} tags",
                words.len(),
                tags.len()
            )));
        }
        Ok(Self { words, tags })
    }

    /// Split `text` on whitespace and pair it with tag labels.
    ///
    /// # Examples
    /// ```
    /// use charpos_core::TaggedSentence;
    ///
    /// let sentence = TaggedSentence::parse("Everybody read", &["NN", "V"]).unwrap();
    /// assert_eq!(sentence.len(), 2);
    /// ```
    pub fn parse<S: AsRef<str>>(text: &str, labels: &[S]) -> Result<Self> {
        let words = text.split_whitespace().map(str::to_string).collect();
        let tags = labels
            .iter()
            .map(|label| label.as_ref().parse())
            .collect::<Result<Vec<PosTag>>>()?;
        Self::new(words, tags)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn tags(&self) -> &[PosTag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false for a constructed sentence.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
