//! # Vocabularies
//!
//! Word and character index maps built once from the training corpus.
//! Indices are assigned in first-seen order and never change afterwards.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, TaggerError};
use crate::sentence::TaggedSentence;

/// Symbol printed for the reserved padding entry of the character vocabulary.
pub const PAD: &str = "PAD";

/// Index reserved for padding; never assigned to an observed character.
pub const PAD_INDEX: u32 = 0;

/// Word to index mapping. Case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct WordVocab {
    word_to_idx: HashMap<String, u32>,
    idx_to_word: Vec<String>,
}

impl WordVocab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `word` if unseen and return its index.
    fn insert(&mut self, word: &str) -> u32 {
        if let Some(&idx) = self.word_to_idx.get(word) {
            return idx;
        }
        let idx = self.idx_to_word.len() as u32;
        self.word_to_idx.insert(word.to_string(), idx);
        self.idx_to_word.push(word.to_string());
        idx
    }

    pub fn index_of(&self, word: &str) -> Result<u32> {
        self.word_to_idx
            .get(word)
            .copied()
            .ok_or_else(|| TaggerError::UnknownToken {
                token: word.to_string(),
            })
    }

    pub fn word_at(&self, idx: u32) -> Option<&str> {
        self.idx_to_word.get(idx as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.idx_to_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx_to_word.is_empty()
    }

    /// Entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.idx_to_word
            .iter()
            .enumerate()
            .map(|(i, w)| (w.as_str(), i as u32))
    }
}

/// Character to index mapping with index 0 reserved for padding.
#[derive(Debug, Clone)]
pub struct CharVocab {
    char_to_idx: HashMap<char, u32>,
    // Observed characters; the character at position i has index i + 1.
    idx_to_char: Vec<char>,
}

impl CharVocab {
    pub fn new() -> Self {
        Self {
            char_to_idx: HashMap::new(),
            idx_to_char: Vec::new(),
        }
    }

    fn insert(&mut self, ch: char) -> u32 {
        if let Some(&idx) = self.char_to_idx.get(&ch) {
            return idx;
        }
        self.idx_to_char.push(ch);
        let idx = self.idx_to_char.len() as u32;
        self.char_to_idx.insert(ch, idx);
        idx
    }

    pub fn index_of(&self, ch: char) -> Result<u32> {
        self.char_to_idx
            .get(&ch)
            .copied()
            .ok_or(TaggerError::UnknownChar { ch })
    }

    /// Reverse lookup. Returns `None` for the padding index and unknown indices.
    pub fn char_at(&self, idx: u32) -> Option<char> {
        if idx == PAD_INDEX {
            return None;
        }
        self.idx_to_char.get(idx as usize - 1).copied()
    }

    /// Number of entries including the padding entry.
    pub fn len(&self) -> usize {
        self.idx_to_char.len() + 1
    }

    /// Never true: the padding entry is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Observed characters in index order (padding excluded).
    pub fn iter(&self) -> impl Iterator<Item = (char, u32)> {
        self.idx_to_char
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i as u32 + 1))
    }
}

impl Default for CharVocab {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan the corpus once, in sentence and word order, and build both vocabularies.
pub fn build_vocabularies(corpus: &[TaggedSentence]) -> (WordVocab, CharVocab) {
    let mut words = WordVocab::new();
    let mut chars = CharVocab::new();

    for sentence in corpus {
        for word in sentence.words() {
            for ch in word.chars() {
                chars.insert(ch);
            }
            words.insert(word);
        }
    }

    tracing::debug!(
        words = words.len(),
        chars = chars.len(),
        "built vocabularies"
    );
    (words, chars)
}

impl fmt::Display for WordVocab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (word, idx)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{word:?}: {idx}")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for CharVocab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{PAD:?}: {PAD_INDEX}")?;
        for (ch, idx) in self.iter() {
            write!(f, ", {:?}: {idx}", ch.to_string())?;
        }
        f.write_str("}")
    }
}
