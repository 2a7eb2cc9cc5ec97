//! # Part-of-Speech Tags
//!
//! The closed tag set the tagger predicts over. Tag indices are fixed and
//! double as column indices of the score matrix.

use std::fmt;
use std::str::FromStr;

use crate::error::TaggerError;

/// Grammatical category assigned to a single word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosTag {
    /// Determiner
    Det,
    /// Noun
    Nn,
    /// Verb
    V,
    /// Adverb
    Adv,
}

impl PosTag {
    /// Total number of distinct tags.
    pub const NUM_TAGS: usize = 4;

    /// Get all possible tags in index order.
    pub fn all_tags() -> &'static [PosTag] {
        &[PosTag::Det, PosTag::Nn, PosTag::V, PosTag::Adv]
    }

    /// Get the tag index for tensor operations.
    pub fn index(&self) -> usize {
        match self {
            PosTag::Det => 0,
            PosTag::Nn => 1,
            PosTag::V => 2,
            PosTag::Adv => 3,
        }
    }

    /// Get tag from index.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(PosTag::Det),
            1 => Some(PosTag::Nn),
            2 => Some(PosTag::V),
            3 => Some(PosTag::Adv),
            _ => None,
        }
    }

    /// Label used in corpora and printed reports.
    pub fn label(&self) -> &'static str {
        match self {
            PosTag::Det => "DET",
            PosTag::Nn => "NN",
            PosTag::V => "V",
            PosTag::Adv => "ADV",
        }
    }

    /// Look up a tag by its label. Labels are case-sensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all_tags().iter().copied().find(|t| t.label() == label)
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for PosTag {
    type Err = TaggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| TaggerError::UnknownTag {
            label: s.to_string(),
        })
    }
}
