//! Training configuration: corpus and hyperparameters.

use std::path::Path;

use anyhow::{Context, ensure};
use charpos_core::{CharStateMode, TaggedSentence, TaggerConfig};
use serde::{Deserialize, Serialize};

/// One corpus entry as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// Whitespace-separated words.
    pub text: String,
    /// One tag label per word.
    pub tags: Vec<String>,
}

impl SentenceRecord {
    fn new(text: &str, tags: &[&str]) -> Self {
        Self {
            text: text.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Everything a training run depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub corpus: Vec<SentenceRecord>,
    pub word_embedding_dim: usize,
    pub char_embedding_dim: usize,
    pub word_hidden_dim: usize,
    pub char_rep_dim: usize,
    pub learning_rate: f64,
    pub epochs: usize,
    /// Seed for parameter initialisation.
    pub seed: u64,
    pub char_state_mode: CharStateMode,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            corpus: default_corpus(),
            word_embedding_dim: 6,
            char_embedding_dim: 9,
            word_hidden_dim: 6,
            char_rep_dim: 3,
            learning_rate: 0.1,
            epochs: 300,
            seed: 1,
            char_state_mode: CharStateMode::CarryAcrossWords,
        }
    }
}

/// The two example sentences the tagger is trained on by default.
pub fn default_corpus() -> Vec<SentenceRecord> {
    vec![
        SentenceRecord::new(
            "The dog happily ate the apple",
            &["DET", "NN", "ADV", "V", "DET", "NN"],
        ),
        SentenceRecord::new(
            "Everybody read that book silently",
            &["NN", "V", "DET", "NN", "ADV"],
        ),
    ]
}

impl TrainingConfig {
    /// Load a JSON configuration. Missing fields take their default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Check hyperparameters. Corpus entries are checked by [`Self::sentences`].
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.corpus.is_empty(), "corpus is empty");
        ensure!(self.epochs >= 1, "epochs must be at least 1");
        ensure!(
            self.learning_rate.is_finite() && self.learning_rate > 0.0,
            "learning rate must be positive, got {}",
            self.learning_rate
        );
        for (name, dim) in [
            ("word_embedding_dim", self.word_embedding_dim),
            ("char_embedding_dim", self.char_embedding_dim),
            ("word_hidden_dim", self.word_hidden_dim),
            ("char_rep_dim", self.char_rep_dim),
        ] {
            ensure!(dim > 0, "{name} must be positive");
        }
        Ok(())
    }

    /// Parse the corpus into tagged sentences.
    pub fn sentences(&self) -> anyhow::Result<Vec<TaggedSentence>> {
        self.corpus
            .iter()
            .enumerate()
            .map(|(i, record)| {
                TaggedSentence::parse(&record.text, &record.tags)
                    .with_context(|| format!("invalid corpus entry {i}: {:?}", record.text))
            })
            .collect()
    }

    /// Model sizes for the given vocabulary sizes.
    pub fn tagger_config(&self, word_vocab_size: usize, char_vocab_size: usize) -> TaggerConfig {
        TaggerConfig {
            word_embedding_dim: self.word_embedding_dim,
            char_embedding_dim: self.char_embedding_dim,
            word_hidden_dim: self.word_hidden_dim,
            char_rep_dim: self.char_rep_dim,
            char_state_mode: self.char_state_mode,
            ..TaggerConfig::with_vocab_sizes(word_vocab_size, char_vocab_size)
        }
    }
}
