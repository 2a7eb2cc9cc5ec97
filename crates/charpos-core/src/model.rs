//! # Character-Augmented LSTM Tagger
//!
//! Hierarchical char → word → tag sequence model. Each word is read character
//! by character by a small LSTM whose final hidden output becomes the word's
//! character representation. That representation is concatenated with the
//! word embedding and fed to a sentence-level LSTM; a linear layer followed by
//! log-softmax turns each position's output into tag log-probabilities.
//!
//! Recurrent state is never stored on the model: it is passed into
//! [`CharLstmTagger::forward`] and the updated state is handed back.

use candle_core::{D, Tensor};
use candle_nn::rnn::LSTMState;
use candle_nn::{Embedding, LSTM, LSTMConfig, Linear, Module, RNN, VarBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggerError};
use crate::init::ParamInit;
use crate::tags::PosTag;

/// Variable prefix of the character embedding table.
pub const CHAR_EMBEDDINGS: &str = "char_embeddings";
/// Variable prefix of the word embedding table.
pub const WORD_EMBEDDINGS: &str = "word_embeddings";
/// Variable prefix of the character-level LSTM.
pub const CHAR_LSTM: &str = "char_lstm";
/// Variable prefix of the sentence-level LSTM.
pub const SENTENCE_LSTM: &str = "sentence_lstm";
/// Variable prefix of the hidden-to-tag projection.
pub const HIDDEN_TO_TAG: &str = "hidden2tag";

/// How the character LSTM state moves between words of one sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharStateMode {
    /// The state left by one word is the starting state of the next word.
    /// It is only zeroed at the start of a sentence.
    #[default]
    CarryAcrossWords,
    /// Every word starts from a zero state.
    ResetPerWord,
}

/// Layer sizes of the tagger.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggerConfig {
    pub word_embedding_dim: usize,
    pub char_embedding_dim: usize,
    pub word_hidden_dim: usize,
    /// Hidden size of the character LSTM, i.e. the width of a word's
    /// character representation.
    pub char_rep_dim: usize,
    pub word_vocab_size: usize,
    /// Includes the padding entry.
    pub char_vocab_size: usize,
    pub tagset_size: usize,
    pub char_state_mode: CharStateMode,
}

impl TaggerConfig {
    /// Sizes used by the built-in example, for the given vocabulary sizes.
    pub fn with_vocab_sizes(word_vocab_size: usize, char_vocab_size: usize) -> Self {
        Self {
            word_embedding_dim: 6,
            char_embedding_dim: 9,
            word_hidden_dim: 6,
            char_rep_dim: 3,
            word_vocab_size,
            char_vocab_size,
            tagset_size: PosTag::NUM_TAGS,
            char_state_mode: CharStateMode::default(),
        }
    }

    /// Width of the per-word feature vector fed to the sentence LSTM.
    pub fn augmented_dim(&self) -> usize {
        self.word_embedding_dim + self.char_rep_dim
    }

    /// Initialisation for a variable created by [`CharLstmTagger::new`].
    ///
    /// Embeddings are drawn from N(0, 1); recurrent weights from
    /// U(-1/sqrt(hidden), 1/sqrt(hidden)); the projection from
    /// U(-1/sqrt(in), 1/sqrt(in)).
    pub fn param_init(&self, name: &str) -> Option<ParamInit> {
        let prefix = name.split('.').next().unwrap_or(name);
        match prefix {
            CHAR_EMBEDDINGS | WORD_EMBEDDINGS => Some(ParamInit::StandardNormal),
            CHAR_LSTM => Some(ParamInit::uniform_fan(self.char_rep_dim)),
            SENTENCE_LSTM | HIDDEN_TO_TAG => Some(ParamInit::uniform_fan(self.word_hidden_dim)),
            _ => None,
        }
    }
}

/// Recurrent state of both LSTMs.
#[derive(Debug, Clone)]
pub struct TaggerState {
    /// Character-level state, shape (1, char_rep_dim) for `h` and `c`.
    pub word: LSTMState,
    /// Sentence-level state, shape (1, word_hidden_dim) for `h` and `c`.
    pub sentence: LSTMState,
}

/// Character-augmented LSTM part-of-speech tagger.
pub struct CharLstmTagger {
    char_embeddings: Embedding,
    word_embeddings: Embedding,
    char_lstm: LSTM,
    sentence_lstm: LSTM,
    hidden2tag: Linear,
    config: TaggerConfig,
}

impl CharLstmTagger {
    /// Create every parameter group under its own prefix of `vb`.
    pub fn new(config: TaggerConfig, vb: VarBuilder) -> Result<Self> {
        let char_embeddings = candle_nn::embedding(
            config.char_vocab_size,
            config.char_embedding_dim,
            vb.pp(CHAR_EMBEDDINGS),
        )?;
        let word_embeddings = candle_nn::embedding(
            config.word_vocab_size,
            config.word_embedding_dim,
            vb.pp(WORD_EMBEDDINGS),
        )?;
        let char_lstm = candle_nn::lstm(
            config.char_embedding_dim,
            config.char_rep_dim,
            LSTMConfig::default(),
            vb.pp(CHAR_LSTM),
        )?;
        let sentence_lstm = candle_nn::lstm(
            config.augmented_dim(),
            config.word_hidden_dim,
            LSTMConfig::default(),
            vb.pp(SENTENCE_LSTM),
        )?;
        let hidden2tag = candle_nn::linear(
            config.word_hidden_dim,
            config.tagset_size,
            vb.pp(HIDDEN_TO_TAG),
        )?;

        Ok(Self {
            char_embeddings,
            word_embeddings,
            char_lstm,
            sentence_lstm,
            hidden2tag,
            config,
        })
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Zero state for both recurrences.
    pub fn init_state(&self) -> Result<TaggerState> {
        Ok(TaggerState {
            word: self.char_lstm.zero_state(1)?,
            sentence: self.sentence_lstm.zero_state(1)?,
        })
    }

    /// Score one sentence.
    ///
    /// # Arguments
    /// * `word_chars` - One 1-D character index tensor per word, in sentence order
    /// * `sentence` - 1-D word index tensor with one entry per word
    /// * `state` - Starting recurrent state, usually [`Self::init_state`]
    ///
    /// # Returns
    /// A `(sentence_len, tagset_size)` matrix of log-probabilities and the
    /// recurrent state after the last word.
    pub fn forward(
        &self,
        word_chars: &[Tensor],
        sentence: &Tensor,
        state: TaggerState,
    ) -> Result<(Tensor, TaggerState)> {
        let seq_len = sentence.dims1()?;
        if seq_len == 0 {
            return Err(TaggerError::ShapeMismatch("sentence is empty".into()));
        }
        if word_chars.len() != seq_len {
            return Err(TaggerError::ShapeMismatch(format!(
                "sentence has {} words but {} character sequences",
                seq_len,
                word_chars.len()
            )));
        }

        let TaggerState {
            word: mut word_state,
            sentence: sentence_state,
        } = state;

        let mut char_reps = Vec::with_capacity(seq_len);
        for (position, chars) in word_chars.iter().enumerate() {
            if chars.dims1()? == 0 {
                return Err(TaggerError::ShapeMismatch(format!(
                    "word at position {position} has no characters"
                )));
            }
            if self.config.char_state_mode == CharStateMode::ResetPerWord {
                word_state = self.char_lstm.zero_state(1)?;
            }

            let char_embeds = self.char_embeddings.forward(chars)?.unsqueeze(0)?;
            word_state = self
                .char_lstm
                .seq_init(&char_embeds, &word_state)?
                .pop()
                .ok_or_else(|| TaggerError::ShapeMismatch("empty character sequence".into()))?;
            char_reps.push(word_state.h().clone());
        }

        // (seq_len, char_rep_dim)
        let char_reps = Tensor::cat(&char_reps, 0)?;
        // (seq_len, word_embedding_dim)
        let word_embeds = self.word_embeddings.forward(sentence)?;
        let augmented = Tensor::cat(&[&word_embeds, &char_reps], 1)?;

        let mut sentence_states = self
            .sentence_lstm
            .seq_init(&augmented.unsqueeze(0)?, &sentence_state)?;
        let hidden: Vec<Tensor> = sentence_states.iter().map(|s| s.h().clone()).collect();
        let hidden = Tensor::cat(&hidden, 0)?;
        let sentence_state = sentence_states
            .pop()
            .ok_or_else(|| TaggerError::ShapeMismatch("sentence is empty".into()))?;

        let tag_space = self.hidden2tag.forward(&hidden)?;
        let tag_scores = candle_nn::ops::log_softmax(&tag_space, D::Minus1)?;

        Ok((
            tag_scores,
            TaggerState {
                word: word_state,
                sentence: sentence_state,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_char_sequences, encode_word_sequence};
    use crate::init::reinitialize;
    use crate::sentence::TaggedSentence;
    use crate::vocab::{CharVocab, WordVocab, build_vocabularies};
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    struct Fixture {
        model: CharLstmTagger,
        words: WordVocab,
        chars: CharVocab,
        _varmap: VarMap,
    }

    fn fixture(mode: CharStateMode) -> Fixture {
        let corpus = vec![
            TaggedSentence::parse(
                "The dog happily ate the apple",
                &["DET", "NN", "ADV", "V", "DET", "NN"],
            )
            .unwrap(),
        ];
        let (words, chars) = build_vocabularies(&corpus);
        let mut config = TaggerConfig::with_vocab_sizes(words.len(), chars.len());
        config.char_state_mode = mode;

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let model = CharLstmTagger::new(config.clone(), vb).unwrap();
        reinitialize(&varmap, 42, |name| config.param_init(name)).unwrap();

        Fixture {
            model,
            words,
            chars,
            _varmap: varmap,
        }
    }

    fn score(f: &Fixture, text: &str) -> Result<Tensor> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let chars = encode_char_sequences(&tokens, &f.chars, &Device::Cpu)?;
        let words = encode_word_sequence(&tokens, &f.words, &Device::Cpu)?;
        let (scores, _) = f.model.forward(&chars, &words, f.model.init_state()?)?;
        Ok(scores)
    }

    #[test]
    fn test_output_shape_and_log_softmax() {
        let f = fixture(CharStateMode::CarryAcrossWords);
        let scores = score(&f, "The dog happily ate the apple").unwrap();
        assert_eq!(scores.dims(), &[6, PosTag::NUM_TAGS]);

        let row_sums: Vec<f32> = scores.exp().unwrap().sum(1).unwrap().to_vec1().unwrap();
        for sum in row_sums {
            assert!((sum - 1.0).abs() < 1e-5, "row sums to {sum}");
        }
    }

    #[test]
    fn test_single_word_sentence() {
        let f = fixture(CharStateMode::CarryAcrossWords);
        let scores = score(&f, "dog").unwrap();
        assert_eq!(scores.dims(), &[1, PosTag::NUM_TAGS]);
    }

    #[test]
    fn test_empty_sentence_rejected() {
        let f = fixture(CharStateMode::CarryAcrossWords);
        let err = score(&f, "").unwrap_err();
        assert!(matches!(err, TaggerError::ShapeMismatch(_)));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let f = fixture(CharStateMode::CarryAcrossWords);
        let chars = encode_char_sequences(&["The"], &f.chars, &Device::Cpu).unwrap();
        let words = encode_word_sequence(&["The", "dog"], &f.words, &Device::Cpu).unwrap();
        let err = f
            .model
            .forward(&chars, &words, f.model.init_state().unwrap())
            .unwrap_err();
        assert!(matches!(err, TaggerError::ShapeMismatch(_)));
    }

    #[test]
    fn test_state_returned_with_expected_shapes() {
        let f = fixture(CharStateMode::CarryAcrossWords);
        let tokens = ["The", "dog"];
        let chars = encode_char_sequences(&tokens, &f.chars, &Device::Cpu).unwrap();
        let words = encode_word_sequence(&tokens, &f.words, &Device::Cpu).unwrap();
        let (_, state) = f
            .model
            .forward(&chars, &words, f.model.init_state().unwrap())
            .unwrap();
        assert_eq!(state.word.h().dims(), &[1, 3]);
        assert_eq!(state.sentence.c().dims(), &[1, 6]);
    }

    #[test]
    fn test_returned_state_threads_into_next_call() {
        let f = fixture(CharStateMode::CarryAcrossWords);
        let tokens = ["dog"];
        let chars = encode_char_sequences(&tokens, &f.chars, &Device::Cpu).unwrap();
        let words = encode_word_sequence(&tokens, &f.words, &Device::Cpu).unwrap();

        let fresh = f.model.init_state().unwrap();
        let (first, carried) = f.model.forward(&chars, &words, fresh.clone()).unwrap();
        let (again, _) = f.model.forward(&chars, &words, fresh).unwrap();
        let (second, _) = f.model.forward(&chars, &words, carried).unwrap();

        let first = first.to_vec2::<f32>().unwrap();
        assert_eq!(first, again.to_vec2::<f32>().unwrap());
        assert_ne!(first, second.to_vec2::<f32>().unwrap());
    }

    #[test]
    fn test_empty_word_rejected() {
        let f = fixture(CharStateMode::CarryAcrossWords);
        let chars = vec![Tensor::from_vec(Vec::<u32>::new(), 0, &Device::Cpu).unwrap()];
        let words = encode_word_sequence(&["dog"], &f.words, &Device::Cpu).unwrap();
        let err = f
            .model
            .forward(&chars, &words, f.model.init_state().unwrap())
            .unwrap_err();
        assert!(matches!(err, TaggerError::ShapeMismatch(_)));
        assert!(format!("{:?}", f.model.init_state().unwrap()).contains("TaggerState"));
    }

    #[test]
    fn test_char_state_carries_across_words() {
        // Both fixtures share parameters. Only the second word's char state differs.
        let carry = fixture(CharStateMode::CarryAcrossWords);
        let reset = fixture(CharStateMode::ResetPerWord);

        let carry_pair = score(&carry, "The dog").unwrap().to_vec2::<f32>().unwrap();
        let reset_pair = score(&reset, "The dog").unwrap().to_vec2::<f32>().unwrap();

        assert_eq!(carry_pair[0], reset_pair[0]);
        assert_ne!(carry_pair[1], reset_pair[1]);
    }

    #[test]
    fn test_param_init_covers_all_variables() {
        let config = TaggerConfig::with_vocab_sizes(4, 5);
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let _model = CharLstmTagger::new(config.clone(), vb).unwrap();

        let vars = varmap.data().lock().unwrap();
        assert!(!vars.is_empty());
        for name in vars.keys() {
            assert!(config.param_init(name).is_some(), "no init for {name}");
        }
    }
}
