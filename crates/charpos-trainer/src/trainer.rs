//! Training loop for the character-augmented LSTM tagger.

use anyhow::Context;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Optimizer, SGD, VarBuilder, VarMap};
use charpos_core::{
    CharLstmTagger, CharVocab, TaggedSentence, TaggerError, WordVocab, build_vocabularies,
    encode_char_sequences, encode_tags, encode_word_sequence, reinitialize,
};
use tracing::{debug, info, warn};

use crate::config::TrainingConfig;
use crate::report::ScoreReport;

/// A corpus sentence turned into index tensors once, up front.
struct EncodedExample {
    chars: Vec<Tensor>,
    words: Tensor,
    targets: Tensor,
}

pub struct Trainer {
    config: TrainingConfig,
    corpus: Vec<TaggedSentence>,
    examples: Vec<EncodedExample>,
    word_vocab: WordVocab,
    char_vocab: CharVocab,
    varmap: VarMap,
    model: CharLstmTagger,
    optimizer: SGD,
    device: Device,
}

impl Trainer {
    /// Build vocabularies from the configured corpus, create the model with
    /// seeded parameters and set up plain SGD.
    pub fn new(config: TrainingConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let corpus = config.sentences()?;
        let device = Device::Cpu;

        let (word_vocab, char_vocab) = build_vocabularies(&corpus);
        let tagger_config = config.tagger_config(word_vocab.len(), char_vocab.len());

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let model = CharLstmTagger::new(tagger_config.clone(), vb)
            .context("failed to build tagger")?;
        let num_params = reinitialize(&varmap, config.seed, |name| tagger_config.param_init(name))?;
        info!(num_params, seed = config.seed, "initialised tagger parameters");

        let optimizer = SGD::new(varmap.all_vars(), config.learning_rate)?;

        let examples = corpus
            .iter()
            .map(|sentence| -> charpos_core::Result<EncodedExample> {
                Ok(EncodedExample {
                    chars: encode_char_sequences(sentence.words(), &char_vocab, &device)?,
                    words: encode_word_sequence(sentence.words(), &word_vocab, &device)?,
                    targets: encode_tags(sentence.tags(), &device)?,
                })
            })
            .collect::<charpos_core::Result<Vec<_>>>()?;

        Ok(Self {
            config,
            corpus,
            examples,
            word_vocab,
            char_vocab,
            varmap,
            model,
            optimizer,
            device,
        })
    }

    pub fn word_vocab(&self) -> &WordVocab {
        &self.word_vocab
    }

    pub fn char_vocab(&self) -> &CharVocab {
        &self.char_vocab
    }

    pub fn corpus(&self) -> &[TaggedSentence] {
        &self.corpus
    }

    pub fn model(&self) -> &CharLstmTagger {
        &self.model
    }

    /// One forward/backward/update on a single corpus sentence, starting from a
    /// zero recurrent state. Returns the loss before the update.
    fn train_example(&mut self, idx: usize) -> anyhow::Result<f32> {
        let example = &self.examples[idx];
        let state = self.model.init_state()?;
        let (scores, _) = self.model.forward(&example.chars, &example.words, state)?;
        let loss = candle_nn::loss::nll(&scores, &example.targets)?;
        self.optimizer.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }

    /// Run the configured number of epochs over the corpus, in corpus order.
    ///
    /// Returns the mean loss of every epoch.
    pub fn train(&mut self) -> anyhow::Result<Vec<f32>> {
        let epochs = self.config.epochs;
        info!(
            epochs,
            examples = self.examples.len(),
            learning_rate = self.config.learning_rate,
            "starting training"
        );

        let mut epoch_losses = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            let mut total = 0.0f32;
            for idx in 0..self.examples.len() {
                let loss = self
                    .train_example(idx)
                    .with_context(|| format!("epoch {epoch}, example {idx}"))?;
                if !loss.is_finite() {
                    warn!(epoch, idx, loss, "non-finite loss");
                }
                debug!(epoch, idx, loss, "example done");
                total += loss;
            }
            let mean_loss = total / self.examples.len() as f32;
            info!(epoch, mean_loss, "epoch complete");
            epoch_losses.push(mean_loss);
        }

        Ok(epoch_losses)
    }

    /// Log-probability matrix for `words` from a fresh recurrent state.
    pub fn score<S: AsRef<str>>(&self, words: &[S]) -> anyhow::Result<Tensor> {
        let chars = encode_char_sequences(words, &self.char_vocab, &self.device)?;
        let ids = encode_word_sequence(words, &self.word_vocab, &self.device)?;
        let (scores, _) = self.model.forward(&chars, &ids, self.model.init_state()?)?;
        Ok(scores)
    }

    /// Score a corpus sentence and compare against its gold tags.
    pub fn evaluate(&self, sentence: &TaggedSentence) -> anyhow::Result<ScoreReport> {
        let scores = self.score(sentence.words())?;
        Ok(ScoreReport::new(sentence, &scores)?)
    }

    /// Train for the configured number of epochs, then evaluate the first
    /// corpus sentence.
    pub fn run(mut self) -> anyhow::Result<TrainingOutcome> {
        let epoch_losses = self.train()?;

        let first = self.corpus.first().context("corpus is empty")?;
        let report = self.evaluate(first)?;
        info!(accuracy = report.accuracy(), "evaluated first sentence");

        Ok(TrainingOutcome {
            trainer: self,
            epoch_losses,
            report,
        })
    }
}

/// Result of a complete run.
pub struct TrainingOutcome {
    pub trainer: Trainer,
    pub epoch_losses: Vec<f32>,
    /// Evaluation of the first corpus sentence after training.
    pub report: ScoreReport,
}

/// Train on the configured corpus, then evaluate the first sentence.
pub fn run_training(config: TrainingConfig) -> anyhow::Result<TrainingOutcome> {
    Trainer::new(config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;

    fn short_config(epochs: usize) -> TrainingConfig {
        TrainingConfig {
            epochs,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_trainer_builds_vocabularies() {
        let trainer = Trainer::new(short_config(1)).unwrap();
        assert_eq!(trainer.word_vocab().len(), 11);
        assert_eq!(trainer.char_vocab().index_of('T').unwrap(), 1);
        assert_eq!(trainer.model().config().augmented_dim(), 9);
        // 2 embedding tables, 2 LSTMs with 4 tensors each, 1 linear layer.
        assert_eq!(trainer.varmap.all_vars().len(), 12);
    }

    #[test]
    fn test_one_loss_per_epoch() {
        let mut trainer = Trainer::new(short_config(3)).unwrap();
        let losses = trainer.train().unwrap();
        assert_eq!(losses.len(), 3);
        assert!(losses.iter().all(|l| l.is_finite() && *l > 0.0));
    }

    #[test]
    fn test_loss_decreases() {
        let mut trainer = Trainer::new(short_config(40)).unwrap();
        let losses = trainer.train().unwrap();
        assert!(losses[39] < losses[0], "{} !< {}", losses[39], losses[0]);
    }

    #[test]
    fn test_score_rejects_unknown_word() {
        let trainer = Trainer::new(short_config(1)).unwrap();
        // Every character of "hat" is in the corpus, the word itself is not.
        let err = trainer.score(&["The", "hat"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TaggerError>(),
            Some(TaggerError::UnknownToken { token }) if token == "hat"
        ));
    }

    #[test]
    fn test_score_rejects_unknown_char() {
        let trainer = Trainer::new(short_config(1)).unwrap();
        let err = trainer.score(&["cat"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TaggerError>(),
            Some(TaggerError::UnknownChar { ch: 'c' })
        ));
    }

    #[test]
    fn test_run_reports_first_sentence() {
        let trainer = Trainer::new(short_config(2)).unwrap();
        let outcome = trainer.run().unwrap();
        assert_eq!(outcome.epoch_losses.len(), 2);
        assert_eq!(outcome.report.words, outcome.trainer.corpus()[0].words());
        assert_eq!(outcome.report.gold, outcome.trainer.corpus()[0].tags());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrainingConfig {
            learning_rate: -1.0,
            ..TrainingConfig::default()
        };
        assert!(Trainer::new(config).is_err());
    }
}
