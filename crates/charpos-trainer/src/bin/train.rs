//! Train the tagger on the built-in corpus and print the scores it assigns to
//! the first sentence.

use std::path::PathBuf;

use anyhow::Result;
use charpos_core::CharStateMode;
use charpos_trainer::{Trainer, TrainingConfig};
use clap::Parser;
use tracing::info;

/// CLI arguments
#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Train the character-augmented LSTM part-of-speech tagger")]
#[command(version)]
struct Cli {
    /// JSON training configuration; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of passes over the corpus
    #[arg(short, long)]
    epochs: Option<usize>,

    /// SGD learning rate
    #[arg(short, long)]
    learning_rate: Option<f64>,

    /// Seed for parameter initialisation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Start every word's character LSTM from a zero state
    #[arg(long)]
    reset_char_state: bool,
}

impl Cli {
    fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::from_file(path)?,
            None => TrainingConfig::default(),
        };
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(lr) = self.learning_rate {
            config.learning_rate = lr;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.reset_char_state {
            config.char_state_mode = CharStateMode::ResetPerWord;
        }
        Ok(config)
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.training_config()?;
    let trainer = Trainer::new(config)?;

    println!("{}", trainer.word_vocab());
    println!("{}", trainer.char_vocab());

    let outcome = trainer.run()?;
    if let Some(last) = outcome.epoch_losses.last() {
        info!(final_loss = *last, "training finished");
    }
    println!("{}", outcome.report);

    Ok(())
}

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Training failed: {e:#}");
        std::process::exit(1);
    }
}
