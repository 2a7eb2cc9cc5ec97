//! # Charpos Trainer
//!
//! Configuration, training loop and evaluation report for the
//! character-augmented LSTM tagger in `charpos-core`.

pub mod config;
pub mod report;
pub mod trainer;

pub use config::{SentenceRecord, TrainingConfig, default_corpus};
pub use report::ScoreReport;
pub use trainer::{Trainer, TrainingOutcome, run_training};
