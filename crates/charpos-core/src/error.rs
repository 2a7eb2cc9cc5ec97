use thiserror::Error;

/// Errors that can occur while encoding input or running the tagger.
#[derive(Debug, Error)]
pub enum TaggerError {
    /// A word was not seen while the vocabulary was built.
    #[error("word {token:?} is not in the vocabulary")]
    UnknownToken {
        /// The word that failed the lookup.
        token: String,
    },

    /// A character was not seen while the vocabulary was built.
    #[error("character {ch:?} is not in the vocabulary")]
    UnknownChar {
        /// The character that failed the lookup.
        ch: char,
    },

    /// A tag label outside the closed tag set.
    #[error("unknown tag label: {label:?}")]
    UnknownTag {
        /// The label that failed the lookup.
        label: String,
    },

    /// A score column that does not correspond to any tag.
    #[error("tag index {0} is out of range")]
    UnknownTagIndex(usize),

    /// Input sequences whose lengths do not line up, or an empty sentence/word.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Candle ML framework error.
    #[error("tensor error: {0}")]
    Candle(#[from] candle_core::Error),
}

/// Result type alias for tagger operations.
pub type Result<T> = std::result::Result<T, TaggerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = TaggerError::UnknownToken {
            token: "zebra".into(),
        };
        assert!(err.to_string().contains("zebra"));

        let err = TaggerError::UnknownChar { ch: 'z' };
        assert_eq!(err.to_string(), "character 'z' is not in the vocabulary");

        let err = TaggerError::ShapeMismatch("sentence is empty".into());
        assert_eq!(err.to_string(), "shape mismatch: sentence is empty");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TaggerError>();
    }
}
