use crate::TokenIndex;
use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SeqtokError {
    #[snafu(display(
        "Vocabulary entry {position} must be the reserved token '{expected}' but found {}",
        found.as_deref().map(|f| format!("'{f}'")).unwrap_or_else(|| "nothing".to_string())
    ))]
    MissingReservedToken {
        position: usize,
        expected: &'static str,
        found: Option<String>,
    },

    #[snafu(display("Token '{token}' appears in the vocabulary at both {first} and {second}"))]
    DuplicateToken {
        token: String,
        first: TokenIndex,
        second: TokenIndex,
    },

    #[snafu(display("Vocabulary entry {position} is an empty string"))]
    EmptyToken { position: usize },

    #[snafu(display("The special token group must contain at least the padding token"))]
    MissingPaddingToken,

    #[snafu(display("Phonemized mode was requested but no phonemizer was provided"))]
    PhonemizerUnavailable,

    #[snafu(display("The vocabulary '{name}' isn't one of the built-in vocabularies"))]
    UnknownVocabulary { name: String },

    #[snafu(display("The built-in vocabulary '{name}' is not a multi-character vocabulary"))]
    NotMultiCharVocabulary { name: String },

    #[snafu(display("File I/O error on file '{}'", path.display()))]
    FileIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Invalid vocabulary configuration in '{}'", path.display()))]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("Index {index} is outside the vocabulary of {size} tokens"))]
    InvalidIndex { index: TokenIndex, size: usize },
}

impl SeqtokError {
    /// True for the errors raised while building a vocabulary or tokenizer, as opposed to errors
    /// raised while decoding.
    ///
    /// Configuration errors are never transient.  Retrying with the same inputs will fail the
    /// same way.
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, Self::InvalidIndex { .. })
    }
}
