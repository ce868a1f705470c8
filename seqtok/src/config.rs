//! Vocabulary configuration files.
//!
//! A vocabulary is a contract with a trained model, so it's useful to keep it in a file next to
//! the model weights rather than in code.  The format is JSON, tagged by `kind`:
//!
//! ```json
//! { "kind": "grapheme", "tokens": ["<pad>", "<unk>", "a", "b"], "mode": "direct" }
//! { "kind": "multi_char", "special": ["pad"], "base": ["ng", "n", "g"], "punctuation": [" "] }
//! ```
//!
//! Grapheme vocabularies in `phonemized` mode can also carry their own `phonemes` list, which
//! otherwise defaults to the built-in English phonemes.
use crate::error;
use crate::phonemize::SharedPhonemizer;
use crate::token::{TokenString, TokenizedSequence};
use crate::tokenizer::{GraphemeMode, GraphemeTokenizer, MultiCharTokenizer, Tokenizer};
use crate::vocab::{BuiltinVocabulary, TokenGroups, VocabularyTable};
use crate::Result;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::path::Path;
use std::sync::Arc;
use tracing::*;

/// A vocabulary description, as read from a configuration file
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VocabularyConfig {
    /// A grapheme vocabulary with reserved `<pad>` and `<unk>` tokens, for [`GraphemeTokenizer`]
    Grapheme {
        tokens: Vec<TokenString>,

        #[serde(default)]
        mode: GraphemeMode,

        /// The phoneme vocabulary for phonemized mode.  Defaults to the built-in English
        /// phonemes.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phonemes: Option<Vec<TokenString>>,
    },

    /// Token groups for [`MultiCharTokenizer`]
    MultiChar(TokenGroups),
}

/// A tokenizer of either kind, built from a [`VocabularyConfig`]
#[derive(Clone, Debug)]
pub enum ConfiguredTokenizer {
    Grapheme(GraphemeTokenizer),
    MultiChar(MultiCharTokenizer),
}

impl Tokenizer for ConfiguredTokenizer {
    fn encode(&self, text: &str) -> TokenizedSequence {
        match self {
            Self::Grapheme(tokenizer) => tokenizer.encode(text),
            Self::MultiChar(tokenizer) => tokenizer.encode(text),
        }
    }

    fn vocabulary(&self) -> &VocabularyTable {
        match self {
            Self::Grapheme(tokenizer) => tokenizer.vocabulary(),
            Self::MultiChar(tokenizer) => tokenizer.vocabulary(),
        }
    }
}

impl VocabularyConfig {
    /// Read a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).context(error::FileIoSnafu { path })?;
        let config: Self =
            serde_json::from_str(&contents).context(error::ConfigParseSnafu { path })?;

        debug!(path = %path.display(), kind = config.kind(), "Loaded vocabulary configuration");

        Ok(config)
    }

    /// The configuration equivalent to one of the built-in vocabularies
    pub fn builtin(vocab: BuiltinVocabulary) -> Self {
        match vocab.groups() {
            Some(groups) => Self::MultiChar(groups),
            None => Self::Grapheme {
                tokens: vocab
                    .table()
                    .tokens()
                    .map(|(_, token)| token.to_string())
                    .collect(),
                mode: GraphemeMode::Direct,
                phonemes: None,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Grapheme { .. } => "grapheme",
            Self::MultiChar(_) => "multi_char",
        }
    }

    /// Build the tokenizer this configuration describes.
    ///
    /// `phonemizer` is only used by grapheme vocabularies in phonemized mode, for which it's
    /// required.
    pub fn build(&self, phonemizer: Option<SharedPhonemizer>) -> Result<ConfiguredTokenizer> {
        match self {
            Self::Grapheme {
                tokens,
                mode,
                phonemes,
            } => {
                let graphemes = Arc::new(VocabularyTable::with_reserved(tokens.iter().cloned())?);

                let tokenizer = match (mode, phonemes) {
                    (GraphemeMode::Phonemized, Some(phonemes)) => {
                        let phonemes =
                            Arc::new(VocabularyTable::with_reserved(phonemes.iter().cloned())?);
                        GraphemeTokenizer::phonemized(graphemes, phonemes, phonemizer)?
                    }
                    (mode, phonemes) => {
                        if phonemes.is_some() {
                            warn!(
                                %mode,
                                "Ignoring the phoneme vocabulary, which is only used in phonemized mode"
                            );
                        }
                        GraphemeTokenizer::new(graphemes, *mode, phonemizer)?
                    }
                };

                Ok(ConfiguredTokenizer::Grapheme(tokenizer))
            }
            Self::MultiChar(groups) => Ok(ConfiguredTokenizer::MultiChar(
                MultiCharTokenizer::from_groups(groups)?,
            )),
        }
    }
}
