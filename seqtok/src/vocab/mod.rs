use crate::error::{self, SeqtokError};
use crate::token::{TokenIndex, TokenString, PAD_TOKEN, UNK_INDEX, UNK_TOKEN};
use crate::Result;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{EnumIter, EnumString, EnumVariantNames};
use tracing::*;

mod data;
mod hash;

pub(crate) use hash::{TokenDecoder, TokenEncoder};

/// The vocabularies that ship with seqtok.
///
/// Each one is built the first time it's asked for and then shared for the rest of the process.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, EnumString, EnumIter, EnumVariantNames, strum::Display,
)]
pub enum BuiltinVocabulary {
    /// Lowercase English letters and a little punctuation, with `<pad>` and `<unk>` reserved
    #[strum(serialize = "english-graphemes")]
    EnglishGraphemes,

    /// ARPAbet phonemes with stress, with `<pad>` and `<unk>` reserved
    #[strum(serialize = "english-phonemes")]
    EnglishPhonemes,

    /// Indonesian multi-character token groups
    #[strum(serialize = "indonesian")]
    Indonesian,
}

impl BuiltinVocabulary {
    /// Parse the name of a built-in vocabulary, such as `indonesian`.
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse()
            .map_err(|_| error::UnknownVocabularySnafu { name }.build())
    }

    /// True if this vocabulary is used with the multi-character tokenizer, false if it's a
    /// grapheme or phoneme vocabulary with reserved `<pad>` and `<unk>` tokens.
    pub fn is_multi_char(&self) -> bool {
        matches!(self, Self::Indonesian)
    }

    /// The token groups for multi-character vocabularies, `None` for the others.
    pub fn groups(&self) -> Option<TokenGroups> {
        match self {
            Self::EnglishGraphemes | Self::EnglishPhonemes => None,
            Self::Indonesian => Some(TokenGroups::new(
                data::INDONESIAN_SPECIAL.iter().copied(),
                data::INDONESIAN_BASE.iter().copied(),
                data::INDONESIAN_PUNCTUATION.iter().copied(),
            )),
        }
    }

    /// Load the table for this vocabulary, if not already loaded.
    ///
    /// The resulting `Arc` is very cheap to clone.
    pub fn table(&self) -> Arc<VocabularyTable> {
        fn reserved(tokens: &[&str]) -> Arc<VocabularyTable> {
            Arc::new(
                VocabularyTable::with_reserved(tokens.iter().copied())
                    .expect("BUG: built-in vocabulary is invalid"),
            )
        }

        match self {
            Self::EnglishGraphemes => {
                static INSTANCE: OnceCell<Arc<VocabularyTable>> = OnceCell::new();
                INSTANCE
                    .get_or_init(|| reserved(data::ENGLISH_GRAPHEMES))
                    .clone()
            }
            Self::EnglishPhonemes => {
                static INSTANCE: OnceCell<Arc<VocabularyTable>> = OnceCell::new();
                INSTANCE
                    .get_or_init(|| reserved(data::ENGLISH_PHONEMES))
                    .clone()
            }
            Self::Indonesian => {
                static INSTANCE: OnceCell<Arc<VocabularyTable>> = OnceCell::new();
                INSTANCE
                    .get_or_init(|| {
                        let groups = self.groups().expect("BUG: indonesian has token groups");
                        Arc::new(
                            VocabularyTable::from_groups(&groups)
                                .expect("BUG: built-in vocabulary is invalid"),
                        )
                    })
                    .clone()
            }
        }
    }
}

/// The three ordered token groups that make up a multi-character vocabulary.
///
/// Indices are assigned by concatenating `special`, `base` and `punctuation`, in that order.  The
/// order within `base` and `punctuation` is also the matching priority during segmentation, so it
/// is significant: put longer clusters before the letters they're made of.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TokenGroups {
    /// Tokens that are never matched against text.  The first one is the padding token.
    pub special: Vec<TokenString>,

    /// Letters and letter clusters
    pub base: Vec<TokenString>,

    /// Punctuation and whitespace
    pub punctuation: Vec<TokenString>,
}

impl TokenGroups {
    pub fn new<S: Into<TokenString>>(
        special: impl IntoIterator<Item = S>,
        base: impl IntoIterator<Item = S>,
        punctuation: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            special: special.into_iter().map(Into::into).collect(),
            base: base.into_iter().map(Into::into).collect(),
            punctuation: punctuation.into_iter().map(Into::into).collect(),
        }
    }
}

/// An immutable, bidirectional mapping between tokens and their indices.
///
/// There are two flavors, which differ in what happens when a token isn't in the vocabulary:
///
/// - Tables built with [`Self::with_reserved`] start with `<pad>` and `<unk>`, and anything not
///   in the vocabulary resolves to the `<unk>` index.
/// - Tables built with [`Self::from_groups`] have no unknown token.  Lookups for tokens that
///   aren't present come back empty, and it's up to the tokenizer to have filtered them out.
///
/// In both cases the leading reserved (or special) tokens are never matched against input text;
/// the rest are the "regular" tokens.
///
/// Tables are `Send + Sync` and never change after construction, so one instance behind an `Arc`
/// can serve any number of tokenizers on any number of threads.
#[derive(Clone, Debug)]
pub struct VocabularyTable {
    encode: TokenEncoder,
    decode: TokenDecoder,

    /// The index that absent tokens resolve to, if this table has one
    unknown: Option<TokenIndex>,

    /// How many tokens at the start of the vocabulary are reserved or special
    reserved: usize,
}

impl VocabularyTable {
    /// Build a grapheme or phoneme table.  The first two tokens must be `<pad>` and `<unk>`.
    pub fn with_reserved<S: Into<TokenString>>(tokens: impl IntoIterator<Item = S>) -> Result<Self> {
        let tokens: Vec<TokenString> = tokens.into_iter().map(Into::into).collect();

        for (position, expected) in [PAD_TOKEN, UNK_TOKEN].into_iter().enumerate() {
            let found = tokens.get(position);
            if found.map(String::as_str) != Some(expected) {
                return error::MissingReservedTokenSnafu {
                    position,
                    expected,
                    found: found.cloned(),
                }
                .fail();
            }
        }

        Self::build(tokens, Some(UNK_INDEX), 2)
    }

    /// Build a multi-character table by concatenating the special, base and punctuation groups.
    pub fn from_groups(groups: &TokenGroups) -> Result<Self> {
        if groups.special.is_empty() {
            return error::MissingPaddingTokenSnafu.fail();
        }

        let tokens = groups
            .special
            .iter()
            .chain(&groups.base)
            .chain(&groups.punctuation)
            .cloned();

        Self::build(tokens, None, groups.special.len())
    }

    fn build(
        tokens: impl IntoIterator<Item = TokenString>,
        unknown: Option<TokenIndex>,
        reserved: usize,
    ) -> Result<Self> {
        let mut encode = TokenEncoder::default();
        let mut decode = TokenDecoder::default();

        for (index, token) in tokens.into_iter().enumerate() {
            if token.is_empty() {
                return error::EmptyTokenSnafu { position: index }.fail();
            }
            if let Some(first) = encode.insert(token.clone(), index) {
                return error::DuplicateTokenSnafu {
                    token,
                    first,
                    second: index,
                }
                .fail();
            }
            decode.push(token);
        }

        debug_assert_eq!(encode.len(), decode.len());
        debug!(
            tokens = decode.len(),
            reserved,
            has_unknown = unknown.is_some(),
            "Built vocabulary table"
        );

        Ok(Self {
            encode,
            decode,
            unknown,
            reserved,
        })
    }

    /// The index of `token`, falling back to the unknown index if it's not in the vocabulary.
    ///
    /// Only tables without an unknown token (see [`Self::from_groups`]) can return `None`.
    pub fn index_of(&self, token: &str) -> Option<TokenIndex> {
        self.lookup(token).or(self.unknown)
    }

    /// Like [`Self::index_of`] but for a single character, without allocating.
    pub fn index_of_char(&self, ch: char) -> Option<TokenIndex> {
        self.encode.index_for_char(ch).or(self.unknown)
    }

    /// The index of `token` if it's actually in the vocabulary.  Never falls back to the unknown
    /// index.
    pub fn lookup(&self, token: &str) -> Option<TokenIndex> {
        self.encode.index_for_token(token)
    }

    /// The token at `index`, or `None` if the index is past the end of the vocabulary.
    pub fn token_of(&self, index: TokenIndex) -> Option<&str> {
        self.decode.token_for_index(index)
    }

    /// Like [`Self::token_of`] but out of range indices are an error
    pub fn try_token_of(&self, index: TokenIndex) -> Result<&str> {
        self.token_of(index).ok_or_else(|| {
            error::InvalidIndexSnafu {
                index,
                size: self.len(),
            }
            .build()
        })
    }

    /// The index of the unknown token, if this table has one
    pub fn unknown_index(&self) -> Option<TokenIndex> {
        self.unknown
    }

    /// Number of tokens in the vocabulary, including the reserved ones
    pub fn len(&self) -> usize {
        self.decode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decode.len() == 0
    }

    /// Number of reserved or special tokens at the start of the vocabulary
    pub fn reserved_len(&self) -> usize {
        self.reserved
    }

    /// Every token with its index, in index order
    pub fn tokens(&self) -> impl Iterator<Item = (TokenIndex, &str)> {
        self.decode.tokens().enumerate()
    }

    /// The tokens that can match input text: everything after the reserved/special tokens, in
    /// index order.
    pub fn regular_tokens(&self) -> impl Iterator<Item = (TokenIndex, &str)> {
        self.tokens().skip(self.reserved)
    }
}

impl TryFrom<&TokenGroups> for VocabularyTable {
    type Error = SeqtokError;

    fn try_from(groups: &TokenGroups) -> Result<Self> {
        Self::from_groups(groups)
    }
}
