use super::Tokenizer;
use crate::error;
use crate::phonemize::{Phonemizer, SharedPhonemizer};
use crate::token::{TokenizedSequence, UNK_INDEX, UNK_TOKEN};
use crate::vocab::{BuiltinVocabulary, VocabularyTable};
use crate::Result;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{EnumString, EnumVariantNames};
use tracing::*;

/// Whether a [`GraphemeTokenizer`] maps characters directly or goes through a phonemizer first
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    EnumString,
    EnumVariantNames,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GraphemeMode {
    /// One index per character, looked up in the grapheme vocabulary
    #[default]
    Direct,

    /// Text is filtered down to the grapheme vocabulary's characters, phonemized, and then each
    /// phoneme is looked up in the phoneme vocabulary
    Phonemized,
}

#[derive(Clone, Debug)]
enum Mode {
    Direct,
    Phonemized {
        phonemes: Arc<VocabularyTable>,
        phonemizer: SharedPhonemizer,

        /// The characters that survive filtering before the text goes to the phonemizer
        keep: FxHashSet<char>,
    },
}

/// Character or phoneme level tokenizer over a vocabulary with reserved `<pad>` and `<unk>`
/// tokens.
///
/// Input is lowercased, and anything that isn't in the vocabulary becomes `<unk>`.  In direct mode
/// that means the output always has exactly one index per character of the lowercased input.
///
/// Cloning is cheap; the vocabularies and phonemizer are shared.
#[derive(Clone, Debug)]
pub struct GraphemeTokenizer {
    graphemes: Arc<VocabularyTable>,
    mode: Mode,
}

impl GraphemeTokenizer {
    /// Make a tokenizer in the given mode.
    ///
    /// Phonemized mode uses the built-in English phoneme vocabulary and requires a phonemizer;
    /// use [`Self::phonemized`] for a different phoneme vocabulary.
    pub fn new(
        graphemes: Arc<VocabularyTable>,
        mode: GraphemeMode,
        phonemizer: Option<SharedPhonemizer>,
    ) -> Result<Self> {
        match mode {
            GraphemeMode::Direct => Self::direct(graphemes),
            GraphemeMode::Phonemized => Self::phonemized(
                graphemes,
                BuiltinVocabulary::EnglishPhonemes.table(),
                phonemizer,
            ),
        }
    }

    /// Make a tokenizer that maps each character directly to its index in `graphemes`.
    pub fn direct(graphemes: Arc<VocabularyTable>) -> Result<Self> {
        ensure_has_unknown(&graphemes)?;

        debug!(graphemes = graphemes.len(), "Created direct grapheme tokenizer");

        Ok(Self {
            graphemes,
            mode: Mode::Direct,
        })
    }

    /// Make a tokenizer that phonemizes text with `phonemizer` and maps the phonemes to their
    /// indices in `phonemes`.
    ///
    /// `phonemizer` is an `Option` so that callers which only learn at runtime whether they have
    /// a phonemizer get a proper error instead of having to check themselves.
    pub fn phonemized(
        graphemes: Arc<VocabularyTable>,
        phonemes: Arc<VocabularyTable>,
        phonemizer: Option<SharedPhonemizer>,
    ) -> Result<Self> {
        let phonemizer = phonemizer.ok_or_else(|| error::PhonemizerUnavailableSnafu.build())?;
        ensure_has_unknown(&graphemes)?;
        ensure_has_unknown(&phonemes)?;

        // Build the filter from the vocabulary's own characters, as a set.  Some of the
        // vocabulary's characters (`-`, `?`, `.`) would be trouble in anything pattern-like.
        let keep: FxHashSet<char> = graphemes
            .regular_tokens()
            .flat_map(|(_, token)| token.chars())
            .collect();

        debug!(
            graphemes = graphemes.len(),
            phonemes = phonemes.len(),
            kept_chars = keep.len(),
            "Created phonemizing grapheme tokenizer"
        );

        Ok(Self {
            graphemes,
            mode: Mode::Phonemized {
                phonemes,
                phonemizer,
                keep,
            },
        })
    }

    pub fn mode(&self) -> GraphemeMode {
        match self.mode {
            Mode::Direct => GraphemeMode::Direct,
            Mode::Phonemized { .. } => GraphemeMode::Phonemized,
        }
    }

    /// The grapheme vocabulary.  In direct mode this is also [`Tokenizer::vocabulary`].
    pub fn graphemes(&self) -> &VocabularyTable {
        &self.graphemes
    }
}

impl Tokenizer for GraphemeTokenizer {
    fn encode(&self, text: &str) -> TokenizedSequence {
        let text = text.to_lowercase();

        match &self.mode {
            Mode::Direct => text
                .chars()
                .map(|ch| self.graphemes.index_of_char(ch).unwrap_or(UNK_INDEX))
                .collect(),
            Mode::Phonemized {
                phonemes,
                phonemizer,
                keep,
            } => {
                let filtered: String = text.chars().filter(|ch| keep.contains(ch)).collect();
                if filtered.len() != text.len() {
                    trace!(
                        %text,
                        %filtered,
                        "Removed characters not in the grapheme vocabulary before phonemizing"
                    );
                }

                phonemizer
                    .phonemize(&filtered)
                    .iter()
                    .map(|phoneme| phonemes.index_of(phoneme).unwrap_or(UNK_INDEX))
                    .collect()
            }
        }
    }

    fn vocabulary(&self) -> &VocabularyTable {
        match &self.mode {
            Mode::Direct => &self.graphemes,
            Mode::Phonemized { phonemes, .. } => phonemes,
        }
    }
}

/// Tables built from token groups have no `<unk>`, and this tokenizer can't work without one
fn ensure_has_unknown(table: &VocabularyTable) -> Result<()> {
    if table.unknown_index() == Some(UNK_INDEX) {
        Ok(())
    } else {
        error::MissingReservedTokenSnafu {
            position: UNK_INDEX,
            expected: UNK_TOKEN,
            found: table.token_of(UNK_INDEX).map(str::to_string),
        }
        .fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeqtokError;
    use crate::vocab::TokenGroups;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn table(tokens: &[&str]) -> Arc<VocabularyTable> {
        Arc::new(VocabularyTable::with_reserved(tokens.iter().copied()).unwrap())
    }

    /// Stand-in for a real G2P engine: every letter becomes its uppercase self, and everything
    /// else is passed through unchanged
    fn stub_phonemizer() -> SharedPhonemizer {
        SharedPhonemizer::new(|text: &str| -> Vec<String> {
            text.chars().map(|c| c.to_uppercase().to_string()).collect()
        })
    }

    #[test]
    fn direct_mode_substitutes_unknown() {
        crate::test_helpers::init_test_logging();

        let tokenizer = GraphemeTokenizer::direct(table(&["<pad>", "<unk>", "a", "b"])).unwrap();
        let batch = tokenizer.tokenize(&["ac", ""]);

        let (rows, lengths) = batch.into_parts();
        assert_eq!(vec![vec![2, 1], vec![0, 0]], rows);
        assert_eq!(vec![2, 0], lengths);
    }

    #[test]
    fn direct_mode_lowercases() {
        let tokenizer = GraphemeTokenizer::direct(table(&["<pad>", "<unk>", "a", "b"])).unwrap();
        assert_eq!(vec![2, 3, 2], tokenizer.encode("AbA"));
    }

    #[test]
    fn emoji_is_unknown_not_an_error() {
        let tokenizer =
            GraphemeTokenizer::direct(BuiltinVocabulary::EnglishGraphemes.table()).unwrap();
        let indices = tokenizer.encode("hi 🙂!");

        assert_eq!(5, indices.len());
        assert_eq!(UNK_INDEX, indices[3]);
        assert_eq!("hi <unk>!", tokenizer.decode(&indices).unwrap());
    }

    #[test]
    fn phonemized_mode_requires_a_phonemizer() {
        let err = GraphemeTokenizer::new(
            BuiltinVocabulary::EnglishGraphemes.table(),
            GraphemeMode::Phonemized,
            None,
        )
        .unwrap_err();

        assert_matches!(err, SeqtokError::PhonemizerUnavailable);
        assert!(err.is_configuration_error());
    }

    #[test]
    fn vocabulary_without_unknown_is_rejected() {
        let groups = TokenGroups::new(["pad"], ["a", "b"], [" "]);
        let table = Arc::new(VocabularyTable::from_groups(&groups).unwrap());

        assert_matches!(
            GraphemeTokenizer::direct(table),
            Err(SeqtokError::MissingReservedToken { position: 1, found: Some(found), .. }) if found == "a"
        );
    }

    #[test]
    fn phonemized_mode_filters_then_maps_phonemes() {
        let graphemes = table(&["<pad>", "<unk>", "a", "b", " ", "?"]);
        let phonemes = table(&["<pad>", "<unk>", "A", "B", " "]);

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let phonemizer = {
            let seen = seen.clone();
            SharedPhonemizer::new(move |text: &str| -> Vec<String> {
                seen.lock().unwrap().push(text.to_string());
                text.chars().map(|c| c.to_uppercase().to_string()).collect()
            })
        };

        let tokenizer =
            GraphemeTokenizer::phonemized(graphemes, phonemes, Some(phonemizer)).unwrap();
        assert_eq!(GraphemeMode::Phonemized, tokenizer.mode());

        // `c` and `[` aren't graphemes, so they never reach the phonemizer.  `?` is a grapheme
        // but not a phoneme, so it comes back as unknown.
        let batch = tokenizer.tokenize(&["Ab[c] a?", "b"]);
        assert_eq!(
            vec!["ab a?".to_string(), "b".to_string()],
            *seen.lock().unwrap()
        );

        let (rows, lengths) = batch.into_parts();
        assert_eq!(vec![vec![2, 3, 4, 2, 1], vec![3, 0, 0, 0, 0]], rows);
        assert_eq!(vec![5, 1], lengths);

        assert_eq!(
            vec!["A", "B", " ", "A", "<unk>"],
            tokenizer.decode_tokens(&[2, 3, 4, 2, 1, 0]).unwrap()
        );
    }

    #[test]
    fn phonemized_mode_with_builtin_vocabularies() {
        let tokenizer = GraphemeTokenizer::new(
            BuiltinVocabulary::EnglishGraphemes.table(),
            GraphemeMode::Phonemized,
            Some(SharedPhonemizer::new(|_: &str| -> Vec<String> {
                ["HH", "AH0", "L", "OW1", "XX"]
                    .into_iter()
                    .map(String::from)
                    .collect()
            })),
        )
        .unwrap();

        let phonemes = BuiltinVocabulary::EnglishPhonemes.table();
        let expected: Vec<_> = ["HH", "AH0", "L", "OW1"]
            .into_iter()
            .map(|p| phonemes.lookup(p).unwrap())
            .chain([UNK_INDEX])
            .collect();
        assert_eq!(expected, tokenizer.encode("Hello"));
    }

    #[test]
    fn decode_rejects_foreign_indices() {
        let tokenizer = GraphemeTokenizer::direct(table(&["<pad>", "<unk>", "a"])).unwrap();
        assert_matches!(
            tokenizer.decode(&[2, 7]),
            Err(SeqtokError::InvalidIndex { index: 7, size: 3 })
        );
    }

    #[test]
    fn mode_names() {
        assert_eq!("phonemized", GraphemeMode::Phonemized.to_string());
        assert_eq!(GraphemeMode::Direct, "direct".parse().unwrap());
        assert_eq!(GraphemeMode::Direct, GraphemeMode::default());
    }

    proptest! {
        #[test]
        fn direct_mode_emits_one_index_per_char(text in "\\PC*") {
            let tokenizer =
                GraphemeTokenizer::direct(BuiltinVocabulary::EnglishGraphemes.table()).unwrap();
            let batch = tokenizer.tokenize(&[&text]);
            let expected = [text.to_lowercase().chars().count()];
            prop_assert_eq!(&expected[..], batch.lengths());
        }

        #[test]
        fn phonemized_mode_never_fails(text in "\\PC*") {
            let tokenizer = GraphemeTokenizer::new(
                BuiltinVocabulary::EnglishGraphemes.table(),
                GraphemeMode::Phonemized,
                Some(stub_phonemizer()),
            ).unwrap();
            let indices = tokenizer.encode(&text);
            prop_assert!(indices.iter().all(|&i| i < tokenizer.vocabulary().len()));
        }
    }
}
