use super::Tokenizer;
use crate::error;
use crate::segment::Segmenter;
use crate::token::TokenizedSequence;
use crate::vocab::{BuiltinVocabulary, TokenGroups, VocabularyTable};
use crate::Result;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::*;

/// Tokenizer for vocabularies of letter clusters (digraphs, trigraphs, diphthongs), which maps
/// raw text straight to indices without any phonemizer.
///
/// Tokenizing a string is done in three steps:
///
/// 1. Lowercase it.
/// 2. Drop every character that doesn't appear in any matchable token.  Whole characters are
///    dropped, never parts of clusters, so this can't break a cluster apart.
/// 3. Segment what's left with the priority ordered greedy algorithm described in
///    [`crate::segment`], in the order the tokens were declared.
///
/// There's no unknown token in this scheme.  Anything not covered by the vocabulary simply
/// disappears, including a character that survived step 2 only because it's part of some
/// cluster, but that turned up without the rest of that cluster.
///
/// Special tokens (padding and friends) are never matched against text.
#[derive(Clone, Debug)]
pub struct MultiCharTokenizer {
    table: Arc<VocabularyTable>,
    segmenter: Segmenter,

    /// Every character that appears in a matchable token
    alphabet: FxHashSet<char>,
}

impl MultiCharTokenizer {
    /// Make a tokenizer over an existing table.  Everything after the table's reserved or
    /// special tokens is matchable, with priority in index order.
    pub fn new(table: Arc<VocabularyTable>) -> Self {
        let segmenter = Segmenter::new(table.regular_tokens());
        let alphabet: FxHashSet<char> = table
            .regular_tokens()
            .flat_map(|(_, token)| token.chars())
            .collect();

        debug!(
            tokens = table.len(),
            matchable = segmenter.len(),
            alphabet = alphabet.len(),
            "Created multi-character tokenizer"
        );

        Self {
            table,
            segmenter,
            alphabet,
        }
    }

    /// Build the table from `groups` and make a tokenizer over it
    pub fn from_groups(groups: &TokenGroups) -> Result<Self> {
        Ok(Self::new(Arc::new(VocabularyTable::from_groups(groups)?)))
    }

    /// Make a tokenizer for one of the built-in multi-character vocabularies
    pub fn builtin(vocab: BuiltinVocabulary) -> Result<Self> {
        if !vocab.is_multi_char() {
            return error::NotMultiCharVocabularySnafu {
                name: vocab.to_string(),
            }
            .fail();
        }

        Ok(Self::new(vocab.table()))
    }

    /// Drop all characters that can't be part of any token
    fn filter(&self, text: &str) -> String {
        text.chars().filter(|ch| self.alphabet.contains(ch)).collect()
    }
}

impl Tokenizer for MultiCharTokenizer {
    fn encode(&self, text: &str) -> TokenizedSequence {
        let text = text.to_lowercase();
        let filtered = self.filter(&text);

        if filtered.len() != text.len() {
            trace!(%text, %filtered, "Removed characters outside the vocabulary");
        }

        self.segmenter.segment(&filtered)
    }

    fn vocabulary(&self) -> &VocabularyTable {
        &self.table
    }
}
