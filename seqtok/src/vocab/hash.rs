//! The lookup tables behind [`super::VocabularyTable`].
//!
//! Vocabularies here are tiny (tens of entries) but lookups happen once per input character, so
//! the hash function matters more than the size.  FxHash is much cheaper than SipHash for short
//! string keys and we don't need HashDoS resistance for a fixed, trusted vocabulary.
use crate::token::{TokenIndex, TokenString};

use rustc_hash::FxHashMap as HashMap;

/// Maps token strings to their index in the vocabulary.
#[derive(Clone, Debug, Default)]
pub(crate) struct TokenEncoder(HashMap<TokenString, TokenIndex>);

/// The reverse mapping, from index to token string.
///
/// Indices are dense and start at 0, so unlike the encoder this is just a `Vec`.
#[derive(Clone, Debug, Default)]
pub(crate) struct TokenDecoder(Vec<TokenString>);

impl TokenEncoder {
    /// Insert a token, returning the index it was already assigned if it's a duplicate.
    pub(crate) fn insert(&mut self, token: TokenString, index: TokenIndex) -> Option<TokenIndex> {
        match self.0.get(&token) {
            Some(existing) => Some(*existing),
            None => {
                self.0.insert(token, index);
                None
            }
        }
    }

    pub(crate) fn index_for_token(&self, token: &str) -> Option<TokenIndex> {
        self.0.get(token).copied()
    }

    /// Look up a single character without allocating a `String` for it
    pub(crate) fn index_for_char(&self, ch: char) -> Option<TokenIndex> {
        let mut buf = [0u8; 4];
        self.index_for_token(ch.encode_utf8(&mut buf))
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl TokenDecoder {
    pub(crate) fn push(&mut self, token: TokenString) {
        self.0.push(token)
    }

    pub(crate) fn token_for_index(&self, index: TokenIndex) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// All tokens, in index order
    pub(crate) fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
