//! Tokenizers: turn raw text into index sequences, and batches of text into padded batches.
//!
//! There are two, for two very different kinds of vocabulary:
//!
//! - [`GraphemeTokenizer`] maps one character (or, after phonemization, one phoneme) to one index,
//!   and substitutes `<unk>` for anything it doesn't know.
//! - [`MultiCharTokenizer`] segments text into letter clusters like `ng` and `ai` with a greedy,
//!   priority ordered match, and drops anything it doesn't know.
//!
//! Neither one ever fails on input text.  Noisy text in a training or inference pipeline should
//! degrade the output, not crash the pipeline.
use crate::batch::{pad_batch, Batch};
use crate::token::{TokenIndex, TokenizedSequence, PAD_INDEX};
use crate::vocab::VocabularyTable;
use crate::Result;

mod grapheme;
mod multichar;

pub use grapheme::*;
pub use multichar::*;

/// Common interface of the tokenizers.
pub trait Tokenizer {
    /// Tokenize a single string into its index sequence, unpadded.
    fn encode(&self, text: &str) -> TokenizedSequence;

    /// The vocabulary whose indices [`Self::encode`] produces
    fn vocabulary(&self) -> &VocabularyTable;

    /// Tokenize every string in `texts` and pad the results into one [`Batch`], with rows in the
    /// same order as `texts`.
    fn tokenize<S: AsRef<str>>(&self, texts: &[S]) -> Batch
    where
        Self: Sized,
    {
        pad_batch(texts.iter().map(|text| self.encode(text.as_ref())))
    }

    /// Translate indices back into their tokens, skipping padding.
    ///
    /// Fails if any index is outside the vocabulary, which means the indices came from some
    /// other vocabulary.
    fn decode_tokens<'me>(&'me self, indices: &[TokenIndex]) -> Result<Vec<&'me str>> {
        let vocab = self.vocabulary();
        indices
            .iter()
            .filter(|&&index| index != PAD_INDEX)
            .map(|&index| vocab.try_token_of(index))
            .collect()
    }

    /// Like [`Self::decode_tokens`], with the tokens joined together into one string.
    ///
    /// For graphemes and letter clusters that's the (lowercased, filtered) text that was encoded.
    /// Phoneme tokens run together, so use [`Self::decode_tokens`] if the boundaries matter.
    fn decode(&self, indices: &[TokenIndex]) -> Result<String> {
        Ok(self.decode_tokens(indices)?.concat())
    }
}
