//! Turn raw text into the fixed-width index batches a sequence model (typically the text front
//! end of a speech synthesizer) consumes.
//!
//! ```text
//! ["Hai!", "yang"] ──► tokenizer ──► [[16, 4, 36], [33, 9, 2]] ──► pad_batch ──► Batch
//!                       ▲                                                      ├ [[16, 4, 36],
//!                       │                                                      │  [33, 9,  2]]
//!                 VocabularyTable                                              └ lengths [3, 3]
//! ```
//!
//! There are two tokenizers:
//!
//! - [`GraphemeTokenizer`] maps each character to an index, or hands the text to an injected
//!   [`Phonemizer`] and maps each phoneme to an index.  Unknown symbols become `<unk>`.
//! - [`MultiCharTokenizer`] segments text into letter clusters such as `ng` or `ai` using a
//!   priority ordered greedy match, with no phonemizer.  Unknown symbols are dropped.
//!
//! Vocabularies are immutable [`VocabularyTable`]s.  A few come built in (see
//! [`BuiltinVocabulary`]), others can be described in code or loaded from a JSON
//! [`VocabularyConfig`].
//!
//! Tokenizing never fails.  The only errors come from building vocabularies and tokenizers, and
//! from decoding indices that don't belong to the vocabulary.
mod batch;
mod config;
mod error;
mod phonemize;
pub mod segment;
mod token;
mod tokenizer;
mod vocab;

pub use batch::*;
pub use config::*;
pub use error::*;
pub use phonemize::*;
pub use token::*;
pub use tokenizer::*;
pub use vocab::*;

pub type Result<T> = std::result::Result<T, SeqtokError>;
