//! The seam between seqtok and whatever grapheme-to-phoneme engine the caller has.
//!
//! seqtok doesn't do G2P itself.  Real engines are big (pronunciation dictionaries, neural
//! fallbacks for out-of-vocabulary words) and language specific, so the caller injects one.  That
//! also means tests can use a trivial deterministic stub instead of a real engine.
use std::fmt;
use std::sync::Arc;

/// Converts text into a sequence of phoneme symbols.
///
/// Implementations must be deterministic and free of side effects for a given input string: the
/// same text must always produce the same phonemes, or tokenization stops being reproducible.
///
/// Symbols that aren't in the phoneme vocabulary aren't an error; they are tokenized as `<unk>`.
pub trait Phonemizer: Send + Sync {
    fn phonemize(&self, text: &str) -> Vec<String>;
}

/// Any suitable closure is a phonemizer
impl<F> Phonemizer for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn phonemize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// A phonemizer shared between tokenizers.
#[derive(Clone)]
pub struct SharedPhonemizer(Arc<dyn Phonemizer>);

impl SharedPhonemizer {
    pub fn new(phonemizer: impl Phonemizer + 'static) -> Self {
        Self(Arc::new(phonemizer))
    }
}

impl Phonemizer for SharedPhonemizer {
    fn phonemize(&self, text: &str) -> Vec<String> {
        self.0.phonemize(text)
    }
}

impl fmt::Debug for SharedPhonemizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedPhonemizer")
    }
}

impl From<Arc<dyn Phonemizer>> for SharedPhonemizer {
    fn from(phonemizer: Arc<dyn Phonemizer>) -> Self {
        Self(phonemizer)
    }
}
