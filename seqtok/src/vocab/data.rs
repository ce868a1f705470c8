//! Token lists for the built-in vocabularies.
//!
//! These are plain constants rather than data files.  They're small, they never change at
//! runtime, and the index of every entry is part of the contract with whatever model was trained
//! on them, so reordering anything here is a breaking change.  Append, never insert.
use crate::token::{PAD_TOKEN, UNK_TOKEN};

/// Lowercase English graphemes, for direct (non-phonemized) grapheme tokenization and for
/// filtering text before it's handed to an English phonemizer.
pub(crate) const ENGLISH_GRAPHEMES: &[&str] = &[
    PAD_TOKEN, UNK_TOKEN, //
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s",
    "t", "u", "v", "w", "x", "y", "z", //
    " ", "'", ".", ",", "?", "!", "-",
];

/// ARPAbet phonemes with lexical stress markers, which is what the CMU dictionary based English
/// G2P engines emit, plus the punctuation those engines pass through untouched.
pub(crate) const ENGLISH_PHONEMES: &[&str] = &[
    PAD_TOKEN, UNK_TOKEN, //
    "AA0", "AA1", "AA2", "AE0", "AE1", "AE2", "AH0", "AH1", "AH2", "AO0", "AO1", "AO2", "AW0",
    "AW1", "AW2", "AY0", "AY1", "AY2", //
    "B", "CH", "D", "DH", //
    "EH0", "EH1", "EH2", "ER0", "ER1", "ER2", "EY0", "EY1", "EY2", //
    "F", "G", "HH", //
    "IH0", "IH1", "IH2", "IY0", "IY1", "IY2", //
    "JH", "K", "L", "M", "N", "NG", //
    "OW0", "OW1", "OW2", "OY0", "OY1", "OY2", //
    "P", "R", "S", "SH", "T", "TH", //
    "UH0", "UH1", "UH2", "UW", "UW0", "UW1", "UW2", //
    "V", "W", "Y", "Z", "ZH", //
    " ", ".", ",", "?", "!", "-",
];

/// Indonesian special tokens.  Only padding; this scheme has no unknown token.
pub(crate) const INDONESIAN_SPECIAL: &[&str] = &["pad"];

/// Indonesian letters.  The digraphs and diphthongs MUST come before the single letters, or
/// `ng` would be split into `n` + `g` before it ever got a chance to match.
pub(crate) const INDONESIAN_BASE: &[&str] = &[
    "ch", "ng", "ny", "ai", "ay", "oi", "oy", "ei", //
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s",
    "t", "u", "v", "w", "x", "y", "z",
];

/// Indonesian punctuation.  The first five keep the indices models trained on the older, shorter
/// list expect (space is 35, comma is 39); the rest were appended later.
pub(crate) const INDONESIAN_PUNCTUATION: &[&str] =
    &[" ", "!", "?", ".", ",", "-", ":", ";", "(", ")"];
