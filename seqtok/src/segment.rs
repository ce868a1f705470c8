//! Priority ordered greedy segmentation of text into multi-character tokens.
//!
//! This is not the left-to-right longest-match scan most tokenizers use.  Tokens are processed
//! one at a time in their declared order, and each one claims every non-overlapping occurrence of
//! itself that's still unclaimed, anywhere in the text.  Only then does the next token get a turn.
//! So a token declared earlier always wins over a later one, regardless of where in the text the
//! two compete.  With tokens `["bc", "ab", "a", "b", "c"]`, `"abc"` segments as `a` + `bc`, even
//! though `ab` is the leftmost match.
//!
//! Once a span is claimed it's never matched again, and no later token can match across it.
use crate::TokenIndex;
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use tracing::*;

/// A set of tokens, in priority order, compiled for segmenting text.
#[derive(Clone, Debug)]
pub struct Segmenter {
    /// The vocabulary index of each token, by priority.  The position in this vector is also
    /// the token's pattern ID in `finder`.
    indices: Vec<TokenIndex>,

    /// A/C automaton that finds every occurrence of every token, overlaps included
    finder: AhoCorasick,
}

impl Segmenter {
    /// Compile `tokens` into a segmenter.  Tokens are given as `(index, text)` pairs in priority
    /// order, highest priority first.
    ///
    /// Tokens must be unique and non-empty, which [`crate::VocabularyTable`] already guarantees.
    pub fn new<'a>(tokens: impl IntoIterator<Item = (TokenIndex, &'a str)>) -> Self {
        let (indices, patterns): (Vec<_>, Vec<_>) = tokens.into_iter().unzip();
        debug_assert!(patterns.iter().all(|p| !p.is_empty()));

        // Overlapping search is only supported with the standard match semantics, and we need
        // overlapping matches: the highest priority occurrence of a token might start in the
        // middle of some lower priority token's occurrence.
        let finder = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .dfa(true)
            .build(&patterns);

        Self { indices, finder }
    }

    /// Number of tokens this segmenter knows about
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Segment `text` and return the vocabulary indices of the tokens found, in text order.
    ///
    /// Any part of `text` that no token claims is silently dropped.
    pub fn segment(&self, text: &str) -> Vec<TokenIndex> {
        // Every occurrence of every token, grouped by token
        let mut occurrences: Vec<Vec<(usize, usize)>> = vec![Vec::new(); self.indices.len()];
        for m in self.finder.find_overlapping_iter(text) {
            occurrences[m.pattern()].push((m.start(), m.end()));
        }

        let mut claimed = vec![false; text.len()];

        // (byte offset, vocabulary index) of each claimed span
        let mut spans = Vec::new();

        for (pattern, mut found) in occurrences.into_iter().enumerate() {
            // Left to right, so that when occurrences of the same token overlap (`aa` in `aaa`)
            // the leftmost one wins
            found.sort_unstable();

            for (start, end) in found {
                if claimed[start..end].iter().any(|&c| c) {
                    continue;
                }
                claimed[start..end].fill(true);
                spans.push((start, self.indices[pattern]));
            }
        }

        let unclaimed = claimed.iter().filter(|&&c| !c).count();
        if unclaimed > 0 {
            trace!(
                unclaimed_bytes = unclaimed,
                text,
                "Dropping text that no token claimed"
            );
        }

        spans.sort_unstable();
        spans.into_iter().map(|(_, index)| index).collect()
    }
}
