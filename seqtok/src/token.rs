/// A token output by the tokenizer, represented in its integer form: the position of the token in
/// the vocabulary it came from.
///
/// Downstream sequence models consume these directly (usually as an embedding lookup), so the
/// tokenizers produce indices rather than token strings.  If callers want the text back, the
/// vocabulary table can always translate an index into the token it stands for.
pub type TokenIndex = usize;

/// A token in its text form.  This is a single character, a phoneme label like `AH0`, or a
/// multi-character cluster like `ng`.
pub type TokenString = String;

/// The index sequence produced for a single input string, before padding.
///
/// Its length is the "original length" that ends up in [`crate::Batch::lengths`].
pub type TokenizedSequence = Vec<TokenIndex>;

/// Index 0 is reserved for the padding token in every vocabulary.
pub const PAD_INDEX: TokenIndex = 0;

/// Index 1 is reserved for the unknown token in vocabularies that have one (the grapheme and
/// phoneme vocabularies).  Multi-character vocabularies do not reserve it.
pub const UNK_INDEX: TokenIndex = 1;

/// The text of the padding token in vocabularies with reserved tokens
pub const PAD_TOKEN: &str = "<pad>";

/// The text of the unknown token in vocabularies with reserved tokens
pub const UNK_TOKEN: &str = "<unk>";
