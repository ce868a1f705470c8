//! Padding variable length index sequences into one rectangular batch.
use crate::token::{TokenIndex, PAD_INDEX};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A rectangular batch of index sequences, right-padded with [`PAD_INDEX`], along with the true
/// length of each sequence.
///
/// The indices are stored row-major in one contiguous buffer, which is the layout tensor
/// libraries want when the batch is handed to a model.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Batch {
    indices: Vec<TokenIndex>,
    lengths: Vec<usize>,
    cols: usize,
}

impl Batch {
    /// `(rows, cols)`: one row per input sequence, as many columns as the longest one
    pub fn shape(&self) -> (usize, usize) {
        (self.lengths.len(), self.cols)
    }

    /// Number of sequences in the batch
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// The unpadded length of every sequence, in input order
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// The whole padded matrix, row-major
    pub fn as_slice(&self) -> &[TokenIndex] {
        &self.indices
    }

    /// Row `row` including its padding, or `None` if there's no such row
    pub fn row(&self, row: usize) -> Option<&[TokenIndex]> {
        if row < self.len() {
            let start = row * self.cols;
            Some(&self.indices[start..start + self.cols])
        } else {
            None
        }
    }

    /// Row `row` without its padding, which is exactly the sequence that went in
    pub fn sequence(&self, row: usize) -> Option<&[TokenIndex]> {
        self.row(row).map(|r| &r[..self.lengths[row]])
    }

    /// Iterate over the padded rows
    pub fn rows(&self) -> impl Iterator<Item = &[TokenIndex]> {
        (0..self.len()).map(move |row| {
            let start = row * self.cols;
            &self.indices[start..start + self.cols]
        })
    }

    /// Iterate over the unpadded sequences
    pub fn sequences(&self) -> impl Iterator<Item = &[TokenIndex]> {
        self.rows()
            .zip(&self.lengths)
            .map(|(row, &len)| &row[..len])
    }

    /// Split the batch into nested rows plus the length vector
    pub fn into_parts(self) -> (Vec<Vec<TokenIndex>>, Vec<usize>) {
        let rows = self.rows().map(<[TokenIndex]>::to_vec).collect();
        (rows, self.lengths)
    }
}

impl Serialize for Batch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<&[TokenIndex]> = self.rows().collect();

        let mut state = serializer.serialize_struct("Batch", 2)?;
        state.serialize_field("indices", &rows)?;
        state.serialize_field("lengths", &self.lengths)?;
        state.end()
    }
}

/// Pad a list of index sequences into a [`Batch`].
///
/// Each row holds one sequence, left aligned, followed by [`PAD_INDEX`] up to the length of the
/// longest sequence.  Empty sequences are fine and become rows of nothing but padding.  An empty
/// list produces an empty `0 x 0` batch.
///
/// This is deterministic: the same sequences in the same order always produce the same batch.
pub fn pad_batch<S: AsRef<[TokenIndex]>>(sequences: impl IntoIterator<Item = S>) -> Batch {
    let sequences: Vec<S> = sequences.into_iter().collect();

    let cols = sequences
        .iter()
        .map(|seq| seq.as_ref().len())
        .max()
        .unwrap_or(0);

    let mut indices = Vec::with_capacity(sequences.len() * cols);
    let mut lengths = Vec::with_capacity(sequences.len());

    for seq in &sequences {
        let seq = seq.as_ref();
        indices.extend_from_slice(seq);
        indices.resize(indices.len() + (cols - seq.len()), PAD_INDEX);
        lengths.push(seq.len());
    }

    Batch {
        indices,
        lengths,
        cols,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pads_to_the_longest_sequence() {
        let batch = pad_batch([vec![2usize, 1], vec![], vec![5, 6, 7]]);

        assert_eq!((3, 3), batch.shape());
        assert_eq!(&[2, 1, 0, 0, 0, 0, 5, 6, 7], batch.as_slice());
        assert_eq!(&[2, 0, 3], batch.lengths());
        assert_eq!(Some(&[2, 1][..]), batch.sequence(0));
        assert_eq!(Some(&[0, 0, 0][..]), batch.row(1));
        assert_eq!(None, batch.row(3));
    }

    #[test]
    fn all_empty_sequences_have_no_columns() {
        let batch = pad_batch([Vec::<TokenIndex>::new(), Vec::new()]);

        assert_eq!((2, 0), batch.shape());
        assert_eq!(&[0, 0], batch.lengths());
        let empty: &[TokenIndex] = &[];
        assert_eq!(vec![empty, empty], batch.rows().collect::<Vec<_>>());
    }

    #[test]
    fn no_sequences_is_an_empty_batch() {
        let batch = pad_batch(Vec::<Vec<TokenIndex>>::new());
        assert!(batch.is_empty());
        assert_eq!((0, 0), batch.shape());
        assert_eq!(Batch::default(), batch);
    }

    #[test]
    fn serializes_as_nested_rows() {
        let batch = pad_batch([&[2usize, 1][..], &[][..]]);
        let json = serde_json::to_string(&batch).unwrap();
        assert_eq!(r#"{"indices":[[2,1],[0,0]],"lengths":[2,0]}"#, json);
    }

    proptest! {
        #[test]
        fn padding_preserves_every_sequence(
            sequences in proptest::collection::vec(
                proptest::collection::vec(1usize..100, 0..20),
                0..10,
            )
        ) {
            let batch = pad_batch(&sequences);
            let max_len = sequences.iter().map(Vec::len).max().unwrap_or(0);

            prop_assert_eq!((sequences.len(), max_len), batch.shape());
            prop_assert_eq!(
                sequences.iter().map(Vec::len).collect::<Vec<_>>(),
                batch.lengths().to_vec()
            );

            for (row, seq) in batch.rows().zip(&sequences) {
                prop_assert_eq!(&row[..seq.len()], seq.as_slice());
                prop_assert!(row[seq.len()..].iter().all(|&i| i == PAD_INDEX));
            }

            let (rows, lengths) = batch.clone().into_parts();
            prop_assert_eq!(rows.len(), sequences.len());
            prop_assert_eq!(lengths, batch.lengths().to_vec());

            // Same input, same output
            prop_assert_eq!(batch, pad_batch(&sequences));
        }
    }
}
