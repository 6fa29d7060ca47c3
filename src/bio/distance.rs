/// Pairwise edit distances between fragment sequences
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Levenshtein distance: minimum number of single-base insertions,
/// deletions or substitutions turning `a` into `b`.
///
/// Uses two rolling rows, so memory is `O(min(|a|, |b|))`.
pub fn levenshtein(a: &[u8], b: &[u8]) -> u32 {
    // Keep the shorter sequence on the row axis
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len() as u32;
    }

    let mut prev: Vec<u32> = (0..=short.len() as u32).collect();
    let mut curr = vec![0u32; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i as u32 + 1;
        for (j, &sc) in short.iter().enumerate() {
            let substitution = prev[j] + u32::from(lc != sc);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Symmetric `N x N` matrix of edit distances with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<u32>,
}

impl DistanceMatrix {
    pub fn compute<S: AsRef<[u8]> + Sync>(sequences: &[S]) -> Self {
        Self::compute_with_progress(sequences, |_| {})
    }

    /// Fill the matrix; `on_row` is called once per finished row.
    ///
    /// Rows of the upper triangle are computed in parallel and mirrored,
    /// so the result is identical to a sequential fill.
    pub fn compute_with_progress<S, F>(sequences: &[S], on_row: F) -> Self
    where
        S: AsRef<[u8]> + Sync,
        F: Fn(usize) + Sync,
    {
        let size = sequences.len();

        let rows: Vec<Vec<u32>> = (0..size)
            .into_par_iter()
            .map(|i| {
                let row: Vec<u32> = ((i + 1)..size)
                    .map(|j| levenshtein(sequences[i].as_ref(), sequences[j].as_ref()))
                    .collect();
                on_row(i);
                row
            })
            .collect();

        let mut values = vec![0u32; size * size];
        for (i, row) in rows.into_iter().enumerate() {
            for (offset, d) in row.into_iter().enumerate() {
                let j = i + 1 + offset;
                values[i * size + j] = d;
                values[j * size + i] = d;
            }
        }

        Self { size, values }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[u32] {
        &self.values[i * self.size..(i + 1) * self.size]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_basic() {
        assert_eq!(levenshtein(b"", b""), 0);
        assert_eq!(levenshtein(b"ACGT", b""), 4);
        assert_eq!(levenshtein(b"", b"AC"), 2);
        assert_eq!(levenshtein(b"ACGT", b"ACGT"), 0);
        assert_eq!(levenshtein(b"ACGT", b"AGGT"), 1);
        assert_eq!(levenshtein(b"ACGT", b"ACGTT"), 1);
        assert_eq!(levenshtein(b"ACGT", b"CGT"), 1);
        assert_eq!(levenshtein(b"kitten", b"sitting"), 3);
        assert_eq!(levenshtein(b"GATTACA", b"TACGATT"), 5);
    }

    #[test]
    fn test_levenshtein_is_symmetric_for_unequal_lengths() {
        assert_eq!(levenshtein(b"AAAAAC", b"CA"), levenshtein(b"CA", b"AAAAAC"));
    }

    #[test]
    fn test_matrix_shape() {
        let seqs = vec![b"ACGT".to_vec(), b"ACGA".to_vec(), b"TTTT".to_vec()];
        let matrix = DistanceMatrix::compute(&seqs);

        assert_eq!(matrix.len(), 3);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), 0);
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert_eq!(matrix.get(0, 1), 1);
        assert_eq!(matrix.get(0, 2), 3);
        assert_eq!(matrix.row(1), &[1, 0, 4]);
    }

    #[test]
    fn test_progress_called_per_row() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let seqs = vec!["AC", "AG", "AT", "CC"];
        let rows = AtomicUsize::new(0);
        let matrix = DistanceMatrix::compute_with_progress(&seqs, |_| {
            rows.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(matrix.len(), 4);
        assert_eq!(rows.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_empty_input() {
        let seqs: Vec<Vec<u8>> = Vec::new();
        let matrix = DistanceMatrix::compute(&seqs);
        assert!(matrix.is_empty());
    }
}
