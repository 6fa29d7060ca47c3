/// Similarity matrix fed to the cluster engine
use crate::bio::distance::DistanceMatrix;
use crate::core::config::Preference;

/// `s(i, k) = -d(i, k)` off the diagonal, the preference on it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f64>,
    preference: f64,
}

impl SimilarityMatrix {
    pub fn from_distances(distances: &DistanceMatrix, preference: Preference) -> Self {
        let size = distances.len();
        let mut values = Vec::with_capacity(size * size);
        for i in 0..size {
            values.extend(distances.row(i).iter().map(|&d| -(d as f64)));
        }

        let mut matrix = Self {
            size,
            values,
            preference: 0.0,
        };

        let preference = match preference {
            Preference::Fixed(p) => p,
            Preference::Auto => matrix.median_off_diagonal().unwrap_or(0.0),
        };
        matrix.set_preference(preference);
        matrix
    }

    fn set_preference(&mut self, preference: f64) {
        self.preference = preference;
        for k in 0..self.size {
            self.values[k * self.size + k] = preference;
        }
    }

    /// Median of all `i != k` entries, averaging the middle pair for even counts.
    pub fn median_off_diagonal(&self) -> Option<f64> {
        let mut off: Vec<f64> = (0..self.size)
            .flat_map(|i| (0..self.size).filter(move |&k| k != i).map(move |k| (i, k)))
            .map(|(i, k)| self.get(i, k))
            .collect();

        if off.is_empty() {
            return None;
        }

        off.sort_by(|a, b| a.total_cmp(b));
        let mid = off.len() / 2;
        Some(if off.len() % 2 == 0 {
            (off[mid - 1] + off[mid]) / 2.0
        } else {
            off[mid]
        })
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn preference(&self) -> f64 {
        self.preference
    }

    pub fn get(&self, i: usize, k: usize) -> f64 {
        self.values[i * self.size + k]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }
}
