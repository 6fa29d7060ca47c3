//! Exemplar-based clustering by affinity propagation.
//!
//! Two message matrices are exchanged over the similarity matrix:
//!
//! - responsibility `r(i, k)`: how well `k` would serve as exemplar of `i`,
//!   compared with every other candidate for `i`;
//! - availability `a(i, k)`: how much support `k` collects from other points
//!   for being an exemplar.
//!
//! Each iteration recomputes all responsibilities from the current
//! availabilities, then all availabilities from the new responsibilities.
//! Both are damped: `m = damping * m_old + (1 - damping) * m_new`.
//! Points with `r(k, k) + a(k, k) > 0` are exemplars; every other point joins
//! the exemplar maximising `r(i, k) + a(i, k)`, lowest index on ties. The run
//! has converged once that assignment is unchanged for `convergence_window`
//! consecutive iterations.

use crate::core::config::ClusteringConfig;
use crate::core::similarity::SimilarityMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    pub exemplar: usize,
    /// Fragment indices, ascending
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutcome {
    /// Ordered by ascending exemplar index; `clusters[c].id == c`
    pub clusters: Vec<Cluster>,
    /// Cluster id of every point
    pub labels: Vec<usize>,
    pub iterations: usize,
    pub converged: bool,
    /// No exemplar emerged and every point was put into a single cluster
    pub no_exemplars: bool,
}

#[derive(Debug, Clone)]
pub struct AffinityPropagation {
    damping: f64,
    max_iterations: usize,
    convergence_window: usize,
}

impl Default for AffinityPropagation {
    fn default() -> Self {
        Self::new()
    }
}

impl AffinityPropagation {
    pub fn new() -> Self {
        Self {
            damping: 0.75,
            max_iterations: 200,
            convergence_window: 15,
        }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self::new()
            .with_damping(config.damping)
            .with_max_iterations(config.max_iterations)
            .with_convergence_window(config.convergence_window)
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_convergence_window(mut self, window: usize) -> Self {
        self.convergence_window = window;
        self
    }

    pub fn fit(&self, similarity: &SimilarityMatrix) -> ClusterOutcome {
        let n = similarity.len();

        if n <= 1 {
            return ClusterOutcome {
                clusters: (0..n)
                    .map(|i| Cluster {
                        id: 0,
                        exemplar: i,
                        members: vec![i],
                    })
                    .collect(),
                labels: vec![0; n],
                iterations: 0,
                converged: true,
                no_exemplars: false,
            };
        }

        let mut responsibility = vec![0.0f64; n * n];
        let mut availability = vec![0.0f64; n * n];

        let mut assignment: Option<Vec<usize>> = None;
        let mut stable_for = 0usize;
        let mut iterations = 0usize;
        let mut converged = false;

        for iteration in 1..=self.max_iterations {
            iterations = iteration;

            self.update_responsibilities(similarity, &availability, &mut responsibility);
            self.update_availabilities(n, &responsibility, &mut availability);

            let current = assign_exemplars(n, &responsibility, &availability);
            if current == assignment {
                stable_for += 1;
            } else {
                stable_for = 1;
            }
            assignment = current;

            if iteration % 25 == 0 {
                tracing::debug!(
                    iteration,
                    stable_for,
                    exemplars = assignment.as_ref().map(|a| count_exemplars(a)).unwrap_or(0),
                    "affinity propagation progress"
                );
            }

            if assignment.is_some() && stable_for >= self.convergence_window {
                converged = true;
                break;
            }
        }

        tracing::debug!(iterations, converged, "affinity propagation finished");

        match assignment {
            Some(exemplar_of) => build_clusters(exemplar_of, iterations, converged),
            None => {
                // Fall back to one cluster around the strongest self-evidence
                let exemplar = (0..n)
                    .fold(None::<(usize, f64)>, |best, k| {
                        let evidence = responsibility[k * n + k] + availability[k * n + k];
                        match best {
                            Some((_, v)) if v >= evidence => best,
                            _ => Some((k, evidence)),
                        }
                    })
                    .map(|(k, _)| k)
                    .unwrap_or(0);

                ClusterOutcome {
                    clusters: vec![Cluster {
                        id: 0,
                        exemplar,
                        members: (0..n).collect(),
                    }],
                    labels: vec![0; n],
                    iterations,
                    converged,
                    no_exemplars: true,
                }
            }
        }
    }

    fn update_responsibilities(
        &self,
        similarity: &SimilarityMatrix,
        availability: &[f64],
        responsibility: &mut [f64],
    ) {
        let n = similarity.len();
        let damping = self.damping;

        responsibility
            .par_chunks_mut(n)
            .zip(availability.par_chunks(n))
            .enumerate()
            .for_each(|(i, (r_row, a_row))| {
                let s_row = similarity.row(i);

                // Best and runner-up of a(i, k) + s(i, k); first index wins ties
                let mut best = f64::NEG_INFINITY;
                let mut best_k = 0;
                let mut second = f64::NEG_INFINITY;
                for k in 0..n {
                    let value = a_row[k] + s_row[k];
                    if value > best {
                        second = best;
                        best = value;
                        best_k = k;
                    } else if value > second {
                        second = value;
                    }
                }

                for k in 0..n {
                    let competitor = if k == best_k { second } else { best };
                    let fresh = s_row[k] - competitor;
                    r_row[k] = damping * r_row[k] + (1.0 - damping) * fresh;
                }
            });
    }

    fn update_availabilities(&self, n: usize, responsibility: &[f64], availability: &mut [f64]) {
        let damping = self.damping;

        for k in 0..n {
            let positive = |i: usize| {
                let r = responsibility[i * n + k];
                if i == k {
                    r
                } else {
                    r.max(0.0)
                }
            };
            let column_sum: f64 = (0..n).map(positive).sum();

            for i in 0..n {
                let mut fresh = column_sum - positive(i);
                if i != k {
                    fresh = fresh.min(0.0);
                }
                let cell = &mut availability[i * n + k];
                *cell = damping * *cell + (1.0 - damping) * fresh;
            }
        }
    }
}

/// Exemplar index for every point, or `None` if no point is an exemplar.
fn assign_exemplars(n: usize, responsibility: &[f64], availability: &[f64]) -> Option<Vec<usize>> {
    let evidence = |i: usize, k: usize| responsibility[i * n + k] + availability[i * n + k];

    let exemplars: Vec<usize> = (0..n).filter(|&k| evidence(k, k) > 0.0).collect();
    if exemplars.is_empty() {
        return None;
    }

    let mut is_exemplar = vec![false; n];
    for &k in &exemplars {
        is_exemplar[k] = true;
    }

    let assignment = (0..n)
        .map(|i| {
            if is_exemplar[i] {
                return i;
            }
            let mut best_k = exemplars[0];
            let mut best = evidence(i, best_k);
            for &k in &exemplars[1..] {
                let value = evidence(i, k);
                if value > best {
                    best = value;
                    best_k = k;
                }
            }
            best_k
        })
        .collect();

    Some(assignment)
}

fn count_exemplars(exemplar_of: &[usize]) -> usize {
    exemplar_of
        .iter()
        .enumerate()
        .filter(|&(i, &k)| i == k)
        .count()
}

fn build_clusters(exemplar_of: Vec<usize>, iterations: usize, converged: bool) -> ClusterOutcome {
    let n = exemplar_of.len();

    let mut exemplars: Vec<usize> = exemplar_of.clone();
    exemplars.sort_unstable();
    exemplars.dedup();

    let mut cluster_of_exemplar = vec![usize::MAX; n];
    let mut clusters: Vec<Cluster> = exemplars
        .iter()
        .enumerate()
        .map(|(id, &exemplar)| {
            cluster_of_exemplar[exemplar] = id;
            Cluster {
                id,
                exemplar,
                members: Vec::new(),
            }
        })
        .collect();

    let labels: Vec<usize> = exemplar_of
        .iter()
        .enumerate()
        .map(|(i, &exemplar)| {
            let id = cluster_of_exemplar[exemplar];
            clusters[id].members.push(i);
            id
        })
        .collect();

    ClusterOutcome {
        clusters,
        labels,
        iterations,
        converged,
        no_exemplars: false,
    }
}
