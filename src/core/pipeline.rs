/// Grouping pipeline: fragments in, synthesis orders out
use crate::bio::distance::DistanceMatrix;
use crate::bio::fragment::{load_fragments, Fragment, FragmentRecord};
use crate::core::{
    affinity::{AffinityPropagation, Cluster, ClusterOutcome},
    config::Config,
    grouping::{aggressive_merge, form_groups, Group, GroupingOptions},
    similarity::SimilarityMatrix,
};
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::core::assembler::{AssembledSequence, AssemblyReport, SequenceAssembler};

/// Non-fatal conditions reported alongside a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// Clustering hit the iteration cap before the assignment settled
    Convergence { iterations: usize },
    /// No exemplar emerged; every clustered fragment was put in one cluster
    NoExemplars,
    /// Padding for this group could not avoid completing a site
    PaddingConstrained { group_id: usize },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::Convergence { iterations } => write!(
                f,
                "clustering did not converge within {} iterations; using the last assignment",
                iterations
            ),
            PipelineWarning::NoExemplars => {
                write!(f, "clustering found no exemplars; all fragments placed in one cluster")
            }
            PipelineWarning::PaddingConstrained { group_id } => write!(
                f,
                "padding for group {} could not avoid a recognition site",
                group_id
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// One record per group, ordered by `group_id`
    pub records: Vec<AssembledSequence>,
    /// Cluster partition, members given as fragment ids
    pub clusters: Vec<Cluster>,
    pub warnings: Vec<PipelineWarning>,
    pub iterations: usize,
    pub converged: bool,
    /// Fragments that bypassed clustering because of their length
    pub standalone: Vec<usize>,
}

impl BatchResult {
    pub fn group_count(&self) -> usize {
        self.records.len()
    }

    pub fn fragment_count(&self) -> usize {
        self.records.iter().map(|r| r.names.len()).sum()
    }
}

/// Run the whole pipeline with progress output disabled.
pub fn run_pipeline(records: &[FragmentRecord], config: &Config) -> Result<BatchResult> {
    Pipeline::new(config.clone()).with_silent(true).run(records)
}

pub struct Pipeline {
    config: Config,
    progress_callback: Option<Box<dyn Fn(&str, f64) + Send + Sync>>,
    silent: bool,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            progress_callback: None,
            silent: false,
        }
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, f64) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    fn report(&self, stage: &str, percent: f64) {
        if let Some(ref callback) = self.progress_callback {
            callback(stage, percent);
        }
    }

    pub fn run(&self, records: &[FragmentRecord]) -> Result<BatchResult> {
        self.config.validate()?;

        self.report("Validating fragments", 0.0);
        let fragments = load_fragments(records)?;
        tracing::info!(fragments = fragments.len(), "loaded fragments");

        let (clustered, standalone) = self.split_standalone(&fragments);
        if !standalone.is_empty() {
            tracing::info!(
                count = standalone.len(),
                "fragments exceed the standalone length and bypass clustering"
            );
        }

        self.report("Computing distances", 10.0);
        let distances = self.compute_distances(&fragments, &clustered);

        self.report("Clustering", 40.0);
        let similarity = SimilarityMatrix::from_distances(&distances, self.config.clustering.preference);
        tracing::debug!(preference = similarity.preference(), "similarity matrix ready");

        let outcome = self.cluster(&similarity);
        let clusters = to_fragment_ids(outcome.clusters.clone(), &clustered);
        tracing::info!(
            clusters = clusters.len(),
            iterations = outcome.iterations,
            converged = outcome.converged,
            "clustering finished"
        );

        let mut warnings = Vec::new();
        if !outcome.converged {
            warnings.push(PipelineWarning::Convergence {
                iterations: outcome.iterations,
            });
        }
        if outcome.no_exemplars {
            warnings.push(PipelineWarning::NoExemplars);
        }

        self.report("Forming groups", 70.0);
        let groups = self.build_groups(&clusters, &fragments, &standalone);
        tracing::info!(groups = groups.len(), "groups formed");

        self.report("Assembling sequences", 85.0);
        let report = SequenceAssembler::from_config(&self.config.sites, &self.config.padding)
            .assemble(&groups, &fragments);
        tracing::debug!(
            forward = report.substitutions.forward_occurrences,
            reverse = report.substitutions.reverse_occurrences,
            replaced = report.substitutions.replaced,
            "recognition sites substituted"
        );
        warnings.extend(
            report
                .constrained_groups
                .iter()
                .map(|&group_id| PipelineWarning::PaddingConstrained { group_id }),
        );

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        self.report("Done", 100.0);

        Ok(BatchResult {
            records: report.records,
            clusters,
            warnings,
            iterations: outcome.iterations,
            converged: outcome.converged,
            standalone,
        })
    }

    /// Fragment ids that take part in clustering, and those that don't.
    fn split_standalone(&self, fragments: &[Fragment]) -> (Vec<usize>, Vec<usize>) {
        match self.config.grouping.standalone_length {
            Some(threshold) => fragments
                .iter()
                .map(|f| f.id)
                .partition(|&id| fragments[id].len() < threshold),
            None => (fragments.iter().map(|f| f.id).collect(), Vec::new()),
        }
    }

    fn compute_distances(&self, fragments: &[Fragment], clustered: &[usize]) -> DistanceMatrix {
        let sequences: Vec<&[u8]> = clustered
            .iter()
            .map(|&id| fragments[id].sequence.as_slice())
            .collect();

        let pb = if !self.silent {
            let pb = ProgressBar::new(sequences.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} Computing distances")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let distances = DistanceMatrix::compute_with_progress(&sequences, |_| pb.inc(1));
        pb.finish_and_clear();
        distances
    }

    fn cluster(&self, similarity: &SimilarityMatrix) -> ClusterOutcome {
        let spinner = if !self.silent {
            let pb = ProgressBar::new_spinner();
            pb.set_message(format!("Clustering {} fragments", similarity.len()));
            pb
        } else {
            ProgressBar::hidden()
        };

        let outcome = AffinityPropagation::from_config(&self.config.clustering).fit(similarity);
        spinner.finish_and_clear();
        outcome
    }

    fn build_groups(
        &self,
        clusters: &[Cluster],
        fragments: &[Fragment],
        standalone: &[usize],
    ) -> Vec<Group> {
        let grouping = &self.config.grouping;
        let options = GroupingOptions {
            max_group_size: grouping.max_group_size,
            max_group_length: grouping.max_group_length,
        };

        let mut groups = form_groups(clusters, |id| fragments[id].len(), options);
        if grouping.aggressive {
            let before = groups.len();
            groups = aggressive_merge(groups);
            tracing::info!(before, after = groups.len(), "merged singleton groups");
        }

        for &id in standalone {
            groups.push(Group {
                id: groups.len(),
                members: vec![id],
            });
        }

        groups
    }
}

/// Rewrite cluster members and exemplars from matrix positions to fragment ids.
fn to_fragment_ids(clusters: Vec<Cluster>, ids: &[usize]) -> Vec<Cluster> {
    clusters
        .into_iter()
        .map(|cluster| Cluster {
            id: cluster.id,
            exemplar: ids[cluster.exemplar],
            members: cluster.members.into_iter().map(|m| ids[m]).collect(),
        })
        .collect()
}
