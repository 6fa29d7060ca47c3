pub mod affinity;
pub mod assembler;
pub mod config;
pub mod grouping;
pub mod pipeline;
pub mod similarity;

pub use affinity::{AffinityPropagation, Cluster, ClusterOutcome};
pub use assembler::{AssembledSequence, SequenceAssembler};
pub use config::Config;
pub use grouping::{aggressive_merge, form_groups, Group};
pub use pipeline::{run_pipeline, BatchResult, Pipeline, PipelineWarning};
pub use similarity::SimilarityMatrix;
