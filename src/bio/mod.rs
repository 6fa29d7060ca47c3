pub mod distance;
pub mod fragment;
pub mod sites;
pub mod table;

pub use distance::{levenshtein, DistanceMatrix};
pub use fragment::{load_fragments, reverse_complement, Fragment, FragmentRecord};
pub use sites::{RecognitionSites, SiteSubstitution};
