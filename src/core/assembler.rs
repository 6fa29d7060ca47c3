/// Turns groups into synthesis orders
use crate::bio::fragment::Fragment;
use crate::bio::sites::{pad_without_sites, RecognitionSites, SiteSubstitution};
use crate::core::config::{PaddingConfig, SiteConfig};
use crate::core::grouping::Group;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// One output row: the concatenated, site-substituted sequence of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledSequence {
    pub group_id: usize,
    pub names: Vec<String>,
    pub authors: Vec<String>,
    pub sequence: String,
}

impl AssembledSequence {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssemblyReport {
    pub records: Vec<AssembledSequence>,
    pub substitutions: SiteSubstitution,
    /// Groups where padding had to complete a recognition site
    pub constrained_groups: Vec<usize>,
}

pub struct SequenceAssembler {
    sites: RecognitionSites,
    forbidden: Vec<Vec<u8>>,
    min_length: Option<usize>,
    seed: u64,
}

impl SequenceAssembler {
    pub fn new(sites: RecognitionSites) -> Self {
        let forbidden = sites.patterns();
        Self {
            sites,
            forbidden,
            min_length: None,
            seed: 0,
        }
    }

    pub fn from_config(sites: &SiteConfig, padding: &PaddingConfig) -> Self {
        Self::new(RecognitionSites::new(
            &sites.site1,
            &sites.site2,
            &sites.site3,
            sites.reverse_complement,
        ))
        .with_padding(padding.min_length, padding.seed)
    }

    pub fn with_padding(mut self, min_length: Option<usize>, seed: u64) -> Self {
        self.min_length = min_length;
        self.seed = seed;
        self
    }

    /// Assemble every group in order. `fragments` is indexed by fragment id.
    ///
    /// One RNG is seeded per call, so padding depends only on the seed and
    /// the group order.
    pub fn assemble(&self, groups: &[Group], fragments: &[Fragment]) -> AssemblyReport {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut report = AssemblyReport::default();

        for group in groups {
            let (record, stats, clean) = self.assemble_group(group, fragments, &mut rng);
            report.substitutions.forward_occurrences += stats.forward_occurrences;
            report.substitutions.reverse_occurrences += stats.reverse_occurrences;
            report.substitutions.replaced += stats.replaced;
            if !clean {
                report.constrained_groups.push(group.id);
            }
            report.records.push(record);
        }

        report
    }

    fn assemble_group(
        &self,
        group: &Group,
        fragments: &[Fragment],
        rng: &mut StdRng,
    ) -> (AssembledSequence, SiteSubstitution, bool) {
        let members: Vec<&Fragment> = group.members.iter().map(|&id| &fragments[id]).collect();

        let concatenated: Vec<u8> = members
            .iter()
            .flat_map(|f| f.sequence.iter().copied())
            .collect();
        let (mut sequence, stats) = self.sites.substitute(&concatenated);

        let clean = match self.min_length {
            Some(min_length) => pad_without_sites(&mut sequence, min_length, &self.forbidden, rng),
            None => true,
        };

        let record = AssembledSequence {
            group_id: group.id,
            names: members.iter().map(|f| f.name.clone()).collect(),
            authors: members.iter().map(|f| f.author.clone()).collect(),
            // Only ACGT bytes reach this point
            sequence: String::from_utf8_lossy(&sequence).into_owned(),
        };

        (record, stats, clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::fragment::{load_fragments, FragmentRecord};
    use pretty_assertions::assert_eq;

    fn fragments(seqs: &[(&str, &str)]) -> Vec<Fragment> {
        let records: Vec<FragmentRecord> = seqs
            .iter()
            .map(|(name, seq)| FragmentRecord::new(*name, format!("{}_author", name), *seq))
            .collect();
        load_fragments(&records).unwrap()
    }

    #[test]
    fn test_second_member_site_replaced() {
        let frags = fragments(&[("FA", "AACGTCTCAA"), ("FB", "TTCGTCTCTT")]);
        let group = Group {
            id: 0,
            members: vec![0, 1],
        };

        let report = SequenceAssembler::new(RecognitionSites::default()).assemble(&[group], &frags);

        assert_eq!(report.records.len(), 1);
        let record = &report.records[0];
        assert_eq!(record.sequence, "AACGTCTCAATTGAAGACTTT");
        assert_eq!(record.names, vec!["FA", "FB"]);
        assert_eq!(record.authors, vec!["FA_author", "FB_author"]);
        assert_eq!(report.substitutions.replaced, 1);
    }

    #[test]
    fn test_three_members_get_three_site_types() {
        let frags = fragments(&[("a", "CGTCTCA"), ("b", "CGTCTCC"), ("c", "CGTCTCG")]);
        let group = Group {
            id: 4,
            members: vec![0, 1, 2],
        };

        let report = SequenceAssembler::new(RecognitionSites::default()).assemble(&[group], &frags);

        assert_eq!(report.records[0].sequence, "CGTCTCAGAAGACTCACCTGCTTAG");
        assert_eq!(report.records[0].group_id, 4);
    }

    #[test]
    fn test_site_spanning_member_boundary_is_counted() {
        let frags = fragments(&[("a", "CGTCTCAACGT"), ("b", "CTCAA")]);
        let group = Group {
            id: 0,
            members: vec![0, 1],
        };

        let report = SequenceAssembler::new(RecognitionSites::default()).assemble(&[group], &frags);

        assert_eq!(report.records[0].sequence, "CGTCTCAAGAAGACTAA");
    }

    #[test]
    fn test_padding_applied_and_seeded() {
        let frags = fragments(&[("a", "ACGT")]);
        let groups = vec![Group {
            id: 0,
            members: vec![0],
        }];
        let padding = PaddingConfig {
            min_length: Some(40),
            seed: 9,
        };
        let assembler = SequenceAssembler::from_config(&SiteConfig::default(), &padding);

        let first = assembler.assemble(&groups, &frags);
        let second = assembler.assemble(&groups, &frags);

        assert_eq!(first.records[0].len(), 40);
        assert!(first.records[0].sequence.starts_with("ACGT"));
        assert_eq!(first.records[0].sequence, second.records[0].sequence);
        assert!(first.constrained_groups.is_empty());
    }

    #[test]
    fn test_long_sequences_not_padded() {
        let frags = fragments(&[("a", "ACGTACGTAC")]);
        let groups = vec![Group {
            id: 0,
            members: vec![0],
        }];
        let assembler = SequenceAssembler::new(RecognitionSites::default()).with_padding(Some(5), 1);

        let report = assembler.assemble(&groups, &frags);
        assert_eq!(report.records[0].sequence, "ACGTACGTAC");
    }
}
