//! Recognition-site handling for assembled synthesis orders.
//!
//! An order built from several fragments usually carries the same assembly
//! site once per fragment. To keep the sites from interfering with each other
//! the second and third occurrence of the primary site are swapped for two
//! alternative sites with the same role. Counting is global over the
//! concatenated sequence, left to right, without overlaps. Reverse-complement
//! occurrences come from a separate scan with their own counter and are
//! swapped for the reverse complements of the alternatives.

use crate::bio::fragment::{reverse_complement, NUCLEOTIDES};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default primary site (BsmBI).
pub const DEFAULT_SITE1: &str = "CGTCTC";
/// Default replacement for the second occurrence (BbsI).
pub const DEFAULT_SITE2: &str = "GAAGACT";
/// Default replacement for the third occurrence (BspMI).
pub const DEFAULT_SITE3: &str = "ACCTGCTTA";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSites {
    primary: Vec<u8>,
    second: Vec<u8>,
    third: Vec<u8>,
    primary_rc: Option<Vec<u8>>,
    second_rc: Vec<u8>,
    third_rc: Vec<u8>,
}

/// Occurrence counts seen while substituting one sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSubstitution {
    pub forward_occurrences: usize,
    pub reverse_occurrences: usize,
    pub replaced: usize,
}

impl RecognitionSites {
    /// Build from the three patterns. When `match_reverse` is set and
    /// the primary site is not palindromic, its reverse complement is
    /// scanned as well.
    pub fn new(site1: &str, site2: &str, site3: &str, match_reverse: bool) -> Self {
        let primary = site1.to_ascii_uppercase().into_bytes();
        let second = site2.to_ascii_uppercase().into_bytes();
        let third = site3.to_ascii_uppercase().into_bytes();

        let rc = reverse_complement(&primary);
        let primary_rc = (match_reverse && rc != primary).then_some(rc);

        Self {
            second_rc: reverse_complement(&second),
            third_rc: reverse_complement(&third),
            primary,
            second,
            third,
            primary_rc,
        }
    }

    /// Every pattern, in both orientations, that padding must not create.
    pub fn patterns(&self) -> Vec<Vec<u8>> {
        let mut patterns = Vec::with_capacity(6);
        for site in [&self.primary, &self.second, &self.third] {
            patterns.push(site.clone());
            let rc = reverse_complement(site);
            if &rc != site {
                patterns.push(rc);
            }
        }
        patterns
    }

    /// Replace the 2nd/3rd primary occurrence with the alternative sites.
    ///
    /// Forward and reverse-complement occurrences come from two independent
    /// scans. Where a replaced forward span overlaps a replaced reverse span
    /// the forward replacement is applied. Occurrences past the third are
    /// left as they are.
    pub fn substitute(&self, sequence: &[u8]) -> (Vec<u8>, SiteSubstitution) {
        let mut stats = SiteSubstitution::default();

        let forward = find_occurrences(sequence, &self.primary);
        stats.forward_occurrences = forward.len();
        let mut edits = replacements(&forward, self.primary.len(), &self.second, &self.third);

        if let Some(primary_rc) = &self.primary_rc {
            let reverse = find_occurrences(sequence, primary_rc);
            stats.reverse_occurrences = reverse.len();
            let reverse_edits: Vec<Replacement> =
                replacements(&reverse, primary_rc.len(), &self.second_rc, &self.third_rc)
                    .into_iter()
                    .filter(|edit| !edits.iter().any(|kept| kept.overlaps(edit)))
                    .collect();
            edits.extend(reverse_edits);
        }

        edits.sort_by_key(|edit| edit.start);
        stats.replaced = edits.len();

        let mut output = Vec::with_capacity(sequence.len() + 8);
        let mut cursor = 0;
        for edit in &edits {
            output.extend_from_slice(&sequence[cursor..edit.start]);
            output.extend_from_slice(edit.site);
            cursor = edit.end;
        }
        output.extend_from_slice(&sequence[cursor..]);

        (output, stats)
    }
}

/// A span of the input to be swapped for `site`.
struct Replacement<'a> {
    start: usize,
    end: usize,
    site: &'a [u8],
}

impl Replacement<'_> {
    fn overlaps(&self, other: &Replacement) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Start positions of `pattern`, left to right, without overlaps.
fn find_occurrences(sequence: &[u8], pattern: &[u8]) -> Vec<usize> {
    let mut hits = Vec::new();
    if pattern.is_empty() {
        return hits;
    }

    let mut pos = 0;
    while pos + pattern.len() <= sequence.len() {
        if sequence[pos..].starts_with(pattern) {
            hits.push(pos);
            pos += pattern.len();
        } else {
            pos += 1;
        }
    }
    hits
}

fn replacements<'a>(
    hits: &[usize],
    len: usize,
    second: &'a [u8],
    third: &'a [u8],
) -> Vec<Replacement<'a>> {
    hits.iter()
        .enumerate()
        .filter_map(|(nth, &start)| {
            let site = match nth {
                1 => second,
                2 => third,
                _ => return None,
            };
            Some(Replacement {
                start,
                end: start + len,
                site,
            })
        })
        .collect()
}

impl Default for RecognitionSites {
    fn default() -> Self {
        Self::new(DEFAULT_SITE1, DEFAULT_SITE2, DEFAULT_SITE3, true)
    }
}

/// Extend `sequence` to `min_length` with random bases that never complete
/// one of `forbidden`.
///
/// Returns `false` if at some position every base would have completed a
/// forbidden pattern; the first shuffled candidate is used there.
pub fn pad_without_sites<R: Rng>(
    sequence: &mut Vec<u8>,
    min_length: usize,
    forbidden: &[Vec<u8>],
    rng: &mut R,
) -> bool {
    let mut clean = true;
    let mut candidates = NUCLEOTIDES.to_vec();

    while sequence.len() < min_length {
        candidates.shuffle(rng);
        let chosen = candidates
            .iter()
            .copied()
            .find(|&base| !completes_pattern(sequence, base, forbidden));

        match chosen {
            Some(base) => sequence.push(base),
            None => {
                clean = false;
                sequence.push(candidates[0]);
            }
        }
    }

    clean
}

fn completes_pattern(sequence: &[u8], base: u8, patterns: &[Vec<u8>]) -> bool {
    patterns.iter().any(|pattern| match pattern.split_last() {
        Some((&last, head)) => {
            last == base && sequence.len() >= head.len() && sequence.ends_with(head)
        }
        None => false,
    })
}
