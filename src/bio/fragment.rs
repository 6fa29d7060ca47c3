use crate::{FragGroupError, Result};
use serde::{Deserialize, Serialize};

/// Accepted nucleotide alphabet (input is upper-cased before the check).
pub const NUCLEOTIDES: &[u8] = b"ACGT";

/// A fragment row as supplied by the caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub name: String,
    pub author: String,
    pub sequence: String,
}

impl FragmentRecord {
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        sequence: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            sequence: sequence.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fragment {
    pub id: usize,
    pub name: String,
    pub author: String,
    pub sequence: Vec<u8>,
}

impl Fragment {
    /// Validate a record and turn it into a fragment with the given index.
    ///
    /// Names and authors are trimmed, the sequence is upper-cased. An empty
    /// name, an empty sequence or any character outside `ACGT` is rejected
    /// with `MalformedInput`, which carries the 1-based record number.
    pub fn from_record(id: usize, record: &FragmentRecord) -> Result<Self> {
        let name = record.name.trim().to_string();
        let malformed = |reason: String| FragGroupError::MalformedInput {
            record: id + 1,
            name: if name.is_empty() {
                "<unnamed>".to_string()
            } else {
                name.clone()
            },
            reason,
        };

        if name.is_empty() {
            return Err(malformed("missing required field 'Name'".to_string()));
        }

        let sequence: Vec<u8> = record.sequence.trim().bytes().map(|b| b.to_ascii_uppercase()).collect();
        if sequence.is_empty() {
            return Err(malformed("empty sequence".to_string()));
        }

        if let Some(pos) = sequence.iter().position(|b| !NUCLEOTIDES.contains(b)) {
            let bad = record.sequence.trim()[pos..].chars().next().unwrap_or('?');
            return Err(malformed(format!(
                "invalid character '{}' at position {}",
                bad,
                pos + 1
            )));
        }

        Ok(Self {
            id,
            name,
            author: record.author.trim().to_string(),
            sequence,
        })
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Validate every record up front; the first bad record aborts the run.
pub fn load_fragments(records: &[FragmentRecord]) -> Result<Vec<Fragment>> {
    records
        .iter()
        .enumerate()
        .map(|(id, record)| Fragment::from_record(id, record))
        .collect()
}

pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'a' => b't',
        b't' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        other => other,
    }
}

pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}
