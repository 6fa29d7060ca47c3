/// Delimited fragment tables: `Name, Author, Sequence` in, grouped orders out
use crate::bio::fragment::FragmentRecord;
use crate::core::assembler::AssembledSequence;
use crate::{FragGroupError, Result};
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const NAME_COLUMN: &str = "Name";
pub const AUTHOR_COLUMN: &str = "Author";
pub const SEQUENCE_COLUMN: &str = "Sequence";

/// Separator used when a group's names/authors share one cell.
pub const LIST_SEPARATOR: &str = "+";

struct ColumnIndex {
    name: usize,
    author: usize,
    sequence: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
                .ok_or_else(|| FragGroupError::MalformedInput {
                    record: 0,
                    name: "<header>".to_string(),
                    reason: format!(
                        "missing required column '{}' (found: {})",
                        column,
                        headers.iter().collect::<Vec<_>>().join(", ")
                    ),
                })
        };

        Ok(Self {
            name: find(NAME_COLUMN)?,
            author: find(AUTHOR_COLUMN)?,
            sequence: find(SEQUENCE_COLUMN)?,
        })
    }
}

/// Read fragment records from a delimited file with a header row.
pub fn read_fragments<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<FragmentRecord>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_fragments_from_reader(file, delimiter)
}

pub fn read_fragments_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Vec<FragmentRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(reader.headers()?)?;
    let mut records = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let row_record = result?;
        let field = |index: usize, column: &str| {
            row_record
                .get(index)
                .map(str::to_string)
                .ok_or_else(|| FragGroupError::MalformedInput {
                    record: row + 1,
                    name: row_record.get(columns.name).unwrap_or("<unnamed>").to_string(),
                    reason: format!("missing required field '{}'", column),
                })
        };

        records.push(FragmentRecord {
            name: field(columns.name, NAME_COLUMN)?,
            author: field(columns.author, AUTHOR_COLUMN)?,
            sequence: field(columns.sequence, SEQUENCE_COLUMN)?,
        });
    }

    Ok(records)
}

/// Write one row per assembled order.
pub fn write_results<P: AsRef<Path>>(
    path: P,
    records: &[AssembledSequence],
    delimiter: u8,
) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_results_to_writer(file, records, delimiter)
}

pub fn write_results_to_writer<W: Write>(
    writer: W,
    records: &[AssembledSequence],
    delimiter: u8,
) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    writer.write_record(["GroupId", "Names", "Authors", "Sequence", "Length"])?;
    for record in records {
        writer.write_record([
            record.group_id.to_string(),
            record.names.join(LIST_SEPARATOR),
            record.authors.join(LIST_SEPARATOR),
            record.sequence.clone(),
            record.sequence.len().to_string(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

/// `<dir>/<stem>_grouped.csv` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "fragments".to_string());
    input.with_file_name(format!("{}_grouped.csv", stem))
}
