//! Pipe-delimited record format of the cache file.
//!
//! One record per line: `<title>|<year>|<poster_path>`, no header. Fields
//! containing the delimiter, a double quote or a line break are wrapped in
//! double quotes with inner quotes doubled.

use std::io::{self, Write};

use csv::{ReaderBuilder, Terminator, WriterBuilder};

use super::{CacheError, CacheRecord};

const DELIMITER: u8 = b'|';

/// Fields of one record as they appear in the file, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRecord {
    /// Whether this record is for the given key, comparing the year as text.
    pub fn matches(&self, title: &str, year: &str) -> bool {
        self.fields.len() >= 3 && self.fields[0] == title && self.fields[1] == year
    }

    pub fn into_record(self) -> Result<CacheRecord, CacheError> {
        let line = self.line;
        let mut fields = self.fields.into_iter();
        let (Some(title), Some(year), Some(poster_path)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(CacheError::Malformed {
                line,
                reason: "expected 3 fields".to_string(),
            });
        };

        let year = year.trim().parse::<u32>().map_err(|_| CacheError::Malformed {
            line,
            reason: format!("invalid year '{}'", year),
        })?;

        Ok(CacheRecord {
            title,
            year,
            poster_path,
        })
    }
}

/// Write one terminated record to `out` and hand the writer back.
pub(crate) fn write_record<W: Write>(
    out: W,
    title: &str,
    year: u32,
    poster_path: &str,
) -> io::Result<W> {
    let mut writer = WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    let year = year.to_string();
    writer.write_record([title, year.as_str(), poster_path])?;
    writer.into_inner().map_err(|e| e.into_error())
}

fn line_of(position: Option<&csv::Position>) -> usize {
    position.map_or(0, |p| p.line() as usize)
}

/// Split the whole file into raw records.
///
/// `\n` and `\r\n` terminators are both accepted, blank lines are skipped and
/// quoted fields may span lines. Field counts are checked later, by
/// [`RawRecord::into_record`].
pub(crate) fn parse_records(content: &str) -> Result<Vec<RawRecord>, CacheError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|result| {
            let record = result.map_err(|e| CacheError::Malformed {
                line: line_of(e.position()),
                reason: e.to_string(),
            })?;
            Ok(RawRecord {
                line: line_of(record.position()),
                fields: record.iter().map(str::to_string).collect(),
            })
        })
        .collect()
}
