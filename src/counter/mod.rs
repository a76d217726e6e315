//! Row reading and counting for CSV files.

use crate::error::{Error, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub const READER_BUFFER_SIZE: usize = 256 * 1024;

/// Where the scanner is inside the current record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

impl Scan {
    /// Advance over `bytes`; a newline outside quotes ends the record.
    fn advance(mut self, bytes: &[u8]) -> Self {
        for &b in bytes {
            self = match (self, b) {
                (Scan::Quoted, b'"') => Scan::QuoteInQuoted,
                (Scan::Quoted, _) => Scan::Quoted,
                (Scan::QuoteInQuoted, b'"') => Scan::Quoted,
                (Scan::FieldStart, b'"') => Scan::Quoted,
                (_, b',') | (_, b'\n') => Scan::FieldStart,
                _ => Scan::Unquoted,
            };
        }
        self
    }
}

/// Headerless, ragged-tolerant CSV row reader.
///
/// Every record is a row, the first one included, so a header line is just
/// another row to callers. A blank line is an empty row (no fields) rather
/// than being skipped, so counting and splitting see every line.
pub struct RowReader {
    path: PathBuf,
    input: BufReader<File>,
    parser: csv::ReaderBuilder,
    raw: Vec<u8>,
    bytes_read: u64,
}

impl RowReader {
    /// Read the next row into `row`. Returns `false` at end of input.
    pub fn read_row(&mut self, row: &mut StringRecord) -> Result<bool> {
        self.raw.clear();
        let mut scan = Scan::FieldStart;
        loop {
            let start = self.raw.len();
            let n = self.input.read_until(b'\n', &mut self.raw)?;
            if n == 0 {
                break;
            }
            self.bytes_read += n as u64;
            scan = scan.advance(&self.raw[start..]);
            // Keep reading only while a quoted field spans the line break.
            if scan != Scan::Quoted {
                break;
            }
        }

        if self.raw.is_empty() {
            return Ok(false);
        }
        if matches!(self.raw.as_slice(), b"\n" | b"\r\n") {
            row.clear();
            return Ok(true);
        }

        let mut parser = self.parser.from_reader(self.raw.as_slice());
        match parser.read_record(row) {
            Ok(true) => Ok(true),
            Ok(false) => {
                row.clear();
                Ok(true)
            }
            Err(e) => Err(Error::from_csv(&self.path, e)),
        }
    }

    /// Iterate the remaining rows.
    pub fn rows(&mut self) -> Rows<'_> {
        Rows {
            reader: self,
            done: false,
        }
    }

    /// Bytes consumed from the file so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

/// Row iterator returned by [`RowReader::rows`]. Stops after the first error.
pub struct Rows<'r> {
    reader: &'r mut RowReader,
    done: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut row = StringRecord::new();
        match self.reader.read_row(&mut row) {
            Ok(true) => Some(Ok(row)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Open `path` for row-by-row reading.
pub fn open_rows(path: &Path) -> Result<RowReader> {
    let file = File::open(path).map_err(|e| Error::from_open(path, e))?;
    let mut parser = csv::ReaderBuilder::new();
    parser.has_headers(false).flexible(true);
    Ok(RowReader {
        path: path.to_path_buf(),
        input: BufReader::with_capacity(READER_BUFFER_SIZE, file),
        parser,
        raw: Vec::new(),
        bytes_read: 0,
    })
}

/// Count every row in a CSV file, header and blank lines included.
///
/// Fails with `NotFound` if the file is missing and `Format` if it is not
/// valid UTF-8 CSV.
pub fn count_rows(path: &Path) -> Result<u64> {
    let mut reader = open_rows(path)?;
    let mut record = StringRecord::new();
    let mut rows: u64 = 0;

    while reader.read_row(&mut record)? {
        rows += 1;
    }

    Ok(rows)
}
