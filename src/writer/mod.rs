//! Row-bounded CSV output.
//!
//! [`ChunkedWriter`] takes rows one at a time and spreads them over a series
//! of files, opening `{prefix}_1.csv`, `{prefix}_2.csv`, ... lazily and
//! closing each one as soon as it holds a full [`RowBudget`]. An optional
//! header row is repeated at the top of every file and never counted
//! against the budget.
//!
//! Each open file is owned by a [`ChunkFile`]; dropping it (including on an
//! early `?` return) flushes and closes the handle, so there is never more
//! than one open write handle and nothing is leaked on error paths. Files
//! that were already finished before an error are left on disk.

use crate::error::{Error, Result};
use crate::record::Record;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const WRITER_BUFFER_SIZE: usize = 256 * 1024;

/// Records buffered per write when streaming a large source into a writer.
/// Only affects buffering, not how rows are distributed over files.
pub const DEFAULT_WRITE_BATCH_SIZE: usize = 100_000;

/// Row limit of a single Excel worksheet.
pub const EXCEL_MAX_ROWS: u64 = 1_048_576;

const DEFAULT_ROW_BUDGET: NonZeroU64 = match NonZeroU64::new(EXCEL_MAX_ROWS) {
    Some(rows) => rows,
    None => unreachable!(),
};

pub const CSV_EXTENSION: &str = "csv";

/// Maximum number of data rows per output file. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowBudget(NonZeroU64);

impl RowBudget {
    pub fn new(rows: u64) -> Result<Self> {
        NonZeroU64::new(rows)
            .map(Self)
            .ok_or_else(|| Error::invalid_argument("row budget must be at least 1"))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Number of files needed to hold `rows` rows under this budget.
    pub fn files_for(self, rows: u64) -> u64 {
        rows.div_ceil(self.get())
    }
}

impl Default for RowBudget {
    fn default() -> Self {
        Self(DEFAULT_ROW_BUDGET)
    }
}

impl fmt::Display for RowBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How output files are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputNaming {
    /// Everything goes to one fixed path.
    Single(PathBuf),
    /// `{dir}/{prefix}_{n}.csv` with `n` counting up from 1.
    Numbered { dir: PathBuf, prefix: String },
}

impl OutputNaming {
    pub fn path_for(&self, suffix: u64) -> PathBuf {
        match self {
            OutputNaming::Single(path) => path.clone(),
            OutputNaming::Numbered { dir, prefix } => {
                dir.join(format!("{}_{}.{}", prefix, suffix, CSV_EXTENSION))
            }
        }
    }
}

/// A finished output file and the number of data rows it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkSummary {
    pub path: PathBuf,
    pub rows: u64,
}

/// One open output file.
pub struct ChunkFile {
    path: PathBuf,
    writer: csv::Writer<BufWriter<File>>,
    rows: u64,
}

impl ChunkFile {
    /// Create (truncating) `path` and write `header` to it if given.
    pub fn create(path: &Path, header: Option<&[String]>) -> Result<Self> {
        let file = File::create(path)?;
        let buffered = BufWriter::with_capacity(WRITER_BUFFER_SIZE, file);
        // Rows copied from an existing file may be ragged; keep them as-is.
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(buffered);

        let mut chunk = Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
        };
        if let Some(header) = header {
            chunk
                .writer
                .write_record(header)
                .map_err(|e| Error::from_csv(&chunk.path, e))?;
        }
        Ok(chunk)
    }

    pub fn write_row<I, T>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(row)
            .map_err(|e| Error::from_csv(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far (header excluded).
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush everything to disk and close the handle.
    pub fn finish(mut self) -> Result<ChunkSummary> {
        self.writer.flush()?;
        Ok(ChunkSummary {
            path: self.path,
            rows: self.rows,
        })
    }
}

/// What a [`ChunkedWriter`] produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub files: Vec<ChunkSummary>,
    pub rows_written: u64,
}

impl WriteSummary {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Writes a row stream to one or more CSV files, rotating on a row budget.
pub struct ChunkedWriter {
    naming: OutputNaming,
    budget: Option<RowBudget>,
    header: Option<Vec<String>>,
    current: Option<ChunkFile>,
    suffix: u64,
    rows_written: u64,
    files: Vec<ChunkSummary>,
}

impl ChunkedWriter {
    /// Rotating writer producing `{dir}/{prefix}_{n}.csv`, each holding at
    /// most `budget` data rows. No file is created until the first row arrives.
    pub fn rotating(dir: impl Into<PathBuf>, prefix: impl Into<String>, budget: RowBudget) -> Self {
        Self::new(
            OutputNaming::Numbered {
                dir: dir.into(),
                prefix: prefix.into(),
            },
            Some(budget),
        )
    }

    /// Writer that puts every row into `path`. The file is created even if no
    /// rows are written, so a header-only file is still produced.
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self::new(OutputNaming::Single(path.into()), None)
    }

    fn new(naming: OutputNaming, budget: Option<RowBudget>) -> Self {
        Self {
            naming,
            budget,
            header: None,
            current: None,
            suffix: 0,
            rows_written: 0,
            files: Vec::new(),
        }
    }

    /// Header row written at the top of every output file.
    pub fn with_header<S: Into<String>>(mut self, header: impl IntoIterator<Item = S>) -> Self {
        self.header = Some(header.into_iter().map(Into::into).collect());
        self
    }

    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Data rows accepted so far, across all files.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Files opened so far, including the one currently open.
    pub fn files_started(&self) -> u64 {
        self.suffix
    }

    pub fn write_row<I, T>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut chunk = match self.current.take() {
            Some(chunk) => chunk,
            None => self.open_next()?,
        };
        chunk.write_row(row)?;
        self.rows_written += 1;

        if self.budget.is_some_and(|budget| chunk.rows() >= budget.get()) {
            self.close(chunk)?;
        } else {
            self.current = Some(chunk);
        }
        Ok(())
    }

    /// Write a generated record. The first record fixes the header when none
    /// was configured; every later record must carry the same field names.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        match self.header {
            Some(ref header) => {
                if !record.same_fields(header) {
                    return Err(Error::invalid_argument(format!(
                        "record fields [{}] do not match header [{}]",
                        record.field_names().join(", "),
                        header.join(", ")
                    )));
                }
            }
            None if self.suffix == 0 => {
                self.header = Some(record.field_names().to_vec());
            }
            None => {
                return Err(Error::invalid_argument(
                    "cannot write records after raw rows without a header",
                ));
            }
        }
        self.write_row(record.values())
    }

    pub fn write_records<'a>(&mut self, records: impl IntoIterator<Item = &'a Record>) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Close the open file, if any, and report every file written.
    pub fn finish(mut self) -> Result<WriteSummary> {
        if self.suffix == 0 && matches!(self.naming, OutputNaming::Single(_)) {
            let chunk = self.open_next()?;
            self.current = Some(chunk);
        }
        if let Some(chunk) = self.current.take() {
            self.close(chunk)?;
        }

        Ok(WriteSummary {
            files: std::mem::take(&mut self.files),
            rows_written: self.rows_written,
        })
    }

    fn open_next(&mut self) -> Result<ChunkFile> {
        self.suffix += 1;
        let path = self.naming.path_for(self.suffix);
        debug!(path = %path.display(), suffix = self.suffix, "opening output file");
        ChunkFile::create(&path, self.header.as_deref())
    }

    fn close(&mut self, chunk: ChunkFile) -> Result<()> {
        let summary = chunk.finish()?;
        debug!(path = %summary.path.display(), rows = summary.rows, "closed output file");
        self.files.push(summary);
        Ok(())
    }
}

/// Stream generated `records` into `writer`, `batch_size` records at a time,
/// then finish it.
///
/// `progress` is called with the number of records written after each batch.
pub fn write_generated<I>(
    records: I,
    mut writer: ChunkedWriter,
    batch_size: usize,
    progress: Option<&dyn Fn(u64)>,
) -> Result<WriteSummary>
where
    I: IntoIterator<Item = Record>,
{
    for batch in crate::batch::batched(records, batch_size)? {
        writer.write_records(&batch)?;
        debug!(records = writer.rows_written(), "generated batch written");
        if let Some(progress) = progress {
            progress(writer.rows_written());
        }
    }
    writer.finish()
}
