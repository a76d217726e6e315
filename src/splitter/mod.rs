use crate::batch::batched;
use crate::counter::open_rows;
use crate::error::Result;
use crate::writer::{
    ChunkSummary, ChunkedWriter, OutputNaming, RowBudget, DEFAULT_WRITE_BATCH_SIZE,
};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Stats {
    /// Files written, or that would be written in a dry run, in suffix order.
    pub files: Vec<ChunkSummary>,
    pub rows_processed: u64,
    pub bytes_processed: u64,
}

impl Stats {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

pub struct SplitterConfig {
    pub row_budget: RowBudget,
    pub write_batch_size: usize,
    pub dry_run: bool,
    pub progress_fn: Option<Box<dyn Fn(u64)>>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            row_budget: RowBudget::default(),
            write_batch_size: DEFAULT_WRITE_BATCH_SIZE,
            dry_run: false,
            progress_fn: None,
        }
    }
}

/// Output file prefix for an input path: its file name up to the first `.`.
///
/// `reports/2024.sales.csv` gives `2024`; names starting with a dot fall back
/// to the full file name.
pub fn output_prefix(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ if !name.is_empty() => name,
        _ => "split".to_string(),
    }
}

/// Splits an existing CSV file into `{prefix}_{n}.csv` files of at most
/// `row_budget` rows each.
///
/// Rows are copied as-is. A header line in the source is not treated
/// specially: it is the first row of the first output file and counts
/// against that file's budget. Blank lines are kept as empty rows.
pub struct Splitter {
    input_file: PathBuf,
    output_dir: PathBuf,
    config: SplitterConfig,
}

impl Splitter {
    pub fn new(input_file: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_file,
            output_dir,
            config: SplitterConfig::default(),
        }
    }

    pub fn with_row_budget(mut self, budget: RowBudget) -> Self {
        self.config.row_budget = budget;
        self
    }

    pub fn with_write_batch_size(mut self, size: usize) -> Self {
        self.config.write_batch_size = size;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Called with the number of rows read so far after every write batch.
    pub fn with_progress<F: Fn(u64) + 'static>(mut self, f: F) -> Self {
        self.config.progress_fn = Some(Box::new(f));
        self
    }

    pub fn output_prefix(&self) -> String {
        output_prefix(&self.input_file)
    }

    pub fn split(self) -> Result<Stats> {
        let prefix = self.output_prefix();
        let budget = self.config.row_budget;
        let mut reader = open_rows(&self.input_file)?;

        let mut writer = if self.config.dry_run {
            None
        } else {
            Some(ChunkedWriter::rotating(&self.output_dir, prefix.clone(), budget))
        };

        let mut rows_processed: u64 = 0;
        for batch in batched(reader.rows(), self.config.write_batch_size)? {
            for row in batch {
                let row = row?;
                if let Some(ref mut writer) = writer {
                    writer.write_row(&row)?;
                }
                rows_processed += 1;
            }
            debug!(rows = rows_processed, "split batch written");
            if let Some(ref cb) = self.config.progress_fn {
                cb(rows_processed);
            }
        }
        let bytes_processed = reader.bytes_read();

        let files = match writer {
            Some(writer) => writer.finish()?.files,
            None => planned_files(
                &OutputNaming::Numbered {
                    dir: self.output_dir.clone(),
                    prefix,
                },
                budget,
                rows_processed,
            ),
        };

        Ok(Stats {
            files,
            rows_processed,
            bytes_processed,
        })
    }
}

/// The files a split of `rows` rows under `budget` produces, without writing.
pub fn planned_files(naming: &OutputNaming, budget: RowBudget, rows: u64) -> Vec<ChunkSummary> {
    let mut remaining = rows;
    (1..=budget.files_for(rows))
        .map(|suffix| {
            let in_file = remaining.min(budget.get());
            remaining -= in_file;
            ChunkSummary {
                path: naming.path_for(suffix),
                rows: in_file,
            }
        })
        .collect()
}
