use super::{ensure_output_dir, progress_bar_style};
use crate::config::Config;
use crate::generator::FakeRecords;
use crate::writer::{write_generated, ChunkSummary, ChunkedWriter, RowBudget, CSV_EXTENSION};
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Serialize)]
struct GenJsonOutput {
    output_dir: String,
    fields: Vec<String>,
    seed: u64,
    records: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_rows_per_file: Option<u64>,
    elapsed_secs: f64,
    files: Vec<ChunkSummary>,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &Config,
    name: String,
    rows: u64,
    output: Option<PathBuf>,
    max_rows_per_file: Option<u64>,
    seed: Option<u64>,
    progress: bool,
    json: bool,
) -> anyhow::Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("--name must not be empty");
    }
    if rows == 0 {
        anyhow::bail!("--rows must be at least 1 (the header counts as a row)");
    }
    // The header takes one of the requested rows.
    let records = rows - 1;

    let output_dir = config.output_dir(output);
    // Without --max-rows-per-file everything goes to a single file.
    let budget = max_rows_per_file.map(RowBudget::new).transpose()?;
    let schema = config.schema()?;
    let seed = config.seed(seed);
    let header = schema.field_names().to_vec();

    ensure_output_dir(&output_dir)?;

    let (writer, target) = match budget {
        Some(budget) => (
            ChunkedWriter::rotating(&output_dir, name.clone(), budget),
            format!(
                "{} ({} rows per file)",
                output_dir
                    .join(format!("{}_N.{}", name, CSV_EXTENSION))
                    .display(),
                budget
            ),
        ),
        None => {
            let path = output_dir.join(format!("{}.{}", name, CSV_EXTENSION));
            let target = path.display().to_string();
            (ChunkedWriter::single(path), target)
        }
    };
    let writer = writer.with_header(header.clone());

    if !json {
        println!("[*] Generating {} with {} rows", target, rows);
    }

    let source = FakeRecords::new(schema, records, seed);
    let batch_size = config.write_batch_size();
    let start_time = Instant::now();

    let summary = if progress && !json {
        let pb = ProgressBar::new(records);
        pb.set_style(progress_bar_style(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records ({percent}%) {msg}",
        )?);
        pb.enable_steady_tick(Duration::from_millis(100));

        let pb_clone = pb.clone();
        let on_batch = move |written: u64| pb_clone.set_position(written);
        let summary = write_generated(source, writer, batch_size, Some(&on_batch))?;
        pb.finish_with_message("done");
        summary
    } else {
        write_generated(source, writer, batch_size, None)?
    };

    let elapsed = start_time.elapsed();

    if json {
        let output_json = GenJsonOutput {
            output_dir: output_dir.display().to_string(),
            fields: header,
            seed,
            records: summary.rows_written,
            max_rows_per_file: budget.map(|b| b.get()),
            elapsed_secs: elapsed.as_secs_f64(),
            files: summary.files,
        };
        println!("{}", serde_json::to_string_pretty(&output_json)?);
        return Ok(());
    }

    if summary.file_count() == 1 {
        println!("[+] Generated {} with {} rows", target, rows);
    } else {
        println!(
            "[+] Generated {} files with {} records (plus one header row per file)",
            summary.file_count(),
            summary.rows_written
        );
        for file in &summary.files {
            println!("  - {} ({} rows)", file.path.display(), file.rows + 1);
        }
    }
    println!("  Seed: {}", seed);
    println!("  Elapsed time: {:.3?}", elapsed);

    Ok(())
}
