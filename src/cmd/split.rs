use super::{ensure_output_dir, progress_bar_style};
use crate::config::Config;
use crate::splitter::Splitter;
use crate::writer::ChunkSummary;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Serialize)]
struct SplitJsonOutput {
    input_file: String,
    output_dir: String,
    max_rows_per_file: u64,
    dry_run: bool,
    statistics: SplitStatistics,
    files: Vec<ChunkSummary>,
}

#[derive(Serialize)]
struct SplitStatistics {
    files_created: usize,
    rows_processed: u64,
    bytes_processed: u64,
    elapsed_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    throughput_mb_per_sec: Option<f64>,
}

pub fn run(
    config: &Config,
    file: PathBuf,
    max_rows_per_file: Option<u64>,
    output: Option<PathBuf>,
    dry_run: bool,
    progress: bool,
    json: bool,
) -> anyhow::Result<()> {
    let budget = config.row_budget(max_rows_per_file)?;
    let output_dir = config.output_dir(output);

    if !dry_run {
        ensure_output_dir(&output_dir)?;
    }

    if !json {
        if dry_run {
            println!("[*] Dry run: counting files needed to split {}", file.display());
        } else {
            println!("[*] Splitting {} into multiple files", file.display());
        }
        println!("  Max rows per file: {}", budget);
    }

    let mut splitter = Splitter::new(file.clone(), output_dir.clone())
        .with_row_budget(budget)
        .with_write_batch_size(config.write_batch_size())
        .with_dry_run(dry_run);

    let start_time = Instant::now();

    let stats = if progress && !json {
        let pb = ProgressBar::new_spinner();
        pb.set_style(progress_bar_style(
            "{spinner:.green} [{elapsed_precise}] {pos} rows read {msg}",
        )?);
        pb.enable_steady_tick(Duration::from_millis(100));

        let pb_clone = pb.clone();
        splitter = splitter.with_progress(move |rows| pb_clone.set_position(rows));

        let stats = splitter.split()?;
        pb.finish_with_message("done");
        stats
    } else {
        splitter.split()?
    };

    let elapsed = start_time.elapsed();
    let throughput = if elapsed.as_secs_f64() > 0.0 {
        Some(stats.bytes_processed as f64 / (1024.0 * 1024.0) / elapsed.as_secs_f64())
    } else {
        None
    };

    if json {
        let output_json = SplitJsonOutput {
            input_file: file.display().to_string(),
            output_dir: output_dir.display().to_string(),
            max_rows_per_file: budget.get(),
            dry_run,
            statistics: SplitStatistics {
                files_created: if dry_run { 0 } else { stats.file_count() },
                rows_processed: stats.rows_processed,
                bytes_processed: stats.bytes_processed,
                elapsed_secs: elapsed.as_secs_f64(),
                throughput_mb_per_sec: throughput,
            },
            files: stats.files,
        };
        println!("{}", serde_json::to_string_pretty(&output_json)?);
        return Ok(());
    }

    if dry_run {
        println!("\n[+] Dry run completed!");
        println!("\nWould create {} files:", stats.file_count());
        for chunk in &stats.files {
            println!("  - {} ({} rows)", chunk.path.display(), chunk.rows);
        }
    } else {
        println!(
            "[+] Done splitting {} into {} files",
            file.display(),
            stats.file_count()
        );
        println!("[*] Check {}/ for split files", output_dir.display());
    }

    println!("\nStatistics:");
    println!("  Rows processed: {}", stats.rows_processed);
    println!(
        "  Bytes processed: {:.2} MB",
        stats.bytes_processed as f64 / (1024.0 * 1024.0)
    );
    println!("  Elapsed time: {:.3?}", elapsed);
    if let Some(throughput) = throughput {
        println!("  Throughput: {:.2} MB/s", throughput);
    }

    Ok(())
}
