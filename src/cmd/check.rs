use crate::counter::count_rows;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct CheckJsonOutput {
    file: String,
    rows: u64,
}

pub fn run(file: PathBuf, json: bool) -> anyhow::Result<()> {
    let rows = count_rows(&file)?;

    if json {
        let output_json = CheckJsonOutput {
            file: file.display().to_string(),
            rows,
        };
        println!("{}", serde_json::to_string_pretty(&output_json)?);
    } else {
        println!("[*] {} has {} rows", file.display(), rows);
    }

    Ok(())
}
