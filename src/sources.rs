use anyhow::Result;

use crate::config::Config;
use crate::connector_fs;
use crate::spreadsheet;

/// CLI entry for `cronograma sources`: every discovered file in processing
/// order, with whether it can be read.
pub fn list_sources(config: &Config) -> Result<()> {
    let files = connector_fs::scan_data_dir(&config.data)?;

    if files.is_empty() {
        println!("No spreadsheets found under {}.", config.data.root.display());
        return Ok(());
    }

    println!("{:<40} {:<10} {:>6}  NOTES", "FILE", "STATUS", "ROWS");
    for file in &files {
        match spreadsheet::read_rows(&file.path, &config.columns) {
            Ok(sheet) => {
                let notes = if sheet.missing_columns.is_empty() {
                    String::new()
                } else {
                    format!("missing column(s): {}", sheet.missing_columns.join(", "))
                };
                println!(
                    "{:<40} {:<10} {:>6}  {}",
                    file.relative,
                    "OK",
                    sheet.rows.len(),
                    notes
                );
            }
            Err(e) => {
                println!("{:<40} {:<10} {:>6}  {}", file.relative, "ERROR", "-", e);
            }
        }
    }

    Ok(())
}
