use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use super::writer::list_log_files;

/// Merge every feedback log in `source_dir` into one JSONL file, oldest first.
/// Returns the number of source files merged.
pub fn export_jsonl(source_dir: &Path, target_path: &Path) -> io::Result<usize> {
    if !source_dir.exists() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "Feedback directory not found"));
    }

    let paths = list_log_files(source_dir)?;

    // Create target file (truncate if exists)
    let mut output_file = File::create(target_path)?;

    for path in &paths {
        let content = fs::read(path)?;
        output_file.write_all(&content)?;

        if let Some(&last_byte) = content.last() {
            if last_byte != b'\n' {
                output_file.write_all(b"\n")?;
            }
        }
    }

    output_file.flush()?;
    log::info!("Exported {} feedback files to {}", paths.len(), target_path.display());
    Ok(paths.len())
}
