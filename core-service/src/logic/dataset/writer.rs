use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::record::FeedbackRecord;

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB
const FILE_PREFIX: &str = "feedback-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total_files: usize,
    pub total_size_mb: f32,
    pub current_file: String,
}

/// Append-only JSONL feedback log with size-based rotation
pub struct FeedbackWriter {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
}

impl FeedbackWriter {
    pub fn new() -> io::Result<Self> {
        Self::from_path(super::default_feedback_dir())
    }

    pub fn from_path(base_dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            file: Mutex::new(None),
            base_dir,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Append one record as a JSON line, rotating when the file is full
    pub fn append(&self, record: &FeedbackRecord) -> io::Result<()> {
        let mut file_guard = self.file.lock();

        // Resume the latest log unless it is already full
        if file_guard.is_none() {
            let file = match self.find_latest_log_file()? {
                Some(path) => {
                    let f = OpenOptions::new().create(true).append(true).open(&path)?;
                    if f.metadata()?.len() < MAX_FILE_SIZE {
                        f
                    } else {
                        self.create_new_file()?
                    }
                }
                None => self.create_new_file()?,
            };
            *file_guard = Some(file);
        }

        let should_rotate = match file_guard.as_ref() {
            Some(f) => f.metadata()?.len() >= MAX_FILE_SIZE,
            None => false,
        };
        if should_rotate {
            *file_guard = Some(self.create_new_file()?);
        }

        if let Some(file) = file_guard.as_mut() {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{}", json)?;
            file.flush()?;
        }

        log::debug!("Feedback {} recorded for sample {}", record.id, record.sample_index);
        Ok(())
    }

    pub fn stats(&self) -> io::Result<FeedbackStats> {
        let paths = self.log_files()?;
        let mut size = 0u64;
        for path in &paths {
            size += fs::metadata(path)?.len();
        }

        let current_file = paths
            .last()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("None")
            .to_string();

        Ok(FeedbackStats {
            total_files: paths.len(),
            total_size_mb: size as f32 / 1024.0 / 1024.0,
            current_file,
        })
    }

    fn create_new_file(&self) -> io::Result<File> {
        // timestamp format: YYYY-MM-DD-HHMMSS
        let filename = format!("{}{}.jsonl", FILE_PREFIX, Utc::now().format("%Y-%m-%d-%H%M%S"));
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.base_dir.join(filename))
    }

    /// Feedback logs sorted by filename (timestamp ensures order)
    fn log_files(&self) -> io::Result<Vec<PathBuf>> {
        list_log_files(&self.base_dir)
    }

    fn find_latest_log_file(&self) -> io::Result<Option<PathBuf>> {
        Ok(self.log_files()?.pop())
    }
}

pub(crate) fn list_log_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .filter_map(|res| res.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "jsonl"))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with(FILE_PREFIX))
        })
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries)
}
