//! Append-only feedback CSV

use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;
use verdict_core::Result;

/// Header written when the feedback file is created
pub const FEEDBACK_HEADER: [&str; 2] = ["text", "label"];

/// Appends `(text, label)` rows to a CSV file.
///
/// Appends are serialized within the process; nothing is validated or
/// de-duplicated.
pub struct FeedbackStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first if the file is new
    pub fn append(&self, text: &str, label: &str) -> Result<()> {
        let _guard = self.lock.lock();

        let is_new = !self.path.exists();
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);

        if is_new {
            writer.write_record(FEEDBACK_HEADER)?;
        }
        writer.write_record([text, label])?;
        writer.flush()?;

        debug!("Recorded feedback to {}", self.path.display());
        Ok(())
    }
}
