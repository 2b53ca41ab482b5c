//! On-disk annotation file format.
//!
//! Annotations persist as a single JSON document with camelCase keys,
//! compatible with what a text editor or an external script can read:
//!
//! ```json
//! {
//!   "recording": "subject01.edf",
//!   "duration": 120.0,
//!   "exportTimestamp": "2026-08-29T10:00:00Z",
//!   "annotations": [
//!     {
//!       "startTime": 10.0,
//!       "endTime": 15.0,
//!       "label": "Spike",
//!       "channel": "Fp1",
//!       "timestamp": "2026-08-29T09:59:00Z"
//!     }
//!   ]
//! }
//! ```
//!
//! `channel` is omitted for all-channel annotations. The top-level
//! `recording` and `duration` describe the recording the file was saved
//! against; loading checks them against the currently open recording.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnnotError, Result, ValidationFailure};
use crate::store::AnnotationStore;
use crate::types::Annotation;

/// Serialized form of one store: metadata plus the annotation records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationFile {
    pub recording: String,
    /// Duration in seconds of the recording the file was saved against.
    pub duration: f64,
    pub export_timestamp: DateTime<Utc>,
    pub annotations: Vec<Annotation>,
}

impl AnnotationFile {
    pub(crate) fn from_store(store: &AnnotationStore) -> Self {
        AnnotationFile {
            recording: store.recording_id().to_string(),
            duration: store.duration(),
            export_timestamp: Utc::now(),
            annotations: store
                .list()
                .iter()
                .map(|e| e.annotation.clone())
                .collect(),
        }
    }
}

/// One record rejected during [`AnnotationStore::load`], with the reason.
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    pub annotation: Annotation,
    pub reason: ValidationFailure,
}

/// Outcome of a load: what was taken, what was not, and any warnings.
///
/// A non-empty `skipped` list or a `duration_mismatch` does not fail the
/// load; the caller decides whether to warn the user or discard the result.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Number of records accepted into the store.
    pub loaded: usize,
    pub skipped: Vec<SkippedRecord>,
    /// `(file_duration, recording_duration)` when they disagree beyond
    /// [`DURATION_TOLERANCE`](crate::DURATION_TOLERANCE).
    pub duration_mismatch: Option<(f64, f64)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.duration_mismatch.is_none()
    }
}

/// Writes `file` to `path` as pretty-printed JSON.
///
/// Writes to a sibling temp file first and renames it into place, so an
/// interrupted save never truncates an existing annotation file.
pub(crate) fn write_file(path: &Path, file: &AnnotationFile) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let out = BufWriter::new(fs::File::create(&tmp)?);
        serde_json::to_writer_pretty(out, file).map_err(|e| AnnotError::Io(e.into()))?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads and parses an annotation file, without validating its records.
pub(crate) fn read_file(path: &Path) -> Result<AnnotationFile> {
    let input = BufReader::new(fs::File::open(path)?);
    serde_json::from_reader(input).map_err(|e| {
        if e.is_io() {
            AnnotError::Io(e.into())
        } else {
            AnnotError::Format(format!("{}: {}", path.display(), e))
        }
    })
}

/// Default annotation file path for a recording:
/// `subject01.edf` -> `subject01_annotations.json`, next to the recording.
pub fn annotation_path_for<P: AsRef<Path>>(recording_path: P) -> PathBuf {
    let recording_path = recording_path.as_ref();
    let stem = recording_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "recording".to_string());
    recording_path.with_file_name(format!("{}_annotations.json", stem))
}
