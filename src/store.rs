use std::path::Path;

use crate::error::{AnnotError, Result, ValidationFailure};
use crate::format::{self, AnnotationFile, LoadReport, SkippedRecord};
use crate::types::{Annotation, AnnotationPatch, AnnotationRef, RecordingInfo};
use crate::DURATION_TOLERANCE;

/// An annotation together with the stable handle the store assigned to it.
#[derive(Debug, Clone)]
pub struct StoredAnnotation {
    id: u64,
    pub annotation: Annotation,
}

impl StoredAnnotation {
    pub fn annot_ref(&self) -> AnnotationRef {
        AnnotationRef(self.id)
    }
}

/// Owns every annotation for one loaded recording.
///
/// The store is the only place annotations are mutated; the UI holds a
/// read-only view and sends intents. The list is kept sorted by start time
/// after every mutation, with insertion order breaking ties, and each
/// mutation either fully applies or leaves the collection untouched.
///
/// # Examples
///
/// ```rust
/// use eegannot::{AnnotationStore, RecordingInfo};
///
/// let recording = RecordingInfo {
///     id: "subject01.edf".to_string(),
///     channel_names: vec!["Fp1".to_string(), "Fp2".to_string()],
///     sample_rate: 256.0,
///     duration: 120.0,
/// };
///
/// let mut store = AnnotationStore::new(&recording);
/// store.add(42.0, 44.5, "Artifact", None)?;
/// store.add(10.0, 15.0, "Spike", Some("Fp1"))?;
///
/// // Sorted by start regardless of insertion order
/// let starts: Vec<f64> = store.list().iter()
///     .map(|s| s.annotation.start)
///     .collect();
/// assert_eq!(starts, vec![10.0, 42.0]);
/// # Ok::<(), eegannot::AnnotError>(())
/// ```
#[derive(Debug)]
pub struct AnnotationStore {
    recording_id: String,
    duration: f64,
    entries: Vec<StoredAnnotation>,
    next_id: u64,
    dirty: bool,
}

impl AnnotationStore {
    /// Creates an empty store bound to one recording.
    ///
    /// The recording's duration is the upper bound for every annotation
    /// added or loaded afterwards.
    pub fn new(recording: &RecordingInfo) -> Self {
        AnnotationStore {
            recording_id: recording.id.clone(),
            duration: recording.duration,
            entries: Vec::new(),
            next_id: 0,
            dirty: false,
        }
    }

    /// Identifier of the recording this store belongs to.
    pub fn recording_id(&self) -> &str {
        &self.recording_id
    }

    /// Recording duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether there are changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds an annotation, validating it against the recording bounds.
    ///
    /// `start == end` is allowed and marks an instant rather than a range.
    /// On success the entry is inserted at its sorted position and a stable
    /// reference to it is returned.
    ///
    /// # Errors
    ///
    /// [`AnnotError::Validation`] naming the violated constraint:
    /// negative start, `end < start`, `end` past the recording duration,
    /// non-finite times, or a blank label. The collection is unchanged on
    /// failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eegannot::{AnnotationStore, AnnotError, RecordingInfo, ValidationFailure};
    ///
    /// # let recording = RecordingInfo {
    /// #     id: "rec.edf".to_string(),
    /// #     channel_names: vec![],
    /// #     sample_rate: 256.0,
    /// #     duration: 120.0,
    /// # };
    /// let mut store = AnnotationStore::new(&recording);
    ///
    /// assert!(store.add(10.0, 15.0, "spike", None).is_ok());
    ///
    /// // End past the 120 s recording is rejected
    /// match store.add(119.0, 125.0, "artifact", None) {
    ///     Err(AnnotError::Validation(ValidationFailure::EndPastDuration { .. })) => {}
    ///     other => panic!("expected validation error, got {:?}", other),
    /// }
    /// assert_eq!(store.len(), 1);
    /// # Ok::<(), eegannot::AnnotError>(())
    /// ```
    pub fn add(
        &mut self,
        start: f64,
        end: f64,
        label: &str,
        channel: Option<&str>,
    ) -> Result<AnnotationRef> {
        self.validate(start, end, label)?;
        let annotation = Annotation::new(start, end, label, channel.map(str::to_string));
        let r = self.insert_sorted(annotation);
        self.dirty = true;
        Ok(r)
    }

    /// Removes the annotation behind `r`, returning it.
    ///
    /// # Errors
    ///
    /// [`AnnotError::NotFound`] if `r` was already removed or belongs to a
    /// different store. Removing twice with the same ref always fails the
    /// second time.
    pub fn remove(&mut self, r: AnnotationRef) -> Result<Annotation> {
        let idx = self.position(r)?;
        let entry = self.entries.remove(idx);
        self.dirty = true;
        Ok(entry.annotation)
    }

    /// Applies a partial update, re-validating the merged annotation.
    ///
    /// The entry is re-sorted if its start time changed; its reference stays
    /// valid. A moved entry whose new start equals other entries' starts is
    /// placed after them, as if it had just been inserted, regardless of how
    /// old its reference is. On any validation failure nothing is modified.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eegannot::{AnnotationStore, AnnotationPatch, RecordingInfo};
    ///
    /// # let recording = RecordingInfo {
    /// #     id: "rec.edf".to_string(),
    /// #     channel_names: vec![],
    /// #     sample_rate: 256.0,
    /// #     duration: 120.0,
    /// # };
    /// let mut store = AnnotationStore::new(&recording);
    /// store.add(20.0, 25.0, "eye movement", None)?;
    /// let r = store.add(50.0, 55.0, "spike", None)?;
    ///
    /// // Moving the start re-sorts the list
    /// store.update(r, AnnotationPatch::default().start(5.0))?;
    /// assert_eq!(store.list()[0].annotation.label, "spike");
    /// # Ok::<(), eegannot::AnnotError>(())
    /// ```
    pub fn update(&mut self, r: AnnotationRef, patch: AnnotationPatch) -> Result<()> {
        let idx = self.position(r)?;

        let mut merged = self.entries[idx].annotation.clone();
        if let Some(start) = patch.start {
            merged.start = start;
        }
        if let Some(end) = patch.end {
            merged.end = end;
        }
        if let Some(label) = patch.label {
            merged.label = label;
        }
        if let Some(channel) = patch.channel {
            merged.channel = channel;
        }
        self.validate(merged.start, merged.end, &merged.label)?;

        let start_changed = merged.start != self.entries[idx].annotation.start;
        if start_changed {
            let id = self.entries[idx].id;
            self.entries.remove(idx);
            let pos = self.sorted_position(merged.start);
            self.entries.insert(pos, StoredAnnotation { id, annotation: merged });
        } else {
            self.entries[idx].annotation = merged;
        }
        self.dirty = true;
        Ok(())
    }

    /// Looks up the annotation behind `r`, if it still exists.
    pub fn get(&self, r: AnnotationRef) -> Option<&Annotation> {
        self.entries
            .iter()
            .find(|e| e.id == r.0)
            .map(|e| &e.annotation)
    }

    /// Read-only view of all annotations, sorted by start time.
    pub fn list(&self) -> &[StoredAnnotation] {
        &self.entries
    }

    /// Annotations overlapping the half-open window `[start, end)`,
    /// as drawn by the renderer for the current view.
    pub fn annotations_in_window(&self, start: f64, end: f64) -> Vec<&StoredAnnotation> {
        self.entries
            .iter()
            .filter(|e| e.annotation.overlaps(start, end))
            .collect()
    }

    /// Removes every annotation.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.dirty = true;
    }

    /// Serializes the collection to `path` (see the [`format`](crate::format)
    /// module for the on-disk schema) and clears the dirty flag.
    ///
    /// # Errors
    ///
    /// [`AnnotError::Io`] on any write failure; the in-memory collection is
    /// unaffected either way.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = AnnotationFile::from_store(self);
        format::write_file(path.as_ref(), &file)?;
        self.dirty = false;
        Ok(())
    }

    /// Replaces the collection with the contents of a persisted file.
    ///
    /// Every record is validated against the *currently open* recording's
    /// duration, exactly as `add` would. Records that fail validation are
    /// skipped and reported in the returned [`LoadReport`] instead of
    /// aborting the load. A duration recorded in the file that differs from
    /// the open recording beyond [`DURATION_TOLERANCE`] is likewise reported
    /// as a warning, not an error.
    ///
    /// # Errors
    ///
    /// [`AnnotError::Io`] if the file cannot be read,
    /// [`AnnotError::Format`] if it is not a recognizable annotation file.
    /// The collection is untouched when the load fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use eegannot::{AnnotationStore, RecordingInfo};
    ///
    /// # let recording = RecordingInfo {
    /// #     id: "rec.edf".to_string(),
    /// #     channel_names: vec![],
    /// #     sample_rate: 256.0,
    /// #     duration: 120.0,
    /// # };
    /// let mut store = AnnotationStore::new(&recording);
    /// store.add(10.0, 15.0, "spike", None)?;
    /// store.save("doc_roundtrip.json")?;
    ///
    /// let mut fresh = AnnotationStore::new(&recording);
    /// let report = fresh.load("doc_roundtrip.json")?;
    /// assert_eq!(report.loaded, 1);
    /// assert!(report.skipped.is_empty());
    /// assert!(report.duration_mismatch.is_none());
    /// # std::fs::remove_file("doc_roundtrip.json").ok();
    /// # Ok::<(), eegannot::AnnotError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let file = format::read_file(path.as_ref())?;

        let mut report = LoadReport::default();
        if (file.duration - self.duration).abs() > DURATION_TOLERANCE {
            tracing::warn!(
                file_duration = file.duration,
                recording_duration = self.duration,
                "annotation file was saved against a recording of different duration"
            );
            report.duration_mismatch = Some((file.duration, self.duration));
        }
        if file.recording != self.recording_id {
            tracing::debug!(
                file_recording = %file.recording,
                open_recording = %self.recording_id,
                "annotation file names a different recording"
            );
        }

        let mut accepted = Vec::new();
        for annotation in file.annotations {
            match self.check(annotation.start, annotation.end, &annotation.label) {
                Ok(()) => accepted.push(annotation),
                Err(reason) => {
                    tracing::warn!(
                        start = annotation.start,
                        end = annotation.end,
                        label = %annotation.label,
                        %reason,
                        "skipping annotation record that fails validation"
                    );
                    report.skipped.push(SkippedRecord { annotation, reason });
                }
            }
        }

        self.entries.clear();
        for annotation in accepted {
            self.insert_sorted(annotation);
        }
        report.loaded = self.entries.len();
        // If records were skipped, memory no longer matches the file.
        self.dirty = !report.skipped.is_empty();
        Ok(report)
    }

    fn validate(&self, start: f64, end: f64, label: &str) -> Result<()> {
        self.check(start, end, label).map_err(AnnotError::from)
    }

    fn check(
        &self,
        start: f64,
        end: f64,
        label: &str,
    ) -> std::result::Result<(), ValidationFailure> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ValidationFailure::NonFiniteTime);
        }
        if start < 0.0 {
            return Err(ValidationFailure::NegativeStart(start));
        }
        if end < start {
            return Err(ValidationFailure::EndBeforeStart { start, end });
        }
        if end > self.duration {
            return Err(ValidationFailure::EndPastDuration {
                end,
                duration: self.duration,
            });
        }
        if label.trim().is_empty() {
            return Err(ValidationFailure::EmptyLabel);
        }
        Ok(())
    }

    /// First index whose start is strictly greater than `start`, so equal
    /// starts keep their insertion order.
    fn sorted_position(&self, start: f64) -> usize {
        self.entries.partition_point(|e| e.annotation.start <= start)
    }

    fn insert_sorted(&mut self, annotation: Annotation) -> AnnotationRef {
        let id = self.next_id;
        self.next_id += 1;
        let pos = self.sorted_position(annotation.start);
        self.entries.insert(pos, StoredAnnotation { id, annotation });
        AnnotationRef(id)
    }

    fn position(&self, r: AnnotationRef) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.id == r.0)
            .ok_or(AnnotError::NotFound(r.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_recording() -> RecordingInfo {
        RecordingInfo {
            id: "test.edf".to_string(),
            channel_names: vec!["Fp1".to_string(), "Fp2".to_string()],
            sample_rate: 256.0,
            duration: 120.0,
        }
    }

    #[test]
    fn test_stable_tie_break_for_equal_starts() {
        let mut store = AnnotationStore::new(&test_recording());
        let a = store.add(10.0, 12.0, "first", None).unwrap();
        let b = store.add(10.0, 11.0, "second", None).unwrap();

        let refs: Vec<AnnotationRef> = store.list().iter().map(|e| e.annot_ref()).collect();
        assert_eq!(refs, vec![a, b]);
    }

    #[test]
    fn test_update_without_start_change_keeps_position() {
        let mut store = AnnotationStore::new(&test_recording());
        store.add(10.0, 12.0, "a", None).unwrap();
        let r = store.add(20.0, 22.0, "b", None).unwrap();
        store.add(30.0, 32.0, "c", None).unwrap();

        store
            .update(r, AnnotationPatch::default().label("b2"))
            .unwrap();
        assert_eq!(store.list()[1].annotation.label, "b2");
        assert_eq!(store.list()[1].annot_ref(), r);
    }

    #[test]
    fn test_failed_update_leaves_entry_untouched() {
        let mut store = AnnotationStore::new(&test_recording());
        let r = store.add(20.0, 22.0, "b", None).unwrap();

        let err = store
            .update(r, AnnotationPatch::default().end(19.0))
            .unwrap_err();
        assert!(matches!(err, AnnotError::Validation(_)));
        assert_eq!(store.get(r).unwrap().end, 22.0);
    }

    #[test]
    fn test_nan_times_rejected() {
        let mut store = AnnotationStore::new(&test_recording());
        let err = store.add(f64::NAN, 5.0, "x", None).unwrap_err();
        assert!(matches!(
            err,
            AnnotError::Validation(ValidationFailure::NonFiniteTime)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut store = AnnotationStore::new(&test_recording());
        assert!(!store.is_dirty());
        store.add(1.0, 2.0, "x", None).unwrap();
        assert!(store.is_dirty());
    }
}
