use std::path::Path;

use crate::error::{AnnotError, Result};
use crate::format::LoadReport;
use crate::store::{AnnotationStore, StoredAnnotation};
use crate::types::{AnnotationPatch, AnnotationRef, RecordingInfo, SelectionState};
use crate::voice;

/// One annotation-review session: the open recording, its annotation store
/// and the transient selection state, bundled so nothing lives in process
/// globals.
///
/// The UI shell forwards user intents here and re-reads
/// [`annotations`](Session::annotations) after every mutation to redraw.
/// Intents that need a recording fail with [`AnnotError::NoRecording`]
/// until [`load_recording`](Session::load_recording) has been called.
///
/// # Examples
///
/// ```rust
/// use eegannot::{RecordingInfo, Session};
///
/// let mut session = Session::new();
/// session.load_recording(RecordingInfo {
///     id: "subject01.edf".to_string(),
///     channel_names: vec!["Fp1".to_string()],
///     sample_rate: 256.0,
///     duration: 120.0,
/// });
///
/// // Drag out a range on the plot, then commit it with a label
/// session.begin_drag(10.0);
/// session.drag_to(15.0);
/// session.finish_drag();
/// let r = session.commit_selection("Spike", Some("Fp1"))?;
///
/// assert_eq!(session.annotations().len(), 1);
/// assert_eq!(session.annotations()[0].annot_ref(), r);
/// // Committing consumed the selection
/// assert!(session.selection().pending_range().is_none());
/// # Ok::<(), eegannot::AnnotError>(())
/// ```
#[derive(Debug, Default)]
pub struct Session {
    recording: Option<RecordingInfo>,
    store: Option<AnnotationStore>,
    selection: SelectionState,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// Opens a recording, replacing any previous one.
    ///
    /// The previous annotation store and any pending selection are dropped;
    /// unsaved annotations are gone, so the UI should check
    /// [`is_dirty`](Session::is_dirty) and prompt before calling this.
    pub fn load_recording(&mut self, info: RecordingInfo) {
        self.store = Some(AnnotationStore::new(&info));
        self.recording = Some(info);
        self.selection.clear();
    }

    pub fn recording(&self) -> Option<&RecordingInfo> {
        self.recording.as_ref()
    }

    pub fn has_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// The store for the open recording.
    ///
    /// # Errors
    ///
    /// [`AnnotError::NoRecording`] before [`load_recording`](Session::load_recording).
    pub fn store(&self) -> Result<&AnnotationStore> {
        self.store.as_ref().ok_or(AnnotError::NoRecording)
    }

    pub fn store_mut(&mut self) -> Result<&mut AnnotationStore> {
        self.store.as_mut().ok_or(AnnotError::NoRecording)
    }

    /// Sorted annotation list for redraw; empty before a recording is open.
    pub fn annotations(&self) -> &[StoredAnnotation] {
        self.store.as_ref().map(|s| s.list()).unwrap_or(&[])
    }

    pub fn is_dirty(&self) -> bool {
        self.store.as_ref().map(|s| s.is_dirty()).unwrap_or(false)
    }

    // Selection intents, forwarded from the renderer's mouse events with
    // pixel positions already converted to times.

    pub fn begin_drag(&mut self, t: f64) {
        self.selection.begin_drag(t);
    }

    pub fn drag_to(&mut self, t: f64) {
        self.selection.drag_to(t);
    }

    pub fn finish_drag(&mut self) {
        self.selection.finish_drag();
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Discards the pending range and list selection.
    pub fn cancel_selection(&mut self) {
        self.selection.clear();
    }

    /// Turns the pending dragged range into an annotation, then clears the
    /// selection.
    ///
    /// # Errors
    ///
    /// [`AnnotError::NoSelection`] if no completed drag is pending,
    /// [`AnnotError::NoRecording`] or a validation failure from the store
    /// otherwise. The selection survives a failed commit so the user can
    /// retry with a different label.
    pub fn commit_selection(
        &mut self,
        label: &str,
        channel: Option<&str>,
    ) -> Result<AnnotationRef> {
        let (start, end) = self
            .selection
            .pending_range()
            .ok_or(AnnotError::NoSelection)?;
        let r = self.store_mut()?.add(start, end, label, channel)?;
        self.selection.clear();
        Ok(r)
    }

    /// Adds an annotation with an explicit range, bypassing the selection
    /// machinery (keyboard entry, scripted import).
    pub fn add_range(
        &mut self,
        start: f64,
        end: f64,
        label: &str,
        channel: Option<&str>,
    ) -> Result<AnnotationRef> {
        self.store_mut()?.add(start, end, label, channel)
    }

    /// Adds an annotation from a dictated phrase like
    /// `"seizure activity from 42.5 to 47"` (see [`voice::parse_command`]).
    ///
    /// The extracted range goes through the same validation as any other
    /// add, so a phrase past the end of the recording fails like a bad
    /// [`add_range`](Session::add_range) would.
    ///
    /// # Errors
    ///
    /// [`AnnotError::Format`] for an unparseable phrase, plus everything
    /// [`add_range`](Session::add_range) can return.
    pub fn add_voice_command(&mut self, text: &str) -> Result<AnnotationRef> {
        let cmd = voice::parse_command(text)?;
        self.add_range(cmd.start, cmd.end, &cmd.label, None)
    }

    /// Highlights an existing annotation in the list view.
    ///
    /// # Errors
    ///
    /// [`AnnotError::NotFound`] if the ref no longer resolves.
    pub fn select(&mut self, r: AnnotationRef) -> Result<()> {
        if self.store()?.get(r).is_none() {
            return Err(AnnotError::NotFound(r.id()));
        }
        self.selection.selected = Some(r);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selection.selected = None;
    }

    pub fn remove(&mut self, r: AnnotationRef) -> Result<()> {
        self.store_mut()?.remove(r)?;
        if self.selection.selected == Some(r) {
            self.selection.selected = None;
        }
        Ok(())
    }

    pub fn update(&mut self, r: AnnotationRef, patch: AnnotationPatch) -> Result<()> {
        self.store_mut()?.update(r, patch)
    }

    pub fn clear_annotations(&mut self) -> Result<()> {
        self.store_mut()?.clear();
        self.selection.selected = None;
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.store_mut()?.save(path)
    }

    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let report = self.store_mut()?.load(path)?;
        // Loaded refs are all fresh; a stale highlight would be misleading.
        self.selection.selected = None;
        Ok(report)
    }
}
