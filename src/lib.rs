//! # EEG Annotation Core
//!
//! The annotation engine behind an EEG review tool: a validated, ordered
//! store of labelled time ranges for one recording, with JSON persistence
//! and the session/selection plumbing a GUI shell drives with user intents.
//!
//! The crate deliberately contains no plotting, no widgets and no EDF/BDF
//! decoding. The recording loader, renderer and UI toolkit are collaborators
//! behind narrow contracts: the loader supplies a [`RecordingInfo`], the
//! renderer supplies pixel/time conversion (see [`ViewWindow`]), and the UI
//! sends intents to a [`Session`] and redraws from its annotation list.
//!
//! ## Quick Start
//!
//! ### Annotating a recording
//!
//! ```rust
//! use eegannot::{RecordingInfo, Session, Result};
//!
//! fn main() -> Result<()> {
//!     let mut session = Session::new();
//!
//!     // Metadata from the EDF/BDF loader
//!     session.load_recording(RecordingInfo {
//!         id: "subject01.edf".to_string(),
//!         channel_names: vec!["Fp1".to_string(), "Fp2".to_string()],
//!         sample_rate: 256.0,
//!         duration: 120.0,
//!     });
//!
//!     // The user drags out 10 s..15 s on the plot...
//!     session.begin_drag(10.0);
//!     session.drag_to(15.0);
//!     session.finish_drag();
//!
//!     // ...and labels it in the annotation dialog
//!     session.commit_selection("Spike", None)?;
//!
//!     for entry in session.annotations() {
//!         println!(
//!             "{:.2}s - {:.2}s  {}",
//!             entry.annotation.start, entry.annotation.end, entry.annotation.label
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Saving and reloading annotations
//!
//! ```rust
//! use eegannot::{AnnotationStore, RecordingInfo, Result};
//!
//! fn main() -> Result<()> {
//!     let recording = RecordingInfo {
//!         id: "subject01.edf".to_string(),
//!         channel_names: vec!["Fp1".to_string()],
//!         sample_rate: 256.0,
//!         duration: 120.0,
//!     };
//!
//!     let mut store = AnnotationStore::new(&recording);
//!     store.add(10.0, 15.0, "Spike", Some("Fp1"))?;
//!     store.add(42.0, 42.0, "Blink", None)?; // point marker
//!     store.save("lib_quickstart_annotations.json")?;
//!
//!     // Later, against the same recording
//!     let mut store = AnnotationStore::new(&recording);
//!     let report = store.load("lib_quickstart_annotations.json")?;
//!     assert_eq!(report.loaded, 2);
//!     assert!(report.is_clean());
//!
//!     # std::fs::remove_file("lib_quickstart_annotations.json").ok();
//!     Ok(())
//! }
//! ```
//!
//! ## Validation
//!
//! Every mutation goes through the same checks: `start >= 0`,
//! `end >= start`, `end` within the recording duration, non-blank label.
//! A failing operation returns a typed [`AnnotError`] and leaves the
//! collection exactly as it was; nothing in this crate panics or
//! terminates the process on user input.
//!
//! Loading a persisted file is deliberately lenient: records that fail
//! validation against the currently open recording are skipped and listed
//! in the [`LoadReport`], and a file saved against a recording of a
//! different duration loads with a warning rather than an error. Only an
//! unreadable or unparseable file fails the load outright.

pub mod error;
pub mod format;
pub mod session;
pub mod store;
pub mod types;
pub mod view;
pub mod voice;

// Re-export main types for convenience
pub use error::{AnnotError, Result, ValidationFailure};
pub use format::{annotation_path_for, AnnotationFile, LoadReport, SkippedRecord};
pub use session::Session;
pub use store::{AnnotationStore, StoredAnnotation};
pub use types::{
    Annotation, AnnotationPatch, AnnotationRef, RecordingInfo, SelectionPhase, SelectionState,
};
pub use view::ViewWindow;
pub use voice::VoiceCommand;

/// Shortest mouse-drag selection that survives release, in seconds.
///
/// Drags narrower than this are treated as accidental clicks and discarded
/// by [`SelectionState::finish_drag`]. Explicit [`AnnotationStore::add`]
/// calls are not subject to it; a zero-length annotation is a valid point
/// marker.
pub const MIN_SELECTION_SECONDS: f64 = 0.1;

/// Allowed difference, in seconds, between the duration recorded in an
/// annotation file and the open recording's duration before a load reports
/// a mismatch.
pub const DURATION_TOLERANCE: f64 = 0.001;

/// Library version
///
/// # Examples
///
/// ```rust
/// let version = eegannot::version();
/// assert!(!version.is_empty());
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
