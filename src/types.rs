use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MIN_SELECTION_SECONDS;

/// A labelled time interval within a recording.
///
/// `start == end` denotes an instantaneous marker. `channel` of `None`
/// means the annotation applies to all channels.
///
/// Annotations have no identity of their own; the store assigns each one a
/// stable [`AnnotationRef`] at insertion. Duplicate field values are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    #[serde(rename = "startTime")]
    pub start: f64,
    #[serde(rename = "endTime")]
    pub end: f64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// When the annotation was first created, preserved across save/load.
    #[serde(rename = "timestamp")]
    pub created: DateTime<Utc>,
}

impl Annotation {
    pub fn new(start: f64, end: f64, label: impl Into<String>, channel: Option<String>) -> Self {
        Annotation {
            start,
            end,
            label: label.into(),
            channel,
            created: Utc::now(),
        }
    }

    /// Interval length in seconds; zero for point markers.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether this annotation overlaps the half-open window `[start, end)`.
    pub fn overlaps(&self, window_start: f64, window_end: f64) -> bool {
        self.start < window_end && self.end > window_start
    }
}

/// Stable handle to an annotation inside one store.
///
/// Refs are assigned in insertion order and survive re-sorting. A ref whose
/// annotation has been removed never resolves again, so stale handles fail
/// with `NotFound` instead of silently pointing at a different entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationRef(pub(crate) u64);

impl AnnotationRef {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Partial update applied by [`AnnotationStore::update`](crate::AnnotationStore::update).
///
/// `None` fields keep their current value. `channel` uses a double `Option`:
/// the outer level is "change it or not", the inner is the new value
/// (`Some(None)` clears the channel back to all-channels).
#[derive(Debug, Clone, Default)]
pub struct AnnotationPatch {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub label: Option<String>,
    pub channel: Option<Option<String>>,
}

impl AnnotationPatch {
    pub fn start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: f64) -> Self {
        self.end = Some(end);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn channel(mut self, channel: Option<String>) -> Self {
        self.channel = Some(channel);
        self
    }
}

/// Metadata a recording loader must report for a loaded EDF/BDF file.
///
/// The store never touches sample data; it only needs the duration for
/// bounds checks and the channel names for per-channel annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingInfo {
    /// Identifier for the source file, usually its file name.
    pub id: String,
    pub channel_names: Vec<String>,
    pub sample_rate: f64,
    /// Total duration in seconds.
    pub duration: f64,
}

/// Transient mouse-selection state. Never persisted.
///
/// The drag lifecycle is an explicit machine rather than a pile of
/// `mouse_pressed`/`is_selecting` flags: `Idle` until a press, `Dragging`
/// while the button is held, `RangeSelected` once a large-enough range has
/// been released. Drags shorter than [`MIN_SELECTION_SECONDS`] fall back to
/// `Idle` on release.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionPhase {
    #[default]
    Idle,
    Dragging {
        anchor: f64,
        cursor: f64,
    },
    RangeSelected {
        start: f64,
        end: f64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub phase: SelectionPhase,
    /// Existing annotation highlighted in the list view, if any.
    pub selected: Option<AnnotationRef>,
}

impl SelectionState {
    pub fn new() -> Self {
        SelectionState::default()
    }

    /// Mouse press at time `t`: start a drag, replacing any pending range.
    pub fn begin_drag(&mut self, t: f64) {
        self.phase = SelectionPhase::Dragging { anchor: t, cursor: t };
    }

    /// Mouse move during a drag. Ignored outside the `Dragging` phase.
    pub fn drag_to(&mut self, t: f64) {
        if let SelectionPhase::Dragging { cursor, .. } = &mut self.phase {
            *cursor = t;
        }
    }

    /// Mouse release: normalize the dragged range (the user may drag
    /// right-to-left) and keep it if it meets the minimum width.
    pub fn finish_drag(&mut self) {
        if let SelectionPhase::Dragging { anchor, cursor } = self.phase {
            let (start, end) = if anchor <= cursor {
                (anchor, cursor)
            } else {
                (cursor, anchor)
            };
            if end - start >= MIN_SELECTION_SECONDS {
                self.phase = SelectionPhase::RangeSelected { start, end };
            } else {
                self.phase = SelectionPhase::Idle;
            }
        }
    }

    /// The pending range, once a drag has been completed.
    pub fn pending_range(&self) -> Option<(f64, f64)> {
        match self.phase {
            SelectionPhase::RangeSelected { start, end } => Some((start, end)),
            _ => None,
        }
    }

    /// The range to highlight while drawing, normalized, in any non-idle
    /// phase. During a drag this follows the cursor.
    pub fn display_range(&self) -> Option<(f64, f64)> {
        match self.phase {
            SelectionPhase::Idle => None,
            SelectionPhase::Dragging { anchor, cursor } => {
                Some((anchor.min(cursor), anchor.max(cursor)))
            }
            SelectionPhase::RangeSelected { start, end } => Some((start, end)),
        }
    }

    pub fn has_pending_range(&self) -> bool {
        matches!(self.phase, SelectionPhase::RangeSelected { .. })
    }

    /// Reset everything: pending range and list selection.
    pub fn clear(&mut self) {
        self.phase = SelectionPhase::Idle;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_marker_duration() {
        let a = Annotation::new(5.0, 5.0, "blink", None);
        assert_eq!(a.duration(), 0.0);
    }

    #[test]
    fn test_overlap() {
        let a = Annotation::new(10.0, 15.0, "spike", None);
        assert!(a.overlaps(12.0, 20.0));
        assert!(a.overlaps(0.0, 10.5));
        assert!(!a.overlaps(15.0, 20.0));
        assert!(!a.overlaps(0.0, 10.0));
    }

    #[test]
    fn test_drag_right_to_left_normalizes() {
        let mut sel = SelectionState::new();
        sel.begin_drag(8.0);
        sel.drag_to(3.0);
        sel.finish_drag();
        assert_eq!(sel.pending_range(), Some((3.0, 8.0)));
    }

    #[test]
    fn test_tiny_drag_discarded() {
        let mut sel = SelectionState::new();
        sel.begin_drag(4.0);
        sel.drag_to(4.05);
        sel.finish_drag();
        assert_eq!(sel.phase, SelectionPhase::Idle);
        assert!(sel.pending_range().is_none());
    }

    #[test]
    fn test_drag_to_ignored_when_idle() {
        let mut sel = SelectionState::new();
        sel.drag_to(9.0);
        assert_eq!(sel.phase, SelectionPhase::Idle);
    }
}
