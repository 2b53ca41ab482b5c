use std::io;
use thiserror::Error;

/// The constraint an annotation failed to satisfy.
///
/// Carried inside [`AnnotError::Validation`] so callers (and dialogs) can
/// name exactly which field was rejected instead of showing a generic
/// "invalid annotation" message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    #[error("start time {0} is negative")]
    NegativeStart(f64),

    #[error("end time {end} is before start time {start}")]
    EndBeforeStart { start: f64, end: f64 },

    #[error("end time {end} exceeds recording duration {duration}")]
    EndPastDuration { end: f64, duration: f64 },

    #[error("label is empty")]
    EmptyLabel,

    #[error("start or end time is not a finite number")]
    NonFiniteTime,
}

#[derive(Debug, Error)]
pub enum AnnotError {
    #[error("invalid annotation: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("annotation {0} not found (removed or never existed)")]
    NotFound(u64),

    #[error("no recording is loaded")]
    NoRecording,

    #[error("no time range is selected")]
    NoSelection,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("unrecognized format: {0}")]
    Format(String),
}

pub type Result<T> = std::result::Result<T, AnnotError>;
