/// The visible slice of the recording and its mapping to screen pixels.
///
/// The renderer owns the actual drawing; this is the contract the core
/// needs from it: converting a horizontal pixel position into a time value
/// (mouse events) and back (drawing annotation overlays), plus paging the
/// window through the recording.
///
/// # Examples
///
/// ```rust
/// use eegannot::ViewWindow;
///
/// // 20 s of signal across an 800 px plot, starting at t=60 s
/// let view = ViewWindow::new(60.0, 20.0, 800);
///
/// assert_eq!(view.time_at(0.0), 60.0);
/// assert_eq!(view.time_at(400.0), 70.0);
/// assert_eq!(view.pixel_at(70.0), 400.0);
/// assert!(view.contains(65.0));
/// assert!(!view.contains(80.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    /// Start of the visible window, seconds from recording start.
    pub start: f64,
    /// Window width in seconds (the "time scale"). Must be positive.
    pub width_seconds: f64,
    /// Plot surface width in pixels. Must be positive.
    pub width_pixels: u32,
}

impl ViewWindow {
    /// Both widths must be positive; a zero-width window has no pixel/time
    /// mapping and would leak NaN into selection times.
    pub fn new(start: f64, width_seconds: f64, width_pixels: u32) -> Self {
        debug_assert!(
            width_seconds > 0.0,
            "view window must span a positive time range"
        );
        debug_assert!(width_pixels > 0, "view window must span at least one pixel");
        ViewWindow {
            start,
            width_seconds,
            width_pixels,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.width_seconds
    }

    /// Whether `t` falls inside the half-open window `[start, end)`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end()
    }

    /// Time at a horizontal pixel position on the plot surface.
    pub fn time_at(&self, pixel: f64) -> f64 {
        self.start + (pixel / self.width_pixels as f64) * self.width_seconds
    }

    /// Pixel position of a time value; may be off-surface for times
    /// outside the window.
    pub fn pixel_at(&self, t: f64) -> f64 {
        (t - self.start) / self.width_seconds * self.width_pixels as f64
    }

    /// Advances one full window, unless that would run past the end of the
    /// recording.
    pub fn page_forward(&mut self, recording_duration: f64) {
        let next = self.start + self.width_seconds;
        if next < recording_duration {
            self.start = next;
        }
    }

    /// Steps back one full window, clamped at the start of the recording.
    pub fn page_backward(&mut self) {
        self.start = (self.start - self.width_seconds).max(0.0);
    }

    pub fn jump_to_start(&mut self) {
        self.start = 0.0;
    }

    /// Shows the final window of the recording.
    pub fn jump_to_end(&mut self, recording_duration: f64) {
        self.start = (recording_duration - self.width_seconds).max(0.0);
    }
}
