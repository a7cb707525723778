/// Longest step handed to the simulator, in seconds.
pub const MAX_FRAME_DT: f64 = 0.05;

/// Turns host frame timestamps (milliseconds) into simulation steps.
///
/// Steps are clamped to [`MAX_FRAME_DT`] so a stalled host (a hidden tab, a debugger) does not
/// produce one huge integration step on resume.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    last_ms: Option<f64>,
    paused: bool,
}

impl FrameClock {
    /// A running clock that has not seen a frame yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) timing at `now_ms`.
    pub fn start(&mut self, now_ms: f64) {
        self.last_ms = Some(now_ms);
        self.paused = false;
    }

    /// Step for the frame at `now_ms`, or `None` while paused.
    ///
    /// The first frame after construction only records the timestamp and yields 0.
    pub fn tick(&mut self, now_ms: f64) -> Option<f64> {
        if self.paused {
            return None;
        }
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        Some(dt)
    }

    /// Stop producing steps.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume at `now_ms`; the paused interval is not simulated.
    pub fn resume(&mut self, now_ms: f64) {
        self.start(now_ms);
    }

    /// Whether the clock is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
