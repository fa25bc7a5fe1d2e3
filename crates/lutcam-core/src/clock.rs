//! Presentation timestamps for graded frames handed to a video encoder.

/// Turns capture timestamps into encoder-friendly presentation timestamps.
///
/// Output is in microseconds, starts at zero with the first frame, and is
/// strictly increasing: a timestamp that would not advance is bumped to
/// one microsecond past the previous one.
#[derive(Debug, Clone, Default)]
pub struct PtsNormalizer {
    first_us: Option<i64>,
    last_us: Option<i64>,
}

impl PtsNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one capture timestamp given in nanoseconds.
    pub fn next_pts(&mut self, timestamp_ns: i64) -> i64 {
        let ts_us = timestamp_ns / 1_000;
        let first = *self.first_us.get_or_insert(ts_us);

        let mut pts = ts_us - first;
        if let Some(last) = self.last_us.filter(|&last| pts <= last) {
            pts = last + 1;
        }
        self.last_us = Some(pts);
        pts
    }

    /// Forget the stream origin, e.g. when a new recording starts.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
