//! Frame timing

use std::time::{Duration, Instant};

/// Upper bound on a single frame delta, so a stall (window drag, breakpoint)
/// does not feed a huge step into the simulation
const MAX_DELTA: Duration = Duration::from_millis(250);

/// Tracks elapsed time between frames
#[derive(Debug, Clone)]
pub struct Time {
    /// Instant the clock was created
    startup: Instant,
    /// Instant of the last `update`
    last_update: Instant,
    /// Time between the last two updates
    delta: Duration,
    /// Number of updates so far
    frame_count: u64,
}

impl Time {
    /// Create a new clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            last_update: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance the clock; call once per frame
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_update).min(MAX_DELTA);
        self.last_update = now;
        self.frame_count += 1;
    }

    /// Time since the previous frame
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time since the previous frame, in seconds
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Time since the clock was created
    pub fn elapsed(&self) -> Duration {
        self.last_update.duration_since(self.startup)
    }

    /// Number of frames recorded
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_starts_at_zero() {
        let time = Time::new();
        assert_eq!(time.delta(), Duration::ZERO);
        assert_eq!(time.frame_count(), 0);
    }

    #[test]
    fn test_time_update_counts_frames_and_clamps() {
        let mut time = Time::new();
        time.update();
        time.update();
        assert_eq!(time.frame_count(), 2);
        assert!(time.delta() <= MAX_DELTA);
    }
}
