//! Frame timing.
//!
//! [`Time`] measures wall-clock frame deltas for the window loop.
//! [`sanitize_delta`] guards the simulation against unusable deltas: a zero
//! or negative delta (clock resolution, the very first frame) would stall
//! the emission accumulator and cancel damping, and an infinite one would
//! leave the accumulator permanently infinite. Both are replaced with
//! [`FALLBACK_DELTA`].
//!
//! ```
//! use flurry::time::{sanitize_delta, FALLBACK_DELTA};
//!
//! assert_eq!(sanitize_delta(0.016), 0.016);
//! assert_eq!(sanitize_delta(0.0), FALLBACK_DELTA);
//! ```

use std::time::{Duration, Instant};

/// Delta substituted for a non-positive or non-finite frame time.
pub const FALLBACK_DELTA: f32 = 0.01;

/// Replace a zero, negative, infinite or NaN delta with [`FALLBACK_DELTA`].
#[inline]
pub fn sanitize_delta(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        FALLBACK_DELTA
    }
}

/// Wall-clock frame timer with pause.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
}

impl Time {
    /// Create a new timer starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
        }
    }

    /// Advance to a new frame and return its delta in seconds.
    ///
    /// The returned delta is raw: it may be zero. While paused it is always
    /// zero.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        if self.paused {
            0.0
        } else {
            raw_delta
        }
    }

    /// Frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second, refreshed twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
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
    use std::thread;

    #[test]
    fn test_sanitize_delta() {
        assert_eq!(sanitize_delta(0.5), 0.5);
        assert_eq!(sanitize_delta(0.0), FALLBACK_DELTA);
        assert_eq!(sanitize_delta(-0.2), FALLBACK_DELTA);
        assert_eq!(sanitize_delta(f32::NAN), FALLBACK_DELTA);
        assert_eq!(sanitize_delta(f32::INFINITY), FALLBACK_DELTA);
        assert_eq!(sanitize_delta(f32::NEG_INFINITY), FALLBACK_DELTA);
    }

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let delta = time.update();

        assert!(delta > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_time_pause() {
        let mut time = Time::new();
        time.toggle_pause();
        assert!(time.is_paused());

        thread::sleep(Duration::from_millis(5));
        assert_eq!(time.update(), 0.0);

        time.toggle_pause();
        thread::sleep(Duration::from_millis(5));
        assert!(time.update() > 0.0);
    }
}
