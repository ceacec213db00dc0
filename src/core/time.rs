//! Frame timing and the pausable simulation clock

use std::time::{Duration, Instant};

/// Tracks frame timing and calculates FPS
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps_timer: Instant,
    fps: f32,
    fps_frame_count: u32,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_timer: now,
            fps: 0.0,
            fps_frame_count: 0,
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        // Update FPS every second
        let fps_elapsed = now - self.fps_timer;
        if fps_elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frame_count as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = 0;
            self.fps_timer = now;
        }
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pausable, scalable elapsed-time accumulator.
///
/// The bend model consumes accumulated simulation time, not wall time, so
/// the host can pause the sway or slow it down without touching the
/// renderer. `advance` is the only writer; readers see a plain `f32`.
#[derive(Clone, Debug)]
pub struct SimClock {
    elapsed: f32,
    pub time_scale: f32,
    pub paused: bool,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            time_scale: 1.0,
            paused: false,
        }
    }

    /// Accumulate `dt * time_scale` seconds unless paused.
    pub fn advance(&mut self, dt_seconds: f32) {
        if !self.paused {
            self.elapsed += dt_seconds * self.time_scale;
        }
    }

    /// Accumulated simulation time in seconds.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Reset accumulated time to zero.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_clock_accumulates() {
        let mut clock = SimClock::new();
        clock.advance(0.5);
        clock.advance(0.25);
        assert!((clock.elapsed() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_sim_clock_pause() {
        let mut clock = SimClock::new();
        clock.advance(1.0);
        clock.paused = true;
        clock.advance(1.0);
        assert!((clock.elapsed() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sim_clock_time_scale() {
        let mut clock = SimClock::new();
        clock.time_scale = 2.0;
        clock.advance(0.5);
        assert!((clock.elapsed() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sim_clock_reset() {
        let mut clock = SimClock::new();
        clock.advance(3.0);
        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
    }
}
