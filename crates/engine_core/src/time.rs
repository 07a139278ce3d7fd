//! Frame timing for the simulation loop.

use std::time::{Duration, Instant};

/// Largest render-frame delta handed to the integrator by default (seconds).
pub const DEFAULT_MAX_FRAME_DELTA: f32 = 0.1;

/// Clamp a render-frame delta to `[0, max_delta]`.
///
/// Non-finite deltas (a stalled clock, a bad caller) collapse to zero so a
/// tick never advances the body by an unbounded amount.
#[inline]
pub fn clamp_frame_delta(delta: f32, max_delta: f32) -> f32 {
    if !delta.is_finite() {
        return 0.0;
    }
    delta.clamp(0.0, max_delta.max(0.0))
}

/// Frame clock: measures render-frame deltas and hands out clamped ones.
#[derive(Debug)]
pub struct Time {
    /// Time when the clock started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Raw duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Upper bound applied by [`Time::clamped_delta_seconds`].
    max_frame_delta: f32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
        }
    }

    /// Create a clock with a custom frame-delta ceiling.
    pub fn with_max_frame_delta(max_frame_delta: f32) -> Self {
        let mut time = Self::new();
        time.set_max_frame_delta(max_frame_delta);
        time
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.elapsed = now - self.start_time;
        self.frame_count += 1;
    }

    /// Raw delta time of the last frame in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Delta time clamped to the frame-delta ceiling.
    pub fn clamped_delta_seconds(&self) -> f32 {
        clamp_frame_delta(self.delta_seconds(), self.max_frame_delta)
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn max_frame_delta(&self) -> f32 {
        self.max_frame_delta
    }

    pub fn set_max_frame_delta(&mut self, max_frame_delta: f32) {
        if max_frame_delta.is_finite() && max_frame_delta > 0.0 {
            self.max_frame_delta = max_frame_delta;
        } else {
            log::warn!(
                "Ignoring frame delta ceiling {}, keeping {}",
                max_frame_delta,
                self.max_frame_delta
            );
        }
    }

    /// Current FPS (from the last raw frame delta).
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}
