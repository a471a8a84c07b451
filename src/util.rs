//! Shared utilities

use std::collections::VecDeque;
use std::time::Instant;

// ============================================================================
// Frame Clock
// ============================================================================

/// Longest frame delta handed to the animation; longer stalls (window drags,
/// debugger pauses) are treated as this long.
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Frame clock with rolling FPS average.
///
/// Tracks both the per-frame delta and the total elapsed animation time the
/// shader is driven with.
pub struct FrameClock {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
    elapsed: f32,
}

impl FrameClock {
    /// Create a new clock with the specified FPS sample window
    pub fn new(sample_count: usize) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count: sample_count.max(1),
            elapsed: 0.0,
        }
    }

    /// Call once per frame. Returns the clamped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.record(dt)
    }

    /// Feed a delta measured elsewhere
    pub fn record(&mut self, dt: f32) -> f32 {
        let dt = dt.clamp(0.0, MAX_FRAME_DELTA);

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
        self.elapsed += dt;
        dt
    }

    /// Seconds of animation time accumulated so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn avg_dt(&self) -> f32 {
        self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32
    }

    /// Average FPS over the sample window
    pub fn avg_fps(&self) -> f32 {
        let avg = self.avg_dt();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    /// Get the average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_dt() * 1000.0
    }

    /// Get min/max FPS from sample window
    pub fn min_max_fps(&self) -> (f32, f32) {
        if self.frame_times.is_empty() {
            return (0.0, 0.0);
        }
        let min_dt = self.frame_times.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_dt = self.frame_times.iter().cloned().fold(0.0, f32::max);
        let max_fps = if min_dt > 0.0 { 1.0 / min_dt } else { 0.0 };
        let min_fps = if max_dt > 0.0 { 1.0 / max_dt } else { 0.0 };
        (min_fps, max_fps)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60)
    }
}
