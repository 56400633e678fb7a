//! Frame-rate measurement, frame limiting, and the demotion policy
//!
//! All timestamps are milliseconds from the host's monotonic clock
//! (`performance.now()` in the browser), passed in by the caller so the logic
//! stays deterministic under test.

use super::tier::RenderTier;

/// Length of one measurement window
pub const DEFAULT_WINDOW_MS: f64 = 2000.0;

/// Below this fps the accelerated tier is demoted to the SVG fallback
pub const OPTIMIZED_MIN_FPS: f64 = 15.0;

/// Below this fps the SVG fallback is demoted to the static gradient
pub const SIMPLE_MIN_FPS: f64 = 10.0;

/// Frames counted over one closed window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRateSample {
    pub frames: u32,
    pub duration_ms: f64,
    pub fps: f64,
}

/// Rolling frame counter that yields one sample per window
#[derive(Debug, Clone)]
pub struct FrameRateSampler {
    window_ms: f64,
    frames: u32,
    window_start: Option<f64>,
}

impl FrameRateSampler {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW_MS)
    }

    pub fn with_window(window_ms: f64) -> Self {
        Self {
            window_ms,
            frames: 0,
            window_start: None,
        }
    }

    /// Open the first window at `now`
    pub fn start(&mut self, now: f64) {
        self.frames = 0;
        self.window_start = Some(now);
    }

    /// Count a frame; returns a sample when the current window closes.
    ///
    /// A frame seen before [`start`](Self::start) opens the window instead.
    pub fn record_frame(&mut self, now: f64) -> Option<FrameRateSample> {
        let Some(start) = self.window_start else {
            self.start(now);
            return None;
        };

        self.frames += 1;
        let elapsed = now - start;
        if elapsed < self.window_ms {
            return None;
        }

        let sample = FrameRateSample {
            frames: self.frames,
            duration_ms: elapsed,
            fps: f64::from(self.frames) * 1000.0 / elapsed,
        };
        self.start(now);
        Some(sample)
    }

    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }

    pub fn frames_in_window(&self) -> u32 {
        self.frames
    }
}

impl Default for FrameRateSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Thresholds for trending toward cheaper rendering. There is no promotion
/// path: once degraded, the backdrop stays degraded for the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemotionPolicy {
    pub optimized_min_fps: f64,
    pub simple_min_fps: f64,
}

impl DemotionPolicy {
    /// Tier to move to after a window measured at `fps`, if any
    pub fn evaluate(&self, fps: f64, current: RenderTier) -> Option<RenderTier> {
        match current {
            RenderTier::Optimized if fps < self.optimized_min_fps => Some(RenderTier::Simple),
            RenderTier::Simple if fps < self.simple_min_fps => Some(RenderTier::None),
            _ => None,
        }
    }
}

impl Default for DemotionPolicy {
    fn default() -> Self {
        Self {
            optimized_min_fps: OPTIMIZED_MIN_FPS,
            simple_min_fps: SIMPLE_MIN_FPS,
        }
    }
}

/// Sampler plus policy: feed it frames, get demotion requests back
#[derive(Debug, Clone, Default)]
pub struct QualityMonitor {
    sampler: FrameRateSampler,
    policy: DemotionPolicy,
    last_sample: Option<FrameRateSample>,
}

impl QualityMonitor {
    pub fn new(sampler: FrameRateSampler, policy: DemotionPolicy) -> Self {
        Self {
            sampler,
            policy,
            last_sample: None,
        }
    }

    pub fn start(&mut self, now: f64) {
        self.sampler.start(now);
    }

    /// Count a host frame while `current` is active
    pub fn on_frame(&mut self, now: f64, current: RenderTier) -> Option<RenderTier> {
        let sample = self.sampler.record_frame(now)?;
        self.last_sample = Some(sample);
        self.policy.evaluate(sample.fps, current)
    }

    pub fn last_sample(&self) -> Option<FrameRateSample> {
        self.last_sample
    }
}

/// Skips frames that arrive sooner than the target interval
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    interval_ms: f64,
    last_frame: Option<f64>,
}

impl FrameLimiter {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_frame: None,
        }
    }

    /// Whether a frame at `now` should be rendered; records it if so
    pub fn should_render(&mut self, now: f64) -> bool {
        if let Some(last) = self.last_frame {
            if now - last < self.interval_ms {
                return false;
            }
        }
        self.last_frame = Some(now);
        true
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }
}
