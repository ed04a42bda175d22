//! Ramped values for click-free gain changes.
//!
//! [`Smoother`] moves a value toward a target over a fixed time. The ramp
//! length is configured once at stream start via
//! [`set_sample_rate`](Smoother::set_sample_rate); after that, targets can be
//! changed every block without allocation.
//!
//! ```ignore
//! let mut gain = Smoother::new(SmoothingStyle::Linear(50.0));
//! gain.set_sample_rate(48_000.0);
//! gain.reset(1.0);
//! gain.set_target(0.5);
//! for sample in block.iter_mut() {
//!     *sample *= gain.next();
//! }
//! ```
//!
//! `Smoother` takes `&mut self` to advance and belongs to the audio context.
//! The value it follows is read from an atomic parameter cell.

/// Targets closer than this are treated as unchanged.
const TARGET_EPSILON: f64 = 1e-10;

/// How a [`Smoother`] approaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SmoothingStyle {
    /// Jump to the target immediately.
    #[default]
    None,

    /// Straight-line ramp lasting the given number of milliseconds.
    ///
    /// A target change restarts the ramp from the current value, so the
    /// target is always reached exactly after the ramp time.
    Linear(f64),
}

/// A value that ramps toward a target one sample at a time.
#[derive(Debug, Clone)]
pub struct Smoother {
    style: SmoothingStyle,
    ramp_samples: u32,

    current: f64,
    target: f64,
    step_size: f64,
    steps_remaining: u32,
}

impl Smoother {
    /// Create a smoother. Call [`set_sample_rate`](Self::set_sample_rate)
    /// before processing.
    pub fn new(style: SmoothingStyle) -> Self {
        Self {
            style,
            ramp_samples: 0,
            current: 0.0,
            target: 0.0,
            step_size: 0.0,
            steps_remaining: 0,
        }
    }

    /// Smoothing style.
    pub fn style(&self) -> SmoothingStyle {
        self.style
    }

    /// Configure the ramp length for a sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.ramp_samples = match self.style {
            SmoothingStyle::None => 0,
            SmoothingStyle::Linear(ms) if sample_rate > 0.0 && ms > 0.0 => {
                (ms * sample_rate / 1000.0).round() as u32
            }
            SmoothingStyle::Linear(_) => 0,
        };
    }

    /// Ramp length in samples.
    pub fn ramp_samples(&self) -> u32 {
        self.ramp_samples
    }

    /// Start moving toward a new target.
    ///
    /// Setting the current target again has no effect, so calling this every
    /// block with an unchanged parameter leaves the ramp untouched.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() < TARGET_EPSILON {
            return;
        }
        self.target = target;

        if self.ramp_samples == 0 {
            self.current = target;
            self.steps_remaining = 0;
            self.step_size = 0.0;
        } else {
            self.steps_remaining = self.ramp_samples;
            self.step_size = (target - self.current) / self.ramp_samples as f64;
        }
    }

    /// Jump to a value with no ramp.
    pub fn reset(&mut self, value: f64) {
        self.current = value;
        self.target = value;
        self.steps_remaining = 0;
        self.step_size = 0.0;
    }

    /// Advance by one sample and return the new value.
    #[inline]
    pub fn next(&mut self) -> f64 {
        if self.steps_remaining > 0 {
            self.steps_remaining -= 1;
            self.current = if self.steps_remaining == 0 {
                self.target
            } else {
                self.current + self.step_size
            };
        }
        self.current
    }

    /// Advance by `samples` without producing values.
    pub fn skip(&mut self, samples: usize) {
        let count = samples.min(self.steps_remaining as usize) as u32;
        if count == 0 {
            return;
        }
        self.steps_remaining -= count;
        self.current = if self.steps_remaining == 0 {
            self.target
        } else {
            self.current + self.step_size * count as f64
        };
    }

    /// Current value without advancing.
    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Value being ramped toward.
    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Whether a ramp is in progress.
    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.steps_remaining > 0
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new(SmoothingStyle::None)
    }
}
