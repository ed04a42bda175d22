//! Ramped full-band gain.

use mbcomp_core::{db_to_linear, AudioBuffer, Smoother, SmoothingStyle};

/// Ramp time of every gain change.
pub const GAIN_RAMP_MS: f64 = 50.0;

/// Trim gain that ramps linearly to each new target.
///
/// The ramp runs on the amplitude factor, not on decibels.
#[derive(Debug, Clone)]
pub struct GainStage {
    smoother: Smoother,
}

impl GainStage {
    /// Unity gain.
    pub fn new() -> Self {
        let mut smoother = Smoother::new(SmoothingStyle::Linear(GAIN_RAMP_MS));
        smoother.reset(1.0);
        Self { smoother }
    }

    /// Configure the ramp length. Any ramp in progress is completed.
    pub fn prepare(&mut self, sample_rate: f64) {
        self.smoother.set_sample_rate(sample_rate);
        self.snap();
    }

    pub fn set_gain_decibels(&mut self, db: f64) {
        self.smoother.set_target(db_to_linear(db));
    }

    /// Jump to the current target without ramping.
    pub fn snap(&mut self) {
        self.smoother.reset(self.smoother.target());
    }

    /// Current amplitude factor.
    pub fn gain(&self) -> f64 {
        self.smoother.current()
    }

    pub fn is_ramping(&self) -> bool {
        self.smoother.is_smoothing()
    }

    /// Apply the gain in place, advancing the ramp by one block.
    pub fn process(&mut self, buffer: &mut AudioBuffer<f64>) {
        if !self.smoother.is_smoothing() {
            let gain = self.smoother.current();
            if gain != 1.0 {
                buffer.apply_gain(gain);
            }
            return;
        }

        // Every channel walks the same ramp
        for channel in buffer.channels_mut() {
            let mut ramp = self.smoother.clone();
            for sample in channel.iter_mut() {
                *sample *= ramp.next();
            }
        }
        self.smoother.skip(buffer.num_samples());
    }

    pub fn reset(&mut self) {
        self.snap();
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ones(channels: usize, len: usize) -> AudioBuffer<f64> {
        let mut buffer = AudioBuffer::new(channels, len);
        for channel in buffer.channels_mut() {
            channel.fill(1.0);
        }
        buffer
    }

    #[test]
    fn unity_leaves_signal_alone() {
        let mut stage = GainStage::new();
        stage.prepare(48_000.0);
        stage.set_gain_decibels(0.0);
        let mut buffer = ones(2, 64);
        stage.process(&mut buffer);
        assert!(buffer.channel(1).iter().all(|&s| s == 1.0));
    }

    #[test]
    fn change_ramps_over_50_ms() {
        let mut stage = GainStage::new();
        stage.prepare(1000.0);
        stage.set_gain_decibels(-6.0);
        assert!(stage.is_ramping());

        let mut buffer = ones(2, 50);
        stage.process(&mut buffer);
        let target = db_to_linear(-6.0);

        let samples = buffer.channel(0);
        assert!(samples[0] < 1.0 && samples[0] > target);
        assert_relative_eq!(samples[49], target, epsilon = 1e-12);
        assert_eq!(buffer.channel(0), buffer.channel(1));
        assert!(!stage.is_ramping());
        assert_relative_eq!(stage.gain(), target, epsilon = 1e-12);
    }

    #[test]
    fn ramp_continues_across_blocks() {
        let mut stage = GainStage::new();
        stage.prepare(1000.0);
        stage.set_gain_decibels(6.0);

        let mut first = ones(1, 20);
        stage.process(&mut first);
        let mut second = ones(1, 20);
        stage.process(&mut second);

        let step = first.channel(0)[1] - first.channel(0)[0];
        assert_relative_eq!(second.channel(0)[0] - first.channel(0)[19], step, epsilon = 1e-12);
    }

    #[test]
    fn snap_skips_the_ramp() {
        let mut stage = GainStage::new();
        stage.prepare(48_000.0);
        stage.set_gain_decibels(-24.0);
        stage.snap();
        let mut buffer = ones(1, 4);
        stage.process(&mut buffer);
        assert_relative_eq!(buffer.channel(0)[0], db_to_linear(-24.0));
    }
}
