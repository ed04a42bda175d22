//! Per-band dynamic range compressor.
//!
//! A peak envelope follower drives a hard-knee gain computer:
//!
//! ```text
//! env  = |x| + c · (env - |x|)        c = attack or release coefficient
//! gain = 1                            env <  threshold
//!      = (env / threshold)^(1/ratio - 1)   otherwise
//! ```
//!
//! The envelope keeps tracking while the band is bypassed, and bypass changes
//! crossfade between compressed and dry signal, so toggling it never jumps.

use std::sync::atomic::{AtomicU64, Ordering};

use mbcomp_core::{db_to_linear, linear_to_db, AudioBuffer, BypassAction, BypassHandler, EnumParameterValue};

use crate::parameters::BandParameters;

/// Length of the bypass crossfade.
pub const BYPASS_CROSSFADE_MS: f64 = 10.0;

/// Envelope values below this are flushed to zero after each block.
const DENORMAL_THRESHOLD: f64 = 1e-30;

/// One-pole ballistics coefficient for a time constant in milliseconds.
///
/// Times below one microsecond give an instantaneous follower.
#[inline]
fn ballistics_coefficient(time_ms: f64, sample_rate: f64) -> f64 {
    if time_ms < 1e-3 {
        0.0
    } else {
        (-2.0 * std::f64::consts::PI * 1000.0 / (time_ms * sample_rate)).exp()
    }
}

/// Largest gain reduction of the last processed block, in dB (≥ 0).
///
/// Written by the audio context, read by the control context.
#[derive(Debug, Default)]
pub struct GainReductionMeter {
    db: AtomicU64,
}

impl GainReductionMeter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.db.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, db: f64) {
        self.db.store(db.to_bits(), Ordering::Relaxed);
    }
}

/// Control values for one band, read from its parameters once per block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    pub threshold_db: f64,
    pub attack_ms: f64,
    pub release_ms: f64,
    pub ratio: f64,
    pub bypassed: bool,
}

impl CompressorSettings {
    pub fn from_parameters(parameters: &BandParameters) -> Self {
        Self {
            threshold_db: parameters.threshold.get(),
            attack_ms: parameters.attack.get(),
            release_ms: parameters.release.get(),
            ratio: parameters.ratio.get().value(),
            bypassed: parameters.bypassed.get(),
        }
    }
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold_db: 0.0,
            attack_ms: 50.0,
            release_ms: 250.0,
            ratio: 3.0,
            bypassed: false,
        }
    }
}

/// Coefficients derived from [`CompressorSettings`] and the sample rate.
#[derive(Debug, Clone, Copy)]
struct Curve {
    threshold: f64,
    threshold_inverse: f64,
    exponent: f64,
    attack: f64,
    release: f64,
}

impl Curve {
    fn new(settings: &CompressorSettings, sample_rate: f64) -> Self {
        let threshold = db_to_linear(settings.threshold_db);
        Self {
            threshold,
            threshold_inverse: if threshold > 0.0 { 1.0 / threshold } else { 0.0 },
            exponent: 1.0 / settings.ratio.max(1.0) - 1.0,
            attack: ballistics_coefficient(settings.attack_ms, sample_rate),
            release: ballistics_coefficient(settings.release_ms, sample_rate),
        }
    }

    /// Follow `input` and return the gain for this sample.
    #[inline]
    fn gain(&self, envelope: &mut f64, input: f64) -> f64 {
        let level = input.abs();
        let coefficient = if level > *envelope { self.attack } else { self.release };
        *envelope = level + coefficient * (*envelope - level);

        if *envelope < self.threshold {
            1.0
        } else {
            (*envelope * self.threshold_inverse).powf(self.exponent)
        }
    }
}

/// Compressor for one band with per-channel envelopes.
pub struct CompressorBand {
    settings: CompressorSettings,
    sample_rate: f64,
    curve: Curve,
    envelopes: Vec<f64>,
    bypass: BypassHandler,
}

impl CompressorBand {
    pub fn new() -> Self {
        let settings = CompressorSettings::default();
        let sample_rate = 44_100.0;
        Self {
            settings,
            sample_rate,
            curve: Curve::new(&settings, sample_rate),
            envelopes: Vec::new(),
            bypass: BypassHandler::with_duration(BYPASS_CROSSFADE_MS, sample_rate),
        }
    }

    /// Size the envelope state and settle bypass in its current state.
    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        self.sample_rate = sample_rate;
        self.curve = Curve::new(&self.settings, sample_rate);
        self.envelopes = vec![0.0; num_channels];
        self.bypass = BypassHandler::with_duration(BYPASS_CROSSFADE_MS, sample_rate);
        self.bypass.reset(self.settings.bypassed);
    }

    pub fn settings(&self) -> &CompressorSettings {
        &self.settings
    }

    /// Take new control values. Coefficients are recomputed only on change.
    pub fn update_settings(&mut self, settings: CompressorSettings) {
        if settings != self.settings {
            let curve_changed = settings.threshold_db != self.settings.threshold_db
                || settings.attack_ms != self.settings.attack_ms
                || settings.release_ms != self.settings.release_ms
                || settings.ratio != self.settings.ratio;
            self.settings = settings;
            if curve_changed {
                self.curve = Curve::new(&settings, self.sample_rate);
            }
        }
    }

    /// Compress `buffer` in place.
    ///
    /// Returns the largest gain reduction applied in this block, in dB.
    pub fn process(&mut self, buffer: &mut AudioBuffer<f64>) -> f64 {
        let curve = self.curve;
        let action = self.bypass.begin(self.settings.bypassed);
        let num_samples = buffer.num_samples();
        let mut min_gain = 1.0_f64;

        for (channel, envelope) in buffer.channels_mut().zip(self.envelopes.iter_mut()) {
            match action {
                BypassAction::Passthrough => {
                    for &sample in channel.iter() {
                        curve.gain(envelope, sample);
                    }
                }
                BypassAction::Process => {
                    for sample in channel.iter_mut() {
                        let gain = curve.gain(envelope, *sample);
                        min_gain = min_gain.min(gain);
                        *sample *= gain;
                    }
                }
                BypassAction::ProcessAndCrossfade => {
                    // Every channel follows the same ramp
                    let mut fade = self.bypass.clone();
                    for sample in channel.iter_mut() {
                        let gain = curve.gain(envelope, *sample);
                        let (wet, dry) = fade.next_gains();
                        let mixed = gain * wet + dry;
                        min_gain = min_gain.min(mixed);
                        *sample *= mixed;
                    }
                }
            }
            if envelope.abs() < DENORMAL_THRESHOLD {
                *envelope = 0.0;
            }
        }

        if action == BypassAction::ProcessAndCrossfade {
            for _ in 0..num_samples {
                self.bypass.next_gains();
            }
        }

        -linear_to_db(min_gain)
    }

    /// Clear envelopes and settle the bypass crossfade.
    pub fn reset(&mut self) {
        self.envelopes.fill(0.0);
        self.bypass.reset(self.settings.bypassed);
    }
}

impl Default for CompressorBand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_RATE: f64 = 48_000.0;

    fn constant(value: f64, channels: usize, len: usize) -> AudioBuffer<f64> {
        let mut buffer = AudioBuffer::new(channels, len);
        for channel in buffer.channels_mut() {
            channel.fill(value);
        }
        buffer
    }

    fn prepared(settings: CompressorSettings) -> CompressorBand {
        let mut band = CompressorBand::new();
        band.update_settings(settings);
        band.prepare(SAMPLE_RATE, 2);
        band
    }

    #[test]
    fn ballistics() {
        assert_eq!(ballistics_coefficient(0.0, SAMPLE_RATE), 0.0);
        let c = ballistics_coefficient(5.0, SAMPLE_RATE);
        assert!(c > 0.0 && c < 1.0);
        assert!(ballistics_coefficient(500.0, SAMPLE_RATE) > c);
    }

    #[test]
    fn below_threshold_is_untouched() {
        let mut band = prepared(CompressorSettings::default());
        let mut buffer = constant(0.5, 2, 512);
        let reduction = band.process(&mut buffer);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.5));
        assert_eq!(reduction, 0.0);
    }

    #[test]
    fn settles_on_static_curve() {
        let mut band = prepared(CompressorSettings {
            threshold_db: -20.0,
            attack_ms: 5.0,
            release_ms: 5.0,
            ratio: 4.0,
            bypassed: false,
        });
        let mut buffer = constant(1.0, 2, 48_000);
        let reduction = band.process(&mut buffer);

        // 20 dB over threshold at 4:1 leaves 5 dB over: -15 dBFS
        let expected = db_to_linear(-15.0);
        assert_relative_eq!(*buffer.channel(1).last().unwrap(), expected, epsilon = 1e-6);
        assert_relative_eq!(reduction, 15.0, epsilon = 1e-6);
    }

    #[test]
    fn unity_ratio_never_reduces() {
        let mut band = prepared(CompressorSettings {
            threshold_db: -60.0,
            ratio: 1.0,
            ..CompressorSettings::default()
        });
        let mut buffer = constant(0.9, 2, 1024);
        band.process(&mut buffer);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.9));
    }

    #[test]
    fn bypassed_passes_through_but_keeps_tracking() {
        let settings = CompressorSettings {
            threshold_db: -40.0,
            attack_ms: 5.0,
            release_ms: 500.0,
            ratio: 10.0,
            bypassed: true,
        };
        let mut band = prepared(settings);
        let mut buffer = constant(0.8, 2, 4800);
        assert_eq!(band.process(&mut buffer), 0.0);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.8));

        // Envelope is already up, so the first crossfaded sample is reduced
        band.update_settings(CompressorSettings {
            bypassed: false,
            ..settings
        });
        let mut buffer = constant(0.8, 2, 4800);
        band.process(&mut buffer);
        assert!(buffer.channel(0)[100] < 0.8);
    }

    #[test]
    fn bypass_crossfade_is_continuous() {
        let settings = CompressorSettings {
            threshold_db: -30.0,
            attack_ms: 5.0,
            release_ms: 50.0,
            ratio: 8.0,
            bypassed: false,
        };
        let mut band = prepared(settings);
        let mut warm = constant(0.5, 2, 9600);
        band.process(&mut warm);
        let last = *warm.channel(0).last().unwrap();

        band.update_settings(CompressorSettings {
            bypassed: true,
            ..settings
        });
        let mut buffer = constant(0.5, 2, 960);
        band.process(&mut buffer);

        let samples = buffer.channel(0);
        assert!((samples[0] - last).abs() < 0.01);
        for pair in samples.windows(2) {
            assert!((pair[1] - pair[0]).abs() < 0.01);
        }
        assert_eq!(samples[959], 0.5);
        assert_eq!(buffer.channel(0), buffer.channel(1));
    }

    #[test]
    fn reset_clears_envelopes() {
        let mut band = prepared(CompressorSettings {
            threshold_db: -20.0,
            attack_ms: 5.0,
            release_ms: 500.0,
            ratio: 4.0,
            bypassed: false,
        });
        let mut loud = constant(1.0, 2, 4800);
        band.process(&mut loud);
        band.reset();

        // A quiet signal right after reset sees no leftover reduction
        let mut quiet = constant(0.05, 2, 16);
        assert_eq!(band.process(&mut quiet), 0.0);
    }

    #[test]
    fn meter_round_trips_value() {
        let meter = GainReductionMeter::new();
        assert_eq!(meter.get(), 0.0);
        meter.set(7.5);
        assert_eq!(meter.get(), 7.5);
    }
}
