//! Linkwitz-Riley crossover network.
//!
//! A 4th-order Linkwitz-Riley filter (LR24, 24 dB/octave) is two cascaded
//! 2-pole Butterworth sections. Each section is a topology-preserving
//! state-variable filter with `Q = 1/√2`, which yields lowpass, bandpass and
//! highpass from the same state.
//!
//! The LR24 lowpass and highpass at one cutoff sum to a 2nd-order allpass at
//! that cutoff. [`ThreeBandCrossover`] uses that identity to keep the three
//! bands phase aligned:
//!
//! ```text
//!            ┌─ LP(f1) ─ AP(f2) ──────────── low
//!   input ───┤
//!            └─ HP(f1) ─┬─ LP(f2) ────────── mid
//!                       └─ HP(f2) ────────── high
//! ```
//!
//! low + mid + high = AP(f1)·AP(f2): flat magnitude, only phase is shifted.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use mbcomp_core::AudioBuffer;

use crate::band::Band;

/// Lowest cutoff a filter accepts.
const MIN_CUTOFF_HZ: f64 = 10.0;

/// Highest cutoff as a fraction of the sample rate. `tan` diverges at Nyquist.
const MAX_CUTOFF_RATIO: f64 = 0.49;

/// Filter states smaller than this are flushed to zero after each block.
const DENORMAL_THRESHOLD: f64 = 1e-30;

/// Response of a [`LinkwitzRileyFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Lowpass,
    Highpass,
    /// Phase response of LP + HP at the same cutoff, unity magnitude.
    Allpass,
}

#[derive(Debug, Clone, Copy)]
struct SvfCoefficients {
    k: f64,
    a1: f64,
    a2: f64,
    a3: f64,
}

impl SvfCoefficients {
    fn new(cutoff: f64, sample_rate: f64) -> Self {
        let g = (PI * cutoff / sample_rate).tan();
        let k = 1.0 / FRAC_1_SQRT_2;
        let a1 = 1.0 / (1.0 + g * (g + k));
        let a2 = g * a1;
        let a3 = g * a2;
        Self { k, a1, a2, a3 }
    }
}

/// Integrator state of one 2-pole section.
#[derive(Debug, Clone, Copy, Default)]
struct SvfState {
    ic1eq: f64,
    ic2eq: f64,
}

impl SvfState {
    /// Advance one sample, returning `(lowpass, bandpass, highpass)`.
    #[inline]
    fn tick(&mut self, c: &SvfCoefficients, x: f64) -> (f64, f64, f64) {
        let v3 = x - self.ic2eq;
        let v1 = c.a1 * self.ic1eq + c.a2 * v3;
        let v2 = self.ic2eq + c.a2 * self.ic1eq + c.a3 * v3;
        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        let low = v2;
        let band = v1;
        let high = x - c.k * band - low;
        (low, band, high)
    }

    fn flush_denormals(&mut self) {
        if self.ic1eq.abs() < DENORMAL_THRESHOLD {
            self.ic1eq = 0.0;
        }
        if self.ic2eq.abs() < DENORMAL_THRESHOLD {
            self.ic2eq = 0.0;
        }
    }
}

/// Clamp a cutoff into the range the coefficient formula is stable for.
#[inline]
fn clamp_cutoff(cutoff: f64, sample_rate: f64) -> f64 {
    cutoff.min(sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ)
}

/// LR24 filter with independent state per channel.
///
/// State persists across blocks. It is cleared by [`reset`](Self::reset) and
/// reallocated only by [`prepare`](Self::prepare).
#[derive(Debug, Clone)]
pub struct LinkwitzRileyFilter {
    filter_type: FilterType,
    cutoff: f64,
    sample_rate: f64,
    coefficients: SvfCoefficients,
    /// Two cascaded sections per channel
    state: Vec<[SvfState; 2]>,
}

impl LinkwitzRileyFilter {
    pub fn new(filter_type: FilterType, cutoff: f64) -> Self {
        let sample_rate = 44_100.0;
        let cutoff = clamp_cutoff(cutoff, sample_rate);
        Self {
            filter_type,
            cutoff,
            sample_rate,
            coefficients: SvfCoefficients::new(cutoff, sample_rate),
            state: Vec::new(),
        }
    }

    /// Size the per-channel state and clear it.
    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        self.sample_rate = sample_rate;
        self.state = vec![[SvfState::default(); 2]; num_channels];
        self.cutoff = clamp_cutoff(self.cutoff, sample_rate);
        self.coefficients = SvfCoefficients::new(self.cutoff, sample_rate);
    }

    #[inline]
    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    /// Current cutoff in Hz after clamping.
    #[inline]
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Change the cutoff. Coefficients are recomputed only when it moves.
    ///
    /// Filter state is kept, so automation does not click.
    pub fn set_cutoff(&mut self, cutoff: f64) {
        let cutoff = clamp_cutoff(cutoff, self.sample_rate);
        if cutoff != self.cutoff {
            self.cutoff = cutoff;
            self.coefficients = SvfCoefficients::new(cutoff, self.sample_rate);
        }
    }

    /// Filter every channel of `buffer` in place.
    ///
    /// Channels beyond the prepared channel count are left untouched.
    pub fn process(&mut self, buffer: &mut AudioBuffer<f64>) {
        let c = self.coefficients;
        let filter_type = self.filter_type;

        for (channel, state) in buffer.channels_mut().zip(self.state.iter_mut()) {
            let [first, second] = state;
            match filter_type {
                FilterType::Lowpass => {
                    for sample in channel.iter_mut() {
                        let (low, _, _) = first.tick(&c, *sample);
                        *sample = second.tick(&c, low).0;
                    }
                }
                FilterType::Highpass => {
                    for sample in channel.iter_mut() {
                        let (_, _, high) = first.tick(&c, *sample);
                        *sample = second.tick(&c, high).2;
                    }
                }
                FilterType::Allpass => {
                    for sample in channel.iter_mut() {
                        let (low, band, high) = first.tick(&c, *sample);
                        *sample = low - c.k * band + high;
                    }
                }
            }
            first.flush_denormals();
            second.flush_denormals();
        }
    }

    /// Clear the filter history.
    pub fn reset(&mut self) {
        self.state.fill([SvfState::default(); 2]);
    }
}

/// Splits one signal into low, mid and high bands at two cutoffs.
#[derive(Debug, Clone)]
pub struct ThreeBandCrossover {
    lp1: LinkwitzRileyFilter,
    hp1: LinkwitzRileyFilter,
    ap2: LinkwitzRileyFilter,
    lp2: LinkwitzRileyFilter,
    hp2: LinkwitzRileyFilter,
}

impl ThreeBandCrossover {
    pub fn new(low_mid: f64, mid_high: f64) -> Self {
        Self {
            lp1: LinkwitzRileyFilter::new(FilterType::Lowpass, low_mid),
            hp1: LinkwitzRileyFilter::new(FilterType::Highpass, low_mid),
            ap2: LinkwitzRileyFilter::new(FilterType::Allpass, mid_high),
            lp2: LinkwitzRileyFilter::new(FilterType::Lowpass, mid_high),
            hp2: LinkwitzRileyFilter::new(FilterType::Highpass, mid_high),
        }
    }

    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        for filter in self.filters_mut() {
            filter.prepare(sample_rate, num_channels);
        }
    }

    /// Set both cutoffs in Hz.
    ///
    /// The low-mid cutoff is clamped to the mid-high cutoff, so the band
    /// order never inverts.
    pub fn set_cutoffs(&mut self, low_mid: f64, mid_high: f64) {
        let sample_rate = self.lp1.sample_rate;
        let mid_high = clamp_cutoff(mid_high, sample_rate);
        let low_mid = clamp_cutoff(low_mid, sample_rate).min(mid_high);

        self.lp1.set_cutoff(low_mid);
        self.hp1.set_cutoff(low_mid);
        self.ap2.set_cutoff(mid_high);
        self.lp2.set_cutoff(mid_high);
        self.hp2.set_cutoff(mid_high);
    }

    /// Effective `(low_mid, mid_high)` cutoffs after clamping.
    pub fn cutoffs(&self) -> (f64, f64) {
        (self.lp1.cutoff(), self.lp2.cutoff())
    }

    /// Split `input` into the three band buffers, indexed by [`Band::index`].
    ///
    /// Every band buffer takes over the input's block length.
    pub fn split(&mut self, input: &AudioBuffer<f64>, bands: &mut [AudioBuffer<f64>; Band::COUNT]) {
        let [low, mid, high] = bands;

        low.copy_from(input);
        mid.copy_from(input);

        self.lp1.process(low);
        self.ap2.process(low);

        self.hp1.process(mid);
        high.copy_from(mid);

        self.lp2.process(mid);
        self.hp2.process(high);
    }

    /// Clear the history of every filter.
    pub fn reset(&mut self) {
        for filter in self.filters_mut() {
            filter.reset();
        }
    }

    fn filters_mut(&mut self) -> [&mut LinkwitzRileyFilter; 5] {
        [
            &mut self.lp1,
            &mut self.hp1,
            &mut self.ap2,
            &mut self.lp2,
            &mut self.hp2,
        ]
    }
}
