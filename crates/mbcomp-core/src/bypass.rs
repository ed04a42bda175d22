//! Soft bypass with a per-sample crossfade.
//!
//! A processor that can be bypassed keeps running its detector while bypassed
//! and only changes how much of its effect is applied. [`BypassHandler`]
//! tracks the bypass state and hands out a `(wet, dry)` gain pair for every
//! frame so the effect fades in and out instead of switching.
//!
//! ```ignore
//! match self.bypass.begin(bypassed) {
//!     BypassAction::Passthrough => { /* leave the signal alone */ }
//!     BypassAction::Process => { /* apply the effect */ }
//!     BypassAction::ProcessAndCrossfade => {
//!         for frame in 0..num_samples {
//!             let (wet, dry) = self.bypass.next_gains();
//!             // out = effect * wet + input * dry
//!         }
//!     }
//! }
//! ```

/// State of a [`BypassHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassState {
    /// Effect fully applied.
    Active,
    /// Fading from effect to dry signal.
    RampingToBypassed,
    /// Effect fully removed.
    Bypassed,
    /// Fading from dry signal back to effect.
    RampingToActive,
}

/// What the processor should do for the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassAction {
    /// Fully bypassed: leave the signal unmodified.
    Passthrough,
    /// Fully active: apply the effect.
    Process,
    /// Transitioning: blend effect and dry signal with
    /// [`BypassHandler::next_gains`] for every frame of the block.
    ProcessAndCrossfade,
}

/// Bypass state machine with a linear crossfade.
///
/// Not generic over the sample type: gains are `f64` and converted by the
/// caller. Never allocates.
#[derive(Debug, Clone)]
pub struct BypassHandler {
    state: BypassState,
    /// 0 = fully wet, `ramp_samples` = fully dry
    ramp_position: u32,
    ramp_samples: u32,
}

impl BypassHandler {
    /// Create an active handler with the given crossfade length (0 = switch instantly).
    pub fn new(ramp_samples: u32) -> Self {
        Self {
            state: BypassState::Active,
            ramp_position: 0,
            ramp_samples,
        }
    }

    /// Create a handler whose crossfade lasts `ms` milliseconds.
    pub fn with_duration(ms: f64, sample_rate: f64) -> Self {
        let samples = (ms * sample_rate / 1000.0).round();
        Self::new(if samples > 0.0 { samples as u32 } else { 0 })
    }

    #[inline]
    pub fn state(&self) -> BypassState {
        self.state
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        matches!(
            self.state,
            BypassState::RampingToBypassed | BypassState::RampingToActive
        )
    }

    #[inline]
    pub fn ramp_samples(&self) -> u32 {
        self.ramp_samples
    }

    /// Settle immediately in the given state, dropping any ramp in progress.
    pub fn reset(&mut self, bypassed: bool) {
        if bypassed {
            self.state = BypassState::Bypassed;
            self.ramp_position = self.ramp_samples;
        } else {
            self.state = BypassState::Active;
            self.ramp_position = 0;
        }
    }

    /// Update the target state for this block and report what to do.
    pub fn begin(&mut self, bypassed: bool) -> BypassAction {
        self.set_bypass(bypassed);

        match self.state {
            BypassState::Bypassed => BypassAction::Passthrough,
            BypassState::Active => BypassAction::Process,
            BypassState::RampingToBypassed | BypassState::RampingToActive => {
                BypassAction::ProcessAndCrossfade
            }
        }
    }

    /// Gains for the next frame as `(wet, dry)`, advancing the ramp.
    ///
    /// Outside a ramp this returns the settled gains. When the ramp reaches its
    /// end the handler settles in the target state.
    #[inline]
    pub fn next_gains(&mut self) -> (f64, f64) {
        let t = if self.ramp_samples == 0 {
            if self.state == BypassState::Bypassed { 1.0 } else { 0.0 }
        } else {
            self.ramp_position as f64 / self.ramp_samples as f64
        };

        match self.state {
            BypassState::RampingToBypassed => {
                self.ramp_position = (self.ramp_position + 1).min(self.ramp_samples);
                if self.ramp_position >= self.ramp_samples {
                    self.state = BypassState::Bypassed;
                }
            }
            BypassState::RampingToActive => {
                self.ramp_position = self.ramp_position.saturating_sub(1);
                if self.ramp_position == 0 {
                    self.state = BypassState::Active;
                }
            }
            BypassState::Active | BypassState::Bypassed => {}
        }

        (1.0 - t, t)
    }

    fn set_bypass(&mut self, bypassed: bool) {
        if self.ramp_samples == 0 {
            self.reset(bypassed);
            return;
        }

        match (self.state, bypassed) {
            (BypassState::Active, true) => {
                self.state = BypassState::RampingToBypassed;
                self.ramp_position = 0;
            }
            (BypassState::Bypassed, false) => {
                self.state = BypassState::RampingToActive;
                self.ramp_position = self.ramp_samples;
            }
            // Reversal keeps the ramp position so the fade turns around in place
            (BypassState::RampingToBypassed, false) => {
                self.state = BypassState::RampingToActive;
            }
            (BypassState::RampingToActive, true) => {
                self.state = BypassState::RampingToBypassed;
            }
            _ => {}
        }
    }
}

impl Default for BypassHandler {
    /// 64 samples.
    fn default() -> Self {
        Self::new(64)
    }
}
