//! Band recombination with solo and mute.
//!
//! Solo wins over mute: while any band is soloed, exactly the soloed bands
//! are heard and mute flags are ignored. Otherwise every unmuted band is
//! heard. All bands muted is silence.

use mbcomp_core::AudioBuffer;

use crate::band::Band;
use crate::parameters::BandParameters;

/// Mute and solo flags of one band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandRouting {
    pub mute: bool,
    pub solo: bool,
}

impl BandRouting {
    pub fn new(mute: bool, solo: bool) -> Self {
        Self { mute, solo }
    }

    pub fn from_parameters(parameters: &BandParameters) -> Self {
        Self {
            mute: parameters.mute.get(),
            solo: parameters.solo.get(),
        }
    }
}

/// Which bands reach the output.
pub fn audible_bands(routing: &[BandRouting; Band::COUNT]) -> [bool; Band::COUNT] {
    let any_solo = routing.iter().any(|r| r.solo);
    routing.map(|r| if any_solo { r.solo } else { !r.mute })
}

/// Clear `output` and sum the audible bands into it.
///
/// `output` takes over the block length of the bands.
pub fn recombine(
    output: &mut AudioBuffer<f64>,
    bands: &[AudioBuffer<f64>; Band::COUNT],
    routing: &[BandRouting; Band::COUNT],
) {
    output.set_num_samples(bands[0].num_samples());
    output.clear();
    for (band, audible) in bands.iter().zip(audible_bands(routing)) {
        if audible {
            output.add_from(band);
        }
    }
}
