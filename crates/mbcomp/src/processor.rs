//! The multiband compressor: plugin and prepared processor.
//!
//! ## Signal Flow
//!
//! ```text
//!  host ─▶ input gain ─▶ crossover ─┬─ low  ─▶ compressor ─┐
//!                                   ├─ mid  ─▶ compressor ─┼─▶ solo/mute sum ─▶ output gain ─▶ host
//!                                   └─ high ─▶ compressor ─┘
//! ```
//!
//! All processing runs in `f64` scratch buffers sized once in
//! [`Plugin::build`]. Host blocks longer than the configured maximum are
//! processed in consecutive sub-blocks.

use std::sync::Arc;

use log::{debug, info, warn};

use mbcomp_core::{
    AudioBuffer, AudioProcessor, AudioSetup, Buffer, BusLayout, HasParameters, Parameters,
    Plugin, PluginError, Sample,
};

use crate::band::Band;
use crate::compressor::{CompressorBand, CompressorSettings, GainReductionMeter};
use crate::crossover::ThreeBandCrossover;
use crate::gain::GainStage;
use crate::mixer::{recombine, BandRouting};
use crate::parameters::MultibandParameters;

/// Gain reduction meters, one per band, indexed by [`Band::index`].
pub type BandMeters = [GainReductionMeter; Band::COUNT];

// =============================================================================
// Plugin (Unprepared State)
// =============================================================================

/// The multiband compressor before an audio setup is known.
///
/// Parameters and meters are shared through `Arc`s, so a control context can
/// keep handles to them across prepare/unprepare cycles.
pub struct MultibandCompressor {
    parameters: Arc<MultibandParameters>,
    meters: Arc<BandMeters>,
}

impl MultibandCompressor {
    pub fn new() -> Self {
        Self::with_parameters(Arc::new(MultibandParameters::new()))
    }

    /// Use an existing parameter set.
    pub fn with_parameters(parameters: Arc<MultibandParameters>) -> Self {
        Self {
            parameters,
            meters: Arc::new(Default::default()),
        }
    }

    /// Shared handle to the parameters for the control context.
    pub fn parameters_handle(&self) -> Arc<MultibandParameters> {
        Arc::clone(&self.parameters)
    }

    /// Shared handle to the gain reduction meters.
    pub fn meters(&self) -> Arc<BandMeters> {
        Arc::clone(&self.meters)
    }
}

impl Default for MultibandCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl HasParameters for MultibandCompressor {
    type Parameters = MultibandParameters;

    fn parameters(&self) -> &MultibandParameters {
        &self.parameters
    }
}

impl Plugin for MultibandCompressor {
    type Processor = MultibandProcessor;

    /// Mono or stereo, with as many inputs as outputs.
    fn check_layout(&self, layout: &BusLayout) -> Result<(), PluginError> {
        match layout.output_channels {
            1 | 2 if layout.input_channels == layout.output_channels => Ok(()),
            _ => Err(PluginError::UnsupportedLayout {
                input: layout.input_channels,
                output: layout.output_channels,
            }),
        }
    }

    fn build(self, setup: AudioSetup) -> MultibandProcessor {
        let channels = setup.layout.output_channels;
        let max_block = setup.max_block_size;
        let sample_rate = setup.sample_rate;

        info!(
            "Preparing multiband compressor: {} Hz, {} samples, {} channel(s)",
            sample_rate, max_block, channels
        );

        let mut crossover = ThreeBandCrossover::new(
            self.parameters.low_mid_crossover.get(),
            self.parameters.mid_high_crossover.get(),
        );
        crossover.prepare(sample_rate, channels);

        let compressors = Band::ALL.map(|band| {
            let mut compressor = CompressorBand::new();
            compressor.update_settings(CompressorSettings::from_parameters(
                self.parameters.band(band),
            ));
            compressor.prepare(sample_rate, channels);
            compressor
        });

        let mut input_gain = GainStage::new();
        input_gain.prepare(sample_rate);
        let mut output_gain = GainStage::new();
        output_gain.prepare(sample_rate);

        let mut processor = MultibandProcessor {
            parameters: self.parameters,
            meters: self.meters,
            setup,
            crossover,
            compressors,
            routing: [BandRouting::default(); Band::COUNT],
            input_gain,
            output_gain,
            working: AudioBuffer::new(channels, max_block),
            bands: std::array::from_fn(|_| AudioBuffer::new(channels, max_block)),
        };

        // Start at the stored gains instead of ramping up from unity
        processor.refresh_parameters();
        processor.input_gain.snap();
        processor.output_gain.snap();
        processor
    }
}

// =============================================================================
// Audio Processor (Prepared State)
// =============================================================================

/// The multiband compressor configured for one [`AudioSetup`].
pub struct MultibandProcessor {
    parameters: Arc<MultibandParameters>,
    meters: Arc<BandMeters>,
    setup: AudioSetup,

    crossover: ThreeBandCrossover,
    compressors: [CompressorBand; Band::COUNT],
    routing: [BandRouting; Band::COUNT],
    input_gain: GainStage,
    output_gain: GainStage,

    /// Full-band signal: input, then the recombined output
    working: AudioBuffer<f64>,
    /// Per-band scratch, indexed by [`Band::index`]
    bands: [AudioBuffer<f64>; Band::COUNT],
}

impl MultibandProcessor {
    /// Pull every parameter-derived value from the shared parameters.
    ///
    /// Called at the start of every block. Calling it again without a
    /// parameter change leaves all state as it was.
    pub fn refresh_parameters(&mut self) {
        let parameters = &*self.parameters;

        self.crossover.set_cutoffs(
            parameters.low_mid_crossover.get(),
            parameters.mid_high_crossover.get(),
        );

        for band in Band::ALL {
            let band_parameters = parameters.band(band);
            self.compressors[band.index()]
                .update_settings(CompressorSettings::from_parameters(band_parameters));
            self.routing[band.index()] = BandRouting::from_parameters(band_parameters);
        }

        self.input_gain.set_gain_decibels(parameters.input_gain.get());
        self.output_gain.set_gain_decibels(parameters.output_gain.get());
    }

    /// Shared handle to the gain reduction meters.
    pub fn meters(&self) -> Arc<BandMeters> {
        Arc::clone(&self.meters)
    }

    /// Effective crossover cutoffs after clamping.
    pub fn crossover_cutoffs(&self) -> (f64, f64) {
        self.crossover.cutoffs()
    }

    /// Read-only view of the band signals of the last processed block.
    pub fn band_buffer(&self, band: Band) -> &AudioBuffer<f64> {
        &self.bands[band.index()]
    }

    /// Process at most `max_block_size` frames.
    fn process_block<S: Sample>(&mut self, buffer: &mut Buffer<'_, S>) {
        self.refresh_parameters();

        self.working.copy_from_buffer(buffer);
        self.input_gain.process(&mut self.working);

        self.crossover.split(&self.working, &mut self.bands);

        for ((compressor, band), meter) in self
            .compressors
            .iter_mut()
            .zip(self.bands.iter_mut())
            .zip(self.meters.iter())
        {
            meter.set(compressor.process(band));
        }

        recombine(&mut self.working, &self.bands, &self.routing);

        self.output_gain.process(&mut self.working);
        self.working.write_into(buffer);
    }
}

impl HasParameters for MultibandProcessor {
    type Parameters = MultibandParameters;

    fn parameters(&self) -> &MultibandParameters {
        &self.parameters
    }
}

impl AudioProcessor for MultibandProcessor {
    type Plugin = MultibandCompressor;

    fn setup(&self) -> &AudioSetup {
        &self.setup
    }

    fn process<S: Sample>(&mut self, buffer: &mut Buffer<'_, S>) {
        buffer.clear_unused_outputs();

        let num_samples = buffer.num_samples();
        let max_block = self.setup.max_block_size;

        if num_samples <= max_block {
            self.process_block(buffer);
            return;
        }

        let mut start = 0;
        while start < num_samples {
            let end = (start + max_block).min(num_samples);
            let mut block = buffer.sub_block(start..end);
            self.process_block(&mut block);
            start = end;
        }
    }

    fn reset(&mut self) {
        debug!("Resetting multiband compressor state");
        self.refresh_parameters();
        self.crossover.reset();
        for compressor in &mut self.compressors {
            compressor.reset();
        }
        self.input_gain.reset();
        self.output_gain.reset();
        for buffer in self.bands.iter_mut().chain(std::iter::once(&mut self.working)) {
            buffer.set_num_samples(buffer.capacity());
            buffer.clear();
        }
        for meter in self.meters.iter() {
            meter.set(0.0);
        }
    }

    /// Restore parameters, then jump the gain stages to the loaded values.
    fn load_state(&mut self, data: &[u8]) -> Result<(), PluginError> {
        if let Err(error) = self.parameters.load_state(data) {
            warn!("Ignoring unreadable state ({} bytes): {}", data.len(), error);
            return Err(error);
        }
        self.refresh_parameters();
        self.input_gain.snap();
        self.output_gain.snap();
        Ok(())
    }

    fn unprepare(self) -> MultibandCompressor {
        debug!("Releasing multiband compressor buffers");
        MultibandCompressor {
            parameters: self.parameters,
            meters: self.meters,
        }
    }
}
