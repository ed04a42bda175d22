//! End-to-end behavior of the multiband signal chain.

use std::f64::consts::PI;
use std::sync::Arc;

use approx::assert_relative_eq;
use mbcomp::prelude::*;
use mbcomp_core::{db_to_linear, linear_to_db};

const SAMPLE_RATE: f64 = 48_000.0;
const BLOCK: usize = 512;

fn prepare(channels: usize) -> (MultibandProcessor, Arc<MultibandParameters>) {
    prepare_with(channels, |_| {})
}

/// Prepare a processor after adjusting parameters, so it starts settled.
fn prepare_with(
    channels: usize,
    configure: impl FnOnce(&MultibandParameters),
) -> (MultibandProcessor, Arc<MultibandParameters>) {
    let plugin = MultibandCompressor::new();
    let parameters = plugin.parameters_handle();
    configure(&*parameters);
    let layout = BusLayout {
        input_channels: channels,
        output_channels: channels,
    };
    let processor = plugin
        .prepare(AudioSetup::new(SAMPLE_RATE, BLOCK, layout))
        .unwrap();
    (processor, parameters)
}

fn bypass_all(parameters: &MultibandParameters) {
    for band in Band::ALL {
        parameters.band(band).bypassed.set(true);
    }
}

fn sine(freq: f64, amplitude: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| amplitude * (2.0 * PI * freq * i as f64 / SAMPLE_RATE).sin())
        .collect()
}

fn rms(samples: &[f64]) -> f64 {
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}

fn largest_step(samples: &[f64]) -> f64 {
    samples
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f64::max)
}

/// Run whole channels through the processor in host blocks of `block` frames.
fn run(processor: &mut MultibandProcessor, channels: &mut [Vec<f64>], block: usize) {
    let len = channels[0].len();
    let mut start = 0;
    while start < len {
        let end = (start + block).min(len);
        let mut buffer = Buffer::new(channels.iter_mut().map(|c| &mut c[start..end]), end - start);
        processor.process(&mut buffer);
        start = end;
    }
}

#[test]
fn silence_in_gives_silence_out() {
    let settings: [fn(&MultibandParameters); 3] = [
        |_| {},
        |p| {
            p.input_gain.set(24.0);
            p.output_gain.set(24.0);
            for band in Band::ALL {
                p.band(band).threshold.set(-60.0);
                p.band(band).ratio.set(Ratio::R100);
            }
        },
        |p| {
            p.input_gain.set(-24.0);
            p.low_mid_crossover.set(20.0);
            p.mid_high_crossover.set(20_000.0);
            p.band(Band::Mid).solo.set(true);
        },
    ];

    for configure in settings {
        let (mut processor, _) = prepare_with(2, configure);
        let mut channels = vec![vec![0.0; 48_000]; 2];
        run(&mut processor, &mut channels, BLOCK);
        for channel in &channels {
            assert!(channel.iter().all(|&s| s == 0.0));
        }
    }
}

#[test]
fn silence_after_signal_decays_without_denormals() {
    let (mut processor, _) = prepare(1);
    let mut burst = vec![sine(80.0, 0.9, 4800)];
    run(&mut processor, &mut burst, BLOCK);

    let mut tail = vec![vec![0.0; 480_000]];
    run(&mut processor, &mut tail, BLOCK);
    let end = &tail[0][470_000..];
    assert!(end.iter().all(|s| *s == 0.0 || s.is_normal()));
    assert!(rms(end) < 1e-9);
}

#[test]
fn bypassed_bands_reconstruct_the_input() {
    for freq in [50.0, 200.0, 400.0, 1000.0, 2000.0, 5000.0, 15_000.0] {
        let (mut processor, _) = prepare_with(1, bypass_all);
        let input = sine(freq, 0.5, 48_000);
        let mut channels = vec![input.clone()];
        run(&mut processor, &mut channels, BLOCK);

        let difference_db =
            linear_to_db(rms(&channels[0][24_000..])) - linear_to_db(rms(&input[24_000..]));
        assert!(
            difference_db.abs() < 0.05,
            "{} Hz deviates by {} dB",
            freq,
            difference_db
        );
    }
}

#[test]
fn one_khz_at_minus_6_dbfs_passes_unchanged() {
    let (mut processor, parameters) = prepare_with(2, bypass_all);
    assert_eq!(parameters.low_mid_crossover.get(), 400.0);
    assert_eq!(parameters.mid_high_crossover.get(), 2000.0);

    let amplitude = db_to_linear(-6.0);
    let input = sine(1000.0, amplitude, 48_000);
    let mut channels = vec![input.clone(), input.clone()];
    run(&mut processor, &mut channels, BLOCK);

    for channel in &channels {
        let tail = &channel[24_000..];
        assert_relative_eq!(rms(tail), rms(&input[24_000..]), max_relative = 0.005);
        let peak = tail.iter().fold(0.0_f64, |m, s| m.max(s.abs()));
        assert_relative_eq!(peak, amplitude, max_relative = 0.01);
    }
}

#[test]
fn solo_overrides_mute() {
    let input = {
        let low = sine(100.0, 0.3, BLOCK);
        let mid = sine(1000.0, 0.3, BLOCK);
        let high = sine(6000.0, 0.3, BLOCK);
        (0..BLOCK).map(|i| low[i] + mid[i] + high[i]).collect::<Vec<_>>()
    };

    for (low_muted, high_muted) in [(true, false), (true, true), (false, false), (false, true)] {
        let (mut processor, parameters) = prepare(1);
        parameters.band(Band::Low).mute.set(low_muted);
        parameters.band(Band::Mid).solo.set(true);
        parameters.band(Band::High).mute.set(high_muted);

        let mut channels = vec![input.clone()];
        run(&mut processor, &mut channels, BLOCK);

        assert_eq!(channels[0].as_slice(), processor.band_buffer(Band::Mid).channel(0));
    }
}

#[test]
fn muted_bands_drop_out_without_solo() {
    let (mut processor, parameters) = prepare(1);
    parameters.band(Band::Mid).mute.set(true);

    let mut channels = vec![sine(700.0, 0.4, BLOCK)];
    run(&mut processor, &mut channels, BLOCK);

    let low = processor.band_buffer(Band::Low).channel(0);
    let high = processor.band_buffer(Band::High).channel(0);
    for (i, out) in channels[0].iter().enumerate() {
        assert_eq!(*out, low[i] + high[i]);
    }
}

#[test]
fn all_bands_muted_is_silence() {
    let (mut processor, parameters) = prepare(2);
    for band in Band::ALL {
        parameters.band(band).mute.set(true);
    }
    let mut channels = vec![sine(440.0, 0.7, 4096), sine(880.0, 0.7, 4096)];
    run(&mut processor, &mut channels, BLOCK);
    assert!(channels.iter().flatten().all(|&s| s == 0.0));
}

#[test]
fn repeated_refresh_is_bit_identical() {
    let configure = |p: &MultibandParameters| {
        p.input_gain.set(3.0);
        p.low_mid_crossover.set(250.0);
        for band in Band::ALL {
            p.band(band).threshold.set(-30.0);
            p.band(band).attack.set(10.0);
            p.band(band).ratio.set(Ratio::R8);
        }
    };
    let (mut once, _) = prepare_with(2, configure);
    let (mut twice, _) = prepare_with(2, configure);

    let input = sine(300.0, 0.8, 8 * BLOCK);
    let mut a = vec![input.clone(), input.clone()];
    let mut b = vec![input.clone(), input];

    for block in 0..8 {
        let range = block * BLOCK..(block + 1) * BLOCK;
        let mut buffer = Buffer::new(a.iter_mut().map(|c| &mut c[range.clone()]), BLOCK);
        once.process(&mut buffer);

        twice.refresh_parameters();
        twice.refresh_parameters();
        let mut buffer = Buffer::new(b.iter_mut().map(|c| &mut c[range.clone()]), BLOCK);
        twice.process(&mut buffer);
    }

    assert_eq!(a, b);
}

#[test]
fn bypass_toggle_is_continuous() {
    let (mut processor, parameters) = prepare_with(1, |p| {
        let low = p.band(Band::Low);
        low.threshold.set(-40.0);
        low.ratio.set(Ratio::R20);
        low.attack.set(5.0);
        low.release.set(100.0);
    });

    let freq = 100.0;
    let amplitude = 0.5;
    let input = sine(freq, amplitude, 2 * 48_000);
    let (settle, toggled) = input.split_at(48_000);

    let mut first = vec![settle.to_vec()];
    run(&mut processor, &mut first, BLOCK);

    parameters.band(Band::Low).bypassed.set(true);
    let mut second = vec![toggled[..4800].to_vec()];
    run(&mut processor, &mut second, BLOCK);

    // The steepest step a clean sine of this amplitude can take
    let slope = 2.0 * PI * freq / SAMPLE_RATE * amplitude;

    let joined: Vec<f64> = first[0][47_000..].iter().chain(&second[0]).copied().collect();
    let step = largest_step(&joined);
    assert!(step < slope * 1.5, "step of {}", step);

    // The bypassed band ends up at full level
    assert!(rms(&second[0][2400..]) > 0.3);
}

#[test]
fn low_band_burst_is_compressed_alone() {
    let loud_low = |p: &MultibandParameters| {
        let low = p.band(Band::Low);
        low.threshold.set(-60.0);
        low.ratio.set(Ratio::R100);
        low.attack.set(5.0);
        low.release.set(5.0);
    };
    let (mut compressed, _) = prepare_with(1, loud_low);
    let (mut reference, _) = prepare(1);

    let low = sine(80.0, 0.8, 100 * BLOCK);
    let high = sine(6000.0, 0.1, 100 * BLOCK);
    let input: Vec<f64> = low.iter().zip(&high).map(|(l, h)| l + h).collect();

    let meters = compressed.meters();
    let mut low_rms = Vec::new();
    let mut reference_low_rms = Vec::new();

    for block in input.chunks(BLOCK) {
        let mut a = vec![block.to_vec()];
        run(&mut compressed, &mut a, BLOCK);
        let mut b = vec![block.to_vec()];
        run(&mut reference, &mut b, BLOCK);

        low_rms.push(rms(compressed.band_buffer(Band::Low).channel(0)));
        reference_low_rms.push(rms(reference.band_buffer(Band::Low).channel(0)));

        // Mid and high never see the low band's gain reduction
        for band in [Band::Mid, Band::High] {
            assert_eq!(
                compressed.band_buffer(band).channel(0),
                reference.band_buffer(band).channel(0)
            );
        }
    }

    let loudest_compressed = low_rms[50..].iter().copied().fold(0.0, f64::max);
    let quietest_reference = reference_low_rms[50..].iter().copied().fold(f64::MAX, f64::min);
    assert!(loudest_compressed < 0.02, "low band rms {}", loudest_compressed);
    assert!(quietest_reference > 0.4);

    assert!(meters[Band::Low.index()].get() > 40.0);
    assert_eq!(meters[Band::High.index()].get(), 0.0);
}

#[test]
fn input_and_output_gain_cancel() {
    let (mut processor, _) = prepare_with(1, |p| {
        bypass_all(p);
        p.input_gain.set(-12.0);
        p.output_gain.set(12.0);
    });
    let input = sine(1000.0, 0.25, 48_000);
    let mut channels = vec![input.clone()];
    run(&mut processor, &mut channels, BLOCK);
    assert_relative_eq!(rms(&channels[0][24_000..]), rms(&input[24_000..]), max_relative = 0.005);
}

#[test]
fn gain_change_ramps_without_clicks() {
    let (mut processor, parameters) = prepare_with(1, bypass_all);
    let mut warm = vec![sine(50.0, 0.5, 48_000)];
    run(&mut processor, &mut warm, BLOCK);

    parameters.output_gain.set(-24.0);
    let mut channels = vec![sine(50.0, 0.5, 48_000)];
    run(&mut processor, &mut channels, BLOCK);

    let slope = 2.0 * PI * 50.0 / SAMPLE_RATE * 0.5;
    assert!(largest_step(&channels[0]) < slope * 2.0);

    // After the 50 ms ramp the level sits 24 dB down
    let expected = rms(&warm[0][24_000..]) * db_to_linear(-24.0);
    assert_relative_eq!(rms(&channels[0][24_000..]), expected, max_relative = 0.01);
}

#[test]
fn f32_and_f64_hosts_agree() {
    let (mut wide, _) = prepare(1);
    let (mut narrow, _) = prepare(1);

    let input = sine(440.0, 0.5, BLOCK);
    let mut wide_samples = input.clone();
    let mut narrow_samples: Vec<f32> = input.iter().map(|&s| s as f32).collect();

    wide.process(&mut Buffer::new([wide_samples.as_mut_slice()], BLOCK));
    narrow.process(&mut Buffer::new([narrow_samples.as_mut_slice()], BLOCK));

    for (a, b) in wide_samples.iter().zip(&narrow_samples) {
        assert!((a - *b as f64).abs() < 1e-6);
    }
}

#[test]
fn non_finite_automation_keeps_output_finite() {
    let (mut processor, parameters) = prepare(2);
    parameters.output_gain.set(-6.0);
    parameters.input_gain.set_normalized(f64::NAN);
    parameters.output_gain.set_normalized(f64::NAN);
    parameters.band(Band::Low).threshold.set(f64::NAN);
    parameters.low_mid_crossover.set_normalized(f64::NAN);

    assert_eq!(parameters.input_gain.get(), 0.0);
    assert_eq!(parameters.output_gain.get(), -6.0);
    assert_eq!(parameters.band(Band::Low).threshold.get(), 0.0);
    assert_eq!(parameters.low_mid_crossover.get(), 400.0);

    let mut channels = vec![sine(150.0, 0.5, 8 * BLOCK), sine(3000.0, 0.5, 8 * BLOCK)];
    run(&mut processor, &mut channels, BLOCK);
    assert!(channels.iter().flatten().all(|s| s.is_finite()));
    assert!(rms(&channels[0][7 * BLOCK..]) > 0.1);
}
