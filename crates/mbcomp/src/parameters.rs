//! Parameter layout of the multiband compressor.
//!
//! Seven parameters per band plus four global ones, all living in atomic
//! cells. The audio context reads them through the typed fields of
//! [`MultibandParameters`]; the control context goes through the
//! [`Parameters`] registry by key.
//!
//! | key                         | range              | step | default |
//! |-----------------------------|--------------------|------|---------|
//! | `Threshold_<Band>_Band`     | -60 .. +12 dB      | 1    | 0 dB    |
//! | `Attack_<Band>_Band`        | 5 .. 500 ms        | 1    | 50 ms   |
//! | `Release_<Band>_Band`       | 5 .. 500 ms        | 1    | 250 ms  |
//! | `Ratio_<Band>_Band`         | 1:1 .. 100:1       |      | 3:1     |
//! | `Bypassed_<Band>_Band`      | off / on           |      | off     |
//! | `Mute_<Band>_Band`          | off / on           |      | off     |
//! | `Solo_<Band>_Band`          | off / on           |      | off     |
//! | `Gain_in`, `Gain_out`       | -24 .. +24 dB      | 0.5  | 0 dB    |
//! | `Low_Mid_Crossover_Freq`    | 20 .. 999 Hz       | 1    | 400 Hz  |
//! | `Mid_High_Crossover_Freq`   | 1000 .. 20000 Hz   | 1    | 2000 Hz |

use mbcomp_core::{
    BoolParameter, EnumParameter, FloatParameter, GroupInfo, ParameterGroups, ParameterRef,
    Parameters, ROOT_GROUP_ID,
};
use mbcomp_macros::EnumParameter;

use crate::band::Band;

pub const INPUT_GAIN_KEY: &str = "Gain_in";
pub const OUTPUT_GAIN_KEY: &str = "Gain_out";
pub const LOW_MID_CROSSOVER_KEY: &str = "Low_Mid_Crossover_Freq";
pub const MID_HIGH_CROSSOVER_KEY: &str = "Mid_High_Crossover_Freq";

/// Compression ratio choices. Each label is paired with its ratio.
#[derive(Debug, Clone, Copy, PartialEq, EnumParameter)]
pub enum Ratio {
    #[name = "1.0"]
    #[value = 1.0]
    R1,
    #[name = "1.5"]
    #[value = 1.5]
    R1_5,
    #[name = "2.0"]
    #[value = 2.0]
    R2,
    #[default]
    #[name = "3.0"]
    #[value = 3.0]
    R3,
    #[name = "4.0"]
    #[value = 4.0]
    R4,
    #[name = "5.0"]
    #[value = 5.0]
    R5,
    #[name = "6.0"]
    #[value = 6.0]
    R6,
    #[name = "7.0"]
    #[value = 7.0]
    R7,
    #[name = "8.0"]
    #[value = 8.0]
    R8,
    #[name = "10.0"]
    #[value = 10.0]
    R10,
    #[name = "15.0"]
    #[value = 15.0]
    R15,
    #[name = "20.0"]
    #[value = 20.0]
    R20,
    #[name = "50.0"]
    #[value = 50.0]
    R50,
    #[name = "100.0"]
    #[value = 100.0]
    R100,
}

/// Parameters of one compressor band.
pub struct BandParameters {
    pub threshold: FloatParameter,
    pub attack: FloatParameter,
    pub release: FloatParameter,
    pub ratio: EnumParameter<Ratio>,
    pub bypassed: BoolParameter,
    pub mute: BoolParameter,
    pub solo: BoolParameter,
}

impl BandParameters {
    pub const COUNT: usize = 7;

    pub fn new(band: Band) -> Self {
        let keys = band.keys();
        let group = band.group_id();

        Self {
            threshold: FloatParameter::db(keys.threshold.0, keys.threshold.1, 0.0, -60.0..=12.0)
                .with_step(1.0)
                .with_short_name("Threshold")
                .with_group(group),
            attack: FloatParameter::ms(keys.attack.0, keys.attack.1, 50.0, 5.0..=500.0)
                .with_step(1.0)
                .with_skew_centre(80.0)
                .with_short_name("Attack")
                .with_group(group),
            release: FloatParameter::ms(keys.release.0, keys.release.1, 250.0, 5.0..=500.0)
                .with_step(1.0)
                .with_skew_centre(80.0)
                .with_short_name("Release")
                .with_group(group),
            ratio: EnumParameter::new(keys.ratio.0, keys.ratio.1)
                .with_short_name("Ratio")
                .with_group(group),
            bypassed: BoolParameter::new(keys.bypassed.0, keys.bypassed.1, false)
                .as_bypass()
                .with_short_name("Bypass")
                .with_group(group),
            mute: BoolParameter::new(keys.mute.0, keys.mute.1, false)
                .with_short_name("Mute")
                .with_group(group),
            solo: BoolParameter::new(keys.solo.0, keys.solo.1, false)
                .with_short_name("Solo")
                .with_group(group),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &dyn ParameterRef> + '_ {
        [
            &self.threshold as &dyn ParameterRef,
            &self.attack,
            &self.release,
            &self.ratio,
            &self.bypassed,
            &self.mute,
            &self.solo,
        ]
        .into_iter()
    }
}

/// Every parameter of the multiband compressor.
///
/// Shared between contexts as `Arc<MultibandParameters>`.
pub struct MultibandParameters {
    pub bands: [BandParameters; Band::COUNT],
    pub input_gain: FloatParameter,
    pub output_gain: FloatParameter,
    pub low_mid_crossover: FloatParameter,
    pub mid_high_crossover: FloatParameter,
}

impl MultibandParameters {
    pub fn new() -> Self {
        Self {
            bands: Band::ALL.map(BandParameters::new),
            input_gain: FloatParameter::db(INPUT_GAIN_KEY, "Input Gain", 0.0, -24.0..=24.0)
                .with_step(0.5)
                .with_short_name("In"),
            output_gain: FloatParameter::db(OUTPUT_GAIN_KEY, "Output Gain", 0.0, -24.0..=24.0)
                .with_step(0.5)
                .with_short_name("Out"),
            low_mid_crossover: FloatParameter::hz(
                LOW_MID_CROSSOVER_KEY,
                "Low-Mid Crossover",
                400.0,
                20.0..=999.0,
            )
            .with_step(1.0)
            .with_short_name("Low-Mid"),
            mid_high_crossover: FloatParameter::hz(
                MID_HIGH_CROSSOVER_KEY,
                "Mid-High Crossover",
                2000.0,
                1000.0..=20000.0,
            )
            .with_step(1.0)
            .with_short_name("Mid-High"),
        }
    }

    #[inline]
    pub fn band(&self, band: Band) -> &BandParameters {
        &self.bands[band.index()]
    }
}

impl Default for MultibandParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterGroups for MultibandParameters {
    fn group_count(&self) -> usize {
        1 + Band::COUNT
    }

    fn group_info(&self, index: usize) -> Option<GroupInfo> {
        match index {
            0 => Some(GroupInfo::root()),
            i => Band::ALL
                .get(i - 1)
                .map(|band| GroupInfo::new(band.group_id(), band.name(), ROOT_GROUP_ID)),
        }
    }
}

impl Parameters for MultibandParameters {
    fn count(&self) -> usize {
        Band::COUNT * BandParameters::COUNT + 4
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &dyn ParameterRef> + '_> {
        let globals = [
            &self.input_gain as &dyn ParameterRef,
            &self.output_gain,
            &self.low_mid_crossover,
            &self.mid_high_crossover,
        ];
        Box::new(
            self.bands
                .iter()
                .flat_map(BandParameters::iter)
                .chain(globals),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbcomp_core::{EnumParameterValue, ParameterKind};

    #[test]
    fn ratio_choices_pair_label_and_value() {
        assert_eq!(Ratio::COUNT, 14);
        assert_eq!(Ratio::DEFAULT_INDEX, 3);
        assert_eq!(Ratio::default_value().value(), 3.0);
        let expected = [
            1.0, 1.5, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0, 15.0, 20.0, 50.0, 100.0,
        ];
        for (index, value) in expected.iter().enumerate() {
            let ratio = Ratio::from_index(index).unwrap();
            assert_eq!(ratio.value(), *value);
            assert_eq!(Ratio::name(index), format!("{:.1}", value));
        }
    }

    #[test]
    fn layout_is_complete_and_valid() {
        let p = MultibandParameters::new();
        assert_eq!(p.count(), 25);
        assert_eq!(p.iter().count(), p.count());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn defaults() {
        let p = MultibandParameters::new();
        for band in Band::ALL {
            let b = p.band(band);
            assert_eq!(b.threshold.get(), 0.0);
            assert_eq!(b.attack.get(), 50.0);
            assert_eq!(b.release.get(), 250.0);
            assert_eq!(b.ratio.get(), Ratio::R3);
            assert!(!b.bypassed.get() && !b.mute.get() && !b.solo.get());
        }
        assert_eq!(p.input_gain.get(), 0.0);
        assert_eq!(p.output_gain.get(), 0.0);
        assert_eq!(p.low_mid_crossover.get(), 400.0);
        assert_eq!(p.mid_high_crossover.get(), 2000.0);
    }

    #[test]
    fn lookup_by_flat_key() {
        let p = MultibandParameters::new();
        let attack = p.float_parameter("Attack_High_Band").unwrap();
        attack.set(12.0);
        assert_eq!(p.band(Band::High).attack.get(), 12.0);

        assert!(p.bool_parameter("Solo_Low_Band").is_ok());
        assert!(p.float_parameter("Gain_in").is_ok());
        assert_eq!(
            p.parameter("Ratio_Mid_Band").unwrap().kind(),
            ParameterKind::Choice
        );
        assert!(p.float_parameter("Attack").is_err());
    }

    #[test]
    fn ranges_clamp_and_step() {
        let p = MultibandParameters::new();
        let band = p.band(Band::Low);
        band.threshold.set(-70.0);
        assert_eq!(band.threshold.get(), -60.0);
        band.attack.set(3.0);
        assert_eq!(band.attack.get(), 5.0);
        p.input_gain.set(1.3);
        assert_eq!(p.input_gain.get(), 1.5);
        p.low_mid_crossover.set(1500.0);
        assert_eq!(p.low_mid_crossover.get(), 999.0);
    }

    #[test]
    fn groups_one_per_band() {
        let p = MultibandParameters::new();
        assert_eq!(p.group_count(), 4);
        assert_eq!(p.find_group_by_name("Mid Band"), Some(Band::Mid.group_id()));
        assert_eq!(p.band(Band::High).solo.info().group_id, Band::High.group_id());
        assert_eq!(p.input_gain.info().group_id, ROOT_GROUP_ID);
    }
}
