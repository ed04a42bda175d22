//! Parameter types with atomic storage.
//!
//! Every parameter owns one atomic cell. The audio context reads it with a
//! relaxed load every block; the control context writes it with a relaxed
//! store. Neither side ever blocks. Values of different parameters may be
//! observed out of step with each other, which is acceptable for automation.
//!
//! - [`FloatParameter`] - continuous value with range mapping, step and unit
//! - [`BoolParameter`] - on/off switch
//! - [`EnumParameter`] - discrete choice over an [`EnumParameterValue`] enum
//!
//! All three implement the type-erased [`ParameterRef`] used by the control
//! side (persistence, UI, host bridge).
//!
//! ```ignore
//! let threshold = FloatParameter::db("Threshold_Low_Band", "Threshold Low Band", 0.0, -60.0..=12.0)
//!     .with_step(1.0);
//!
//! threshold.set(-12.4);
//! assert_eq!(threshold.get(), -12.0);
//! let linear = threshold.as_linear();
//! ```

use std::marker::PhantomData;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use mbcomp_utils::fnv1a_32;

use crate::parameter_format::Formatter;
use crate::parameter_groups::GroupId;
use crate::parameter_info::{ParameterFlags, ParameterInfo};
use crate::parameter_range::{LinearMapper, LogMapper, RangeMapper, SkewMapper};
use crate::types::{ParameterId, ParameterValue};

// =============================================================================
// ParameterRef - type-erased access
// =============================================================================

/// Kind of value a parameter holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Float,
    Bool,
    Choice,
}

/// Type-erased view of a parameter.
///
/// Plain values are in natural units for floats, 0/1 for booleans and the
/// variant index for choices.
pub trait ParameterRef: Send + Sync {
    /// Static metadata.
    fn info(&self) -> &ParameterInfo;

    fn kind(&self) -> ParameterKind;

    fn get_normalized(&self) -> ParameterValue;

    fn set_normalized(&self, value: ParameterValue);

    fn normalized_to_plain(&self, normalized: ParameterValue) -> ParameterValue;

    fn plain_to_normalized(&self, plain: ParameterValue) -> ParameterValue;

    /// Display text for a normalized value.
    fn display_normalized(&self, normalized: ParameterValue) -> String;

    /// Parse display text into a normalized value.
    fn parse(&self, text: &str) -> Option<ParameterValue>;

    fn id(&self) -> ParameterId {
        self.info().id
    }

    fn key(&self) -> &'static str {
        self.info().key
    }

    fn name(&self) -> &'static str {
        self.info().name
    }

    fn get_plain(&self) -> ParameterValue {
        self.normalized_to_plain(self.get_normalized())
    }

    fn set_plain(&self, value: ParameterValue) {
        self.set_normalized(self.plain_to_normalized(value));
    }

    /// Display text for the current value.
    fn display(&self) -> String {
        self.display_normalized(self.get_normalized())
    }

    fn reset_to_default(&self) {
        self.set_normalized(self.info().default_normalized);
    }

    /// Downcast to a float parameter.
    fn as_float(&self) -> Option<&FloatParameter> {
        None
    }

    /// Downcast to a boolean parameter.
    fn as_bool(&self) -> Option<&BoolParameter> {
        None
    }
}

// =============================================================================
// FloatParameter
// =============================================================================

/// Continuous parameter in natural units.
///
/// The cell stores the normalized value as `f64` bits. Written values are
/// clamped to the range and snapped to the step, if one is set.
pub struct FloatParameter {
    info: ParameterInfo,
    value: AtomicU64,
    range: Box<dyn RangeMapper>,
    formatter: Formatter,
    step: Option<f64>,
    default_plain: f64,
    is_db: bool,
}

impl FloatParameter {
    /// Linear parameter with a generic number display.
    pub fn new(
        key: &'static str,
        name: &'static str,
        default: f64,
        range: RangeInclusive<f64>,
    ) -> Self {
        Self::with_mapper(key, name, default, Box::new(LinearMapper::new(range)))
            .with_formatter(Formatter::Float { precision: 2 })
    }

    /// Parameter whose plain value is in decibels.
    ///
    /// [`as_linear`](Self::as_linear) converts to an amplitude factor.
    pub fn db(key: &'static str, name: &'static str, default_db: f64, range_db: RangeInclusive<f64>) -> Self {
        let mut parameter = Self::new(key, name, default_db, range_db)
            .with_formatter(Formatter::Decibel { precision: 1 });
        parameter.is_db = true;
        parameter
    }

    /// Frequency parameter on a logarithmic scale.
    pub fn hz(key: &'static str, name: &'static str, default_hz: f64, range_hz: RangeInclusive<f64>) -> Self {
        Self::with_mapper(key, name, default_hz, Box::new(LogMapper::new(range_hz)))
            .with_formatter(Formatter::Frequency)
    }

    /// Time parameter in milliseconds.
    pub fn ms(key: &'static str, name: &'static str, default_ms: f64, range_ms: RangeInclusive<f64>) -> Self {
        Self::new(key, name, default_ms, range_ms)
            .with_formatter(Formatter::Milliseconds { precision: 1 })
    }

    fn with_mapper(
        key: &'static str,
        name: &'static str,
        default: f64,
        range: Box<dyn RangeMapper>,
    ) -> Self {
        let default = range.clamp(default);
        let default_normalized = range.normalize(default);
        Self {
            info: ParameterInfo::new(fnv1a_32(key), key, name).with_default(default_normalized),
            value: AtomicU64::new(default_normalized.to_bits()),
            range,
            formatter: Formatter::default(),
            step: None,
            default_plain: default,
            is_db: false,
        }
    }

    // === Builders ===

    /// Snap written values to multiples of `step` above the range start.
    pub fn with_step(mut self, step: f64) -> Self {
        if step > 0.0 {
            self.step = Some(step);
            let (min, max) = self.range.range();
            self.info.step_count = ((max - min) / step).round() as i32;
        }
        self
    }

    /// Skew the normalized mapping so `centre` sits at the middle of a control.
    ///
    /// Plain values, default and step are unaffected.
    pub fn with_skew_centre(mut self, centre: f64) -> Self {
        let (min, max) = self.range.range();
        self.range = Box::new(SkewMapper::with_centre(min..=max, centre));
        self.rebase_default();
        self
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self.info.units = formatter.units();
        self
    }

    pub fn with_short_name(mut self, short_name: &'static str) -> Self {
        self.info.short_name = short_name;
        self
    }

    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.info.group_id = group_id;
        self
    }

    fn rebase_default(&mut self) {
        let normalized = self.range.normalize(self.default_plain);
        self.info.default_normalized = normalized;
        self.value.store(normalized.to_bits(), Ordering::Relaxed);
    }

    // === Value access ===

    /// Current plain value.
    #[inline]
    pub fn get(&self) -> f64 {
        let normalized = f64::from_bits(self.value.load(Ordering::Relaxed));
        self.snap(self.range.denormalize(normalized))
    }

    /// Store a plain value, clamped and snapped.
    ///
    /// Non-finite values are ignored and the current value is kept.
    #[inline]
    pub fn set(&self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let normalized = self.range.normalize(self.snap(value));
        self.value.store(normalized.to_bits(), Ordering::Relaxed);
    }

    /// Current value as an amplitude factor for dB parameters, plain otherwise.
    #[inline]
    pub fn as_linear(&self) -> f64 {
        let plain = self.get();
        if self.is_db {
            db_to_linear(plain)
        } else {
            plain
        }
    }

    /// Default plain value.
    pub fn default_value(&self) -> f64 {
        self.default_plain
    }

    /// Plain range as `(min, max)`.
    pub fn range(&self) -> (f64, f64) {
        self.range.range()
    }

    pub fn step(&self) -> Option<f64> {
        self.step
    }

    fn snap(&self, plain: f64) -> f64 {
        let plain = self.range.clamp(plain);
        match self.step {
            Some(step) => {
                let (min, _) = self.range.range();
                self.range.clamp(min + ((plain - min) / step).round() * step)
            }
            None => plain,
        }
    }
}

impl ParameterRef for FloatParameter {
    fn info(&self) -> &ParameterInfo {
        &self.info
    }

    fn kind(&self) -> ParameterKind {
        ParameterKind::Float
    }

    fn get_normalized(&self) -> ParameterValue {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    fn set_normalized(&self, value: ParameterValue) {
        self.set(self.range.denormalize(value));
    }

    fn normalized_to_plain(&self, normalized: ParameterValue) -> ParameterValue {
        self.snap(self.range.denormalize(normalized))
    }

    fn plain_to_normalized(&self, plain: ParameterValue) -> ParameterValue {
        self.range.normalize(self.snap(plain))
    }

    fn get_plain(&self) -> ParameterValue {
        self.get()
    }

    fn set_plain(&self, value: ParameterValue) {
        self.set(value);
    }

    fn display_normalized(&self, normalized: ParameterValue) -> String {
        self.formatter.format(self.normalized_to_plain(normalized))
    }

    fn parse(&self, text: &str) -> Option<ParameterValue> {
        self.formatter
            .parse(text)
            .map(|plain| self.plain_to_normalized(plain))
    }

    fn as_float(&self) -> Option<&FloatParameter> {
        Some(self)
    }
}

// =============================================================================
// BoolParameter
// =============================================================================

/// On/off parameter.
pub struct BoolParameter {
    info: ParameterInfo,
    value: AtomicBool,
}

impl BoolParameter {
    pub fn new(key: &'static str, name: &'static str, default: bool) -> Self {
        Self {
            info: ParameterInfo::new(fnv1a_32(key), key, name)
                .with_default(if default { 1.0 } else { 0.0 })
                .with_steps(1),
            value: AtomicBool::new(default),
        }
    }

    /// Mark this switch as a bypass control.
    pub fn as_bypass(mut self) -> Self {
        self.info.flags = ParameterFlags {
            is_bypass: true,
            ..self.info.flags
        };
        self
    }

    pub fn with_short_name(mut self, short_name: &'static str) -> Self {
        self.info.short_name = short_name;
        self
    }

    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.info.group_id = group_id;
        self
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Relaxed);
    }
}

impl ParameterRef for BoolParameter {
    fn info(&self) -> &ParameterInfo {
        &self.info
    }

    fn kind(&self) -> ParameterKind {
        ParameterKind::Bool
    }

    fn get_normalized(&self) -> ParameterValue {
        if self.get() { 1.0 } else { 0.0 }
    }

    fn set_normalized(&self, value: ParameterValue) {
        self.set(value > 0.5);
    }

    fn normalized_to_plain(&self, normalized: ParameterValue) -> ParameterValue {
        if normalized > 0.5 { 1.0 } else { 0.0 }
    }

    fn plain_to_normalized(&self, plain: ParameterValue) -> ParameterValue {
        self.normalized_to_plain(plain)
    }

    fn display_normalized(&self, normalized: ParameterValue) -> String {
        Formatter::Boolean.format(normalized)
    }

    fn parse(&self, text: &str) -> Option<ParameterValue> {
        Formatter::Boolean.parse(text)
    }

    fn as_bool(&self) -> Option<&BoolParameter> {
        Some(self)
    }
}

// =============================================================================
// EnumParameterValue / EnumParameter
// =============================================================================

/// An enum usable as a discrete choice.
///
/// Implemented by `#[derive(EnumParameter)]`. Each variant carries a display
/// label and a numeric value, so DSP code never parses labels.
///
/// ```ignore
/// #[derive(Copy, Clone, PartialEq, EnumParameter)]
/// pub enum Ratio {
///     #[name = "1.0"]
///     #[value = 1.0]
///     OneToOne,
///     #[default]
///     #[name = "3.0"]
///     #[value = 3.0]
///     ThreeToOne,
/// }
/// ```
pub trait EnumParameterValue: Copy + PartialEq + Send + Sync + 'static {
    /// Number of variants.
    const COUNT: usize;

    /// Index of the `#[default]` variant, or 0.
    const DEFAULT_INDEX: usize;

    fn from_index(index: usize) -> Option<Self>;

    fn to_index(self) -> usize;

    fn default_value() -> Self;

    /// Display label of the variant at `index`.
    fn name(index: usize) -> &'static str;

    /// All labels in variant order.
    fn names() -> &'static [&'static str];

    /// Numeric value paired with this variant.
    fn value(self) -> f64;
}

/// Discrete choice parameter storing the variant index.
pub struct EnumParameter<E: EnumParameterValue> {
    info: ParameterInfo,
    value: AtomicUsize,
    _marker: PhantomData<E>,
}

impl<E: EnumParameterValue> EnumParameter<E> {
    /// Choice defaulting to the enum's `#[default]` variant.
    pub fn new(key: &'static str, name: &'static str) -> Self {
        Self::with_value(key, name, E::default_value())
    }

    /// Choice with an explicit default.
    pub fn with_value(key: &'static str, name: &'static str, default: E) -> Self {
        let index = default.to_index();
        Self {
            info: ParameterInfo::new(fnv1a_32(key), key, name)
                .with_default(index_to_normalized(index, E::COUNT))
                .with_steps(E::COUNT.saturating_sub(1) as i32)
                .with_flags(ParameterFlags {
                    is_list: true,
                    ..ParameterFlags::DEFAULT
                }),
            value: AtomicUsize::new(index),
            _marker: PhantomData,
        }
    }

    pub fn with_short_name(mut self, short_name: &'static str) -> Self {
        self.info.short_name = short_name;
        self
    }

    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.info.group_id = group_id;
        self
    }

    /// Current variant. An out-of-range index reads as the default.
    #[inline]
    pub fn get(&self) -> E {
        E::from_index(self.value.load(Ordering::Relaxed)).unwrap_or_else(E::default_value)
    }

    #[inline]
    pub fn set(&self, value: E) {
        self.value.store(value.to_index(), Ordering::Relaxed);
    }
}

impl<E: EnumParameterValue> ParameterRef for EnumParameter<E> {
    fn info(&self) -> &ParameterInfo {
        &self.info
    }

    fn kind(&self) -> ParameterKind {
        ParameterKind::Choice
    }

    fn get_normalized(&self) -> ParameterValue {
        index_to_normalized(self.get().to_index(), E::COUNT)
    }

    fn set_normalized(&self, value: ParameterValue) {
        self.value
            .store(normalized_to_index(value, E::COUNT), Ordering::Relaxed);
    }

    fn normalized_to_plain(&self, normalized: ParameterValue) -> ParameterValue {
        normalized_to_index(normalized, E::COUNT) as f64
    }

    fn plain_to_normalized(&self, plain: ParameterValue) -> ParameterValue {
        let index = if plain.is_finite() && plain > 0.0 {
            (plain.round() as usize).min(E::COUNT.saturating_sub(1))
        } else {
            0
        };
        index_to_normalized(index, E::COUNT)
    }

    fn display_normalized(&self, normalized: ParameterValue) -> String {
        E::name(normalized_to_index(normalized, E::COUNT)).to_string()
    }

    fn parse(&self, text: &str) -> Option<ParameterValue> {
        let text = text.trim();
        E::names()
            .iter()
            .position(|name| name.eq_ignore_ascii_case(text))
            .map(|index| index_to_normalized(index, E::COUNT))
    }
}

// =============================================================================
// Helpers
// =============================================================================

#[inline]
fn index_to_normalized(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index.min(count - 1) as f64 / (count - 1) as f64
    }
}

#[inline]
fn normalized_to_index(normalized: f64, count: usize) -> usize {
    if count <= 1 {
        0
    } else {
        ((normalized.clamp(0.0, 1.0) * (count - 1) as f64).round() as usize).min(count - 1)
    }
}

/// Decibels to amplitude factor. -100 dB and below is silence.
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    if db <= -100.0 {
        0.0
    } else {
        10.0_f64.powf(db / 20.0)
    }
}

/// Amplitude factor to decibels, floored at -100 dB.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 1e-5 {
        -100.0
    } else {
        20.0 * linear.log10()
    }
}
