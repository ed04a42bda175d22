//! Mapping between plain parameter values and the normalized 0..1 domain.
//!
//! Plain values are in natural units (dB, Hz, ms). The normalized value is
//! what the atomic cell stores and what a host or UI control moves.
//!
//! - [`LinearMapper`] - straight line between the endpoints
//! - [`LogMapper`] - equal ratios get equal travel, for frequencies
//! - [`SkewMapper`] - power-curve skew, for ranges that need more resolution
//!   at one end
//!
//! ```ignore
//! let freq = LogMapper::new(20.0..=20000.0);
//! assert!((freq.denormalize(0.5) - 632.5).abs() < 0.1);
//! ```

use std::ops::RangeInclusive;

/// Conversion between plain and normalized values.
///
/// Shared between threads inside parameters, hence `Send + Sync`.
pub trait RangeMapper: Send + Sync {
    /// Plain to normalized, clamped to 0..1.
    fn normalize(&self, plain: f64) -> f64;

    /// Normalized to plain, input clamped to 0..1.
    fn denormalize(&self, normalized: f64) -> f64;

    /// Plain range as `(min, max)`.
    fn range(&self) -> (f64, f64);

    /// Clamp a plain value into the range.
    fn clamp(&self, plain: f64) -> f64 {
        let (min, max) = self.range();
        plain.clamp(min, max)
    }
}

/// Linear mapping.
#[derive(Debug, Clone)]
pub struct LinearMapper {
    min: f64,
    max: f64,
}

impl LinearMapper {
    pub fn new(range: RangeInclusive<f64>) -> Self {
        Self {
            min: *range.start(),
            max: *range.end(),
        }
    }
}

impl RangeMapper for LinearMapper {
    fn normalize(&self, plain: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 0.0;
        }
        ((plain - self.min) / span).clamp(0.0, 1.0)
    }

    fn denormalize(&self, normalized: f64) -> f64 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }

    fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Logarithmic mapping for strictly positive ranges.
///
/// # Panics
///
/// Panics if the range start is not positive or the range is empty.
#[derive(Debug, Clone)]
pub struct LogMapper {
    min: f64,
    max: f64,
    min_log: f64,
    log_span: f64,
}

impl LogMapper {
    pub fn new(range: RangeInclusive<f64>) -> Self {
        let (min, max) = (*range.start(), *range.end());
        assert!(min > 0.0, "LogMapper needs a positive range, got min={min}");
        assert!(max > min, "LogMapper needs max > min, got {min}..={max}");
        Self {
            min,
            max,
            min_log: min.ln(),
            log_span: max.ln() - min.ln(),
        }
    }
}

impl RangeMapper for LogMapper {
    fn normalize(&self, plain: f64) -> f64 {
        ((plain.max(self.min).ln() - self.min_log) / self.log_span).clamp(0.0, 1.0)
    }

    fn denormalize(&self, normalized: f64) -> f64 {
        // Exact endpoints, exp(ln(x)) does not round-trip
        if normalized <= 0.0 {
            return self.min;
        }
        if normalized >= 1.0 {
            return self.max;
        }
        (self.min_log + normalized * self.log_span)
            .exp()
            .clamp(self.min, self.max)
    }

    fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

/// Skewed mapping: `normalized = linear ^ skew`.
///
/// A skew below 1 spends more travel on the low end of the range, above 1
/// on the high end. A skew of exactly 1 is linear.
///
/// # Panics
///
/// Panics if the skew is not positive or the range is empty.
#[derive(Debug, Clone)]
pub struct SkewMapper {
    min: f64,
    max: f64,
    skew: f64,
}

impl SkewMapper {
    pub fn new(range: RangeInclusive<f64>, skew: f64) -> Self {
        let (min, max) = (*range.start(), *range.end());
        assert!(max > min, "SkewMapper needs max > min, got {min}..={max}");
        assert!(skew > 0.0, "SkewMapper needs a positive skew, got {skew}");
        Self { min, max, skew }
    }

    /// Skew so that `centre` sits at normalized 0.5.
    pub fn with_centre(range: RangeInclusive<f64>, centre: f64) -> Self {
        let (min, max) = (*range.start(), *range.end());
        let linear = ((centre - min) / (max - min)).clamp(f64::EPSILON, 1.0 - f64::EPSILON);
        Self::new(range, 0.5f64.ln() / linear.ln())
    }

    pub fn skew(&self) -> f64 {
        self.skew
    }
}

impl RangeMapper for SkewMapper {
    fn normalize(&self, plain: f64) -> f64 {
        let linear = ((plain - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        linear.powf(self.skew)
    }

    fn denormalize(&self, normalized: f64) -> f64 {
        let linear = normalized.clamp(0.0, 1.0).powf(self.skew.recip());
        self.min + linear * (self.max - self.min)
    }

    fn range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_endpoints_and_clamping() {
        let m = LinearMapper::new(-60.0..=12.0);
        assert_eq!(m.denormalize(0.0), -60.0);
        assert_eq!(m.denormalize(1.0), 12.0);
        assert_eq!(m.normalize(-100.0), 0.0);
        assert_eq!(m.normalize(100.0), 1.0);
        assert_relative_eq!(m.normalize(0.0), 60.0 / 72.0);
    }

    #[test]
    fn log_midpoint_is_geometric_mean() {
        let m = LogMapper::new(20.0..=20000.0);
        assert_relative_eq!(m.denormalize(0.5), (20.0f64 * 20000.0).sqrt(), epsilon = 1e-9);
        assert_relative_eq!(m.normalize(2000.0), m.normalize(m.denormalize(m.normalize(2000.0))));
        assert_eq!(m.denormalize(1.0), 20000.0);
    }

    #[test]
    fn log_endpoints_are_exact() {
        for (min, max) in [(20.0, 20000.0), (20.0, 999.0), (1000.0, 20000.0), (0.1, 3.0)] {
            let m = LogMapper::new(min..=max);
            assert_eq!(m.denormalize(0.0), min);
            assert_eq!(m.denormalize(1.0), max);
            assert_eq!(m.denormalize(-0.5), min);
            assert_eq!(m.denormalize(1.5), max);
            assert_eq!(m.denormalize(m.normalize(max)), max);
        }
    }

    #[test]
    #[should_panic]
    fn log_rejects_non_positive_range() {
        LogMapper::new(0.0..=1.0);
    }

    #[test]
    fn skew_one_is_linear() {
        let skew = SkewMapper::new(5.0..=500.0, 1.0);
        let linear = LinearMapper::new(5.0..=500.0);
        for n in [0.0, 0.1, 0.37, 0.5, 0.99, 1.0] {
            assert_relative_eq!(skew.denormalize(n), linear.denormalize(n), epsilon = 1e-12);
        }
    }

    #[test]
    fn skew_centre_lands_at_half() {
        let m = SkewMapper::with_centre(5.0..=500.0, 80.0);
        assert_relative_eq!(m.normalize(80.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(m.denormalize(0.5), 80.0, epsilon = 1e-9);
        assert!(m.skew() < 1.0);
    }
}
