//! Sample type abstraction for f32/f64 host buffers.
//!
//! The signal chain computes in `f64` internally. Host buffers may be 32-bit
//! or 64-bit, and this trait is where the two meet.

use std::ops::{Add, Mul, Sub};

/// Trait for audio sample types (f32, f64).
///
/// DSP code converts to `f64` on read and back on write.
pub trait Sample:
    Copy
    + Default
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + PartialOrd
{
    /// Zero value (0.0).
    const ZERO: Self;

    /// Unit value (1.0).
    const ONE: Self;

    /// Convert from f64.
    fn from_f64(value: f64) -> Self;

    /// Convert to f64.
    fn to_f64(self) -> f64;

    /// Absolute value.
    fn abs(self) -> Self;
}

macro_rules! impl_sample {
    ($ty:ty) => {
        impl Sample for $ty {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn abs(self) -> Self {
                <$ty>::abs(self)
            }
        }
    };
}

impl_sample!(f32);
impl_sample!(f64);
