//! Sample type abstraction for f32/f64 buffers.
//!
//! [`Sample`] covers the host side of a copy: any numeric type the caller
//! stores audio in. [`NativeSample`] is the subset the plugin ABI can
//! process directly and selects the matching process routine.

use std::ops::{Add, Mul, Sub};

use crate::abi::{AEffect, EffectFlags};
use crate::types::ProcessPrecision;

/// Trait for audio sample types (f32, f64).
///
/// All conversions go through explicit per-sample casts so copies between
/// host and native precision never reinterpret memory.
pub trait Sample:
    Copy + Default + Send + Sync + 'static + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + PartialOrd
{
    /// Zero value (0.0).
    const ZERO: Self;

    /// Unit value (1.0).
    const ONE: Self;

    /// Convert from f32.
    fn from_f32(value: f32) -> Self;

    /// Convert to f32.
    fn to_f32(self) -> f32;

    /// Convert from f64.
    fn from_f64(value: f64) -> Self;

    /// Convert to f64.
    fn to_f64(self) -> f64;

    /// Convert from any other sample type.
    #[inline(always)]
    fn from_sample<S: Sample>(value: S) -> Self {
        Self::from_f64(value.to_f64())
    }
}

impl Sample for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline(always)]
    fn from_f32(value: f32) -> Self {
        value
    }

    #[inline(always)]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline(always)]
    fn from_sample<S: Sample>(value: S) -> Self {
        value.to_f32()
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline(always)]
    fn from_f32(value: f32) -> Self {
        value as f64
    }

    #[inline(always)]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline(always)]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Native process routine for sample type `S`.
pub type NativeProcessFn<S> = extern "C" fn(*mut AEffect, *const *const S, *mut *mut S, i32);

/// Sample types the plugin ABI processes natively.
///
/// Sealed: only `f32` (`processReplacing`) and `f64`
/// (`processDoubleReplacing`) exist in the ABI.
pub trait NativeSample: Sample + sealed::Sealed {
    /// Precision announced through `SetProcessPrecision`.
    const PRECISION: ProcessPrecision;

    /// Capability flag the plugin sets when it implements the routine.
    const CAPABILITY: EffectFlags;

    /// The effect's process routine for this precision, if present.
    fn process_fn(effect: &AEffect) -> Option<NativeProcessFn<Self>>;
}

impl NativeSample for f32 {
    const PRECISION: ProcessPrecision = ProcessPrecision::Single;
    const CAPABILITY: EffectFlags = EffectFlags::CAN_REPLACING;

    #[inline]
    fn process_fn(effect: &AEffect) -> Option<NativeProcessFn<Self>> {
        effect.process_replacing
    }
}

impl NativeSample for f64 {
    const PRECISION: ProcessPrecision = ProcessPrecision::Double;
    const CAPABILITY: EffectFlags = EffectFlags::CAN_DOUBLE_REPLACING;

    #[inline]
    fn process_fn(effect: &AEffect) -> Option<NativeProcessFn<Self>> {
        effect.process_double_replacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_precision_conversion() {
        assert_eq!(f32::from_sample(0.25f64), 0.25f32);
        assert_eq!(f64::from_sample(-0.5f32), -0.5f64);
        assert_eq!(f32::from_sample(1.0f32), f32::ONE);
    }

    #[test]
    fn test_native_selection() {
        let effect = AEffect::empty();
        assert!(f32::process_fn(&effect).is_none());
        assert!(f64::process_fn(&effect).is_none());
        assert_eq!(f32::CAPABILITY, EffectFlags::CAN_REPLACING);
        assert_eq!(f64::PRECISION, ProcessPrecision::Double);
    }
}
