//! Parameter and pin property structures.

use crate::name::{Ascii24, Ascii64, Ascii8};

// =============================================================================
// ParameterProperties
// =============================================================================

/// Bits stored in [`ParameterProperties::flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterFlags(pub i32);

impl ParameterFlags {
    /// On/off switch.
    pub const IS_SWITCH: Self = Self(1);
    /// `min_integer` and `max_integer` are valid.
    pub const USES_INTEGER_MIN_MAX: Self = Self(1 << 1);
    /// Float step fields are valid.
    pub const USES_FLOAT_STEP: Self = Self(1 << 2);
    /// Integer step fields are valid.
    pub const USES_INT_STEP: Self = Self(1 << 3);
    /// `display_index` is valid.
    pub const SUPPORTS_DISPLAY_INDEX: Self = Self(1 << 4);
    /// Category fields are valid.
    pub const SUPPORTS_DISPLAY_CATEGORY: Self = Self(1 << 5);
    /// The parameter can ramp.
    pub const CAN_RAMP: Self = Self(1 << 6);

    #[inline]
    pub const fn bits(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Extended parameter description (152 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParameterProperties {
    pub step_float: f32,
    pub small_step_float: f32,
    pub large_step_float: f32,
    pub label: Ascii64,
    /// Raw [`ParameterFlags`].
    pub flags: i32,
    pub min_integer: i32,
    pub max_integer: i32,
    pub step_integer: i32,
    pub large_step_integer: i32,
    pub short_label: Ascii8,
    pub display_index: i16,
    pub category: i16,
    pub num_parameters_in_category: i16,
    pub reserved: i16,
    pub category_label: Ascii24,
    pub future: [u8; 16],
}

impl ParameterProperties {
    /// Typed view of the flags.
    #[inline]
    pub fn parameter_flags(&self) -> ParameterFlags {
        ParameterFlags(self.flags)
    }

    /// Integer range, if the plugin declared one.
    pub fn integer_range(&self) -> Option<(i32, i32)> {
        self.parameter_flags()
            .contains(ParameterFlags::USES_INTEGER_MIN_MAX)
            .then_some((self.min_integer, self.max_integer))
    }

    /// Whether the parameter is an on/off switch.
    pub fn is_switch(&self) -> bool {
        self.parameter_flags().contains(ParameterFlags::IS_SWITCH)
    }
}

// =============================================================================
// PinProperties
// =============================================================================

/// Bits stored in [`PinProperties::flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinFlags(pub i32);

impl PinFlags {
    /// Ignored by hosts.
    pub const IS_ACTIVE: Self = Self(1);
    /// First pin of a stereo pair.
    pub const IS_STEREO: Self = Self(1 << 1);
    /// `arrangement_type` is valid.
    pub const USE_SPEAKER: Self = Self(1 << 2);

    #[inline]
    pub const fn bits(self) -> i32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Input or output pin description (128 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinProperties {
    pub label: Ascii64,
    /// Raw [`PinFlags`].
    pub flags: i32,
    /// Raw arrangement code, valid with [`PinFlags::USE_SPEAKER`].
    pub arrangement_type: i32,
    pub short_label: Ascii8,
    pub future: [u8; 48],
}

impl Default for PinProperties {
    fn default() -> Self {
        Self {
            label: Ascii64::zeroed(),
            flags: 0,
            arrangement_type: 0,
            short_label: Ascii8::zeroed(),
            future: [0; 48],
        }
    }
}

impl PinProperties {
    #[inline]
    pub fn pin_flags(&self) -> PinFlags {
        PinFlags(self.flags)
    }

    /// Whether this pin starts a stereo pair.
    pub fn is_stereo(&self) -> bool {
        self.pin_flags().contains(PinFlags::IS_STEREO)
    }
}
