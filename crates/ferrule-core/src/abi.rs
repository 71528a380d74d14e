//! Raw VST2 effect ABI.
//!
//! [`AEffect`] is the structure a plugin's entry point returns. The host only
//! reads its header fields and calls through its function pointers; it never
//! writes to it. Function pointers are wrapped in `Option` because plugins
//! are allowed to leave deprecated or unsupported slots null; the `Option`
//! wrapper keeps the exact pointer layout.

use std::ffi::c_void;

/// Effect magic number, the ASCII bytes `VstP`.
pub const EFFECT_MAGIC: i32 = 0x5673_7450;

/// Protocol version implemented by this host (VST 2.4).
pub const VST_VERSION: i32 = 2400;

/// Host callback called by the plugin.
pub type HostCallbackProc = extern "C" fn(
    effect: *mut AEffect,
    opcode: i32,
    index: i32,
    value: isize,
    ptr: *mut c_void,
    opt: f32,
) -> isize;

/// Plugin entry point (`VSTPluginMain`).
pub type EntryProc = unsafe extern "C" fn(host: HostCallbackProc) -> *mut AEffect;

/// Effect dispatcher.
pub type DispatcherProc = extern "C" fn(
    effect: *mut AEffect,
    opcode: i32,
    index: i32,
    value: isize,
    ptr: *mut c_void,
    opt: f32,
) -> isize;

/// Deprecated accumulating process routine.
pub type ProcessProc =
    extern "C" fn(effect: *mut AEffect, inputs: *const *const f32, outputs: *mut *mut f32, frames: i32);

/// Single precision replacing process routine.
pub type ProcessReplacingProc =
    extern "C" fn(effect: *mut AEffect, inputs: *const *const f32, outputs: *mut *mut f32, frames: i32);

/// Double precision replacing process routine.
pub type ProcessDoubleReplacingProc =
    extern "C" fn(effect: *mut AEffect, inputs: *const *const f64, outputs: *mut *mut f64, frames: i32);

/// Parameter write routine.
pub type SetParameterProc = extern "C" fn(effect: *mut AEffect, index: i32, value: f32);

/// Parameter read routine.
pub type GetParameterProc = extern "C" fn(effect: *mut AEffect, index: i32) -> f32;

/// The effect structure returned by a plugin entry point.
#[repr(C)]
pub struct AEffect {
    /// Must equal [`EFFECT_MAGIC`].
    pub magic: i32,
    pub dispatcher: Option<DispatcherProc>,
    /// Deprecated in 2.4.
    pub process: Option<ProcessProc>,
    pub set_parameter: Option<SetParameterProc>,
    pub get_parameter: Option<GetParameterProc>,
    pub num_programs: i32,
    pub num_params: i32,
    pub num_inputs: i32,
    pub num_outputs: i32,
    /// See [`EffectFlags`].
    pub flags: i32,
    pub reserved1: isize,
    pub reserved2: isize,
    /// Latency in samples.
    pub initial_delay: i32,
    /// Deprecated in 2.4.
    pub real_qualities: i32,
    /// Deprecated in 2.4.
    pub off_qualities: i32,
    /// Deprecated in 2.4.
    pub io_ratio: f32,
    /// Plugin-private instance pointer.
    pub object: *mut c_void,
    /// Host-private pointer. Left untouched by this bridge.
    pub user: *mut c_void,
    pub unique_id: i32,
    pub version: i32,
    pub process_replacing: Option<ProcessReplacingProc>,
    pub process_double_replacing: Option<ProcessDoubleReplacingProc>,
    pub future: [u8; 56],
}

/// Capability flags stored in [`AEffect::flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectFlags(pub i32);

impl EffectFlags {
    /// The plugin provides an editor.
    pub const HAS_EDITOR: Self = Self(1);
    /// `process_replacing` is implemented.
    pub const CAN_REPLACING: Self = Self(1 << 4);
    /// Program and bank data is exchanged as opaque chunks.
    pub const PROGRAM_CHUNKS: Self = Self(1 << 5);
    /// The plugin is an instrument.
    pub const IS_SYNTH: Self = Self(1 << 8);
    /// The plugin produces no sound when the input is silent.
    pub const NO_SOUND_IN_STOP: Self = Self(1 << 9);
    /// `process_double_replacing` is implemented.
    pub const CAN_DOUBLE_REPLACING: Self = Self(1 << 12);

    /// Raw flag bits.
    #[inline]
    pub const fn bits(self) -> i32 {
        self.0
    }

    /// Whether every bit in `other` is set.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for EffectFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl AEffect {
    /// A zeroed effect header with the magic number set.
    ///
    /// Used by in-process plugins and tests; real plugins build their own.
    pub const fn empty() -> Self {
        Self {
            magic: EFFECT_MAGIC,
            dispatcher: None,
            process: None,
            set_parameter: None,
            get_parameter: None,
            num_programs: 0,
            num_params: 0,
            num_inputs: 0,
            num_outputs: 0,
            flags: 0,
            reserved1: 0,
            reserved2: 0,
            initial_delay: 0,
            real_qualities: 0,
            off_qualities: 0,
            io_ratio: 0.0,
            object: std::ptr::null_mut(),
            user: std::ptr::null_mut(),
            unique_id: 0,
            version: 0,
            process_replacing: None,
            process_double_replacing: None,
            future: [0; 56],
        }
    }

    /// Typed view of [`AEffect::flags`].
    #[inline]
    pub fn effect_flags(&self) -> EffectFlags {
        EffectFlags(self.flags)
    }
}
