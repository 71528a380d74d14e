//! # ferrule-core
//!
//! VST2 ABI definitions for the Ferrule host bridge.
//!
//! This crate holds everything that is fixed by the binary plugin interface
//! and needs no live plugin: opcode tables, `#[repr(C)]` structures, flag
//! sets, and the host-side configuration and error types. The live bridge
//! (module loading, registry, dispatch, buffers) lives in `ferrule-vst2`.
//!
//! ## Protocol
//!
//! - [`EffectOpcode`] / [`HostOpcode`] - Opcode tables for both directions
//! - [`AEffect`] - Effect structure returned by a plugin entry point
//! - [`EffectFlags`] - Capability flags in the effect header
//!
//! ## Structures
//!
//! - [`TimeInfo`] - Transport position (88 bytes)
//! - [`SpeakerArrangement`] - Channel layout (904 bytes)
//! - [`ParameterProperties`] - Extended parameter info (152 bytes)
//! - [`PinProperties`] - Input/output pin info (128 bytes)
//! - [`MidiEvent`] / [`SysExEvent`] / [`Events`] - Event records
//! - [`FixedString`] - Fixed-width ASCII name fields
//!
//! ## Host Side
//!
//! - [`HostConfig`] - Identity and defaults reported to plugins
//! - [`Sample`] / [`NativeSample`] - Sample type abstraction
//! - [`LoadError`] / [`BridgeError`] - Error types

pub mod abi;
pub mod config;
pub mod error;
pub mod events;
pub mod name;
pub mod opcode;
pub mod parameter;
pub mod sample;
pub mod speaker;
pub mod time_info;
pub mod types;

// Re-exports for convenience
pub use abi::{
    AEffect, DispatcherProc, EffectFlags, EntryProc, GetParameterProc, HostCallbackProc,
    ProcessDoubleReplacingProc, ProcessReplacingProc, SetParameterProc, EFFECT_MAGIC, VST_VERSION,
};
pub use config::{HostConfig, DEFAULT_CAN_DO};
pub use error::{BridgeError, BridgeResult, LoadError, LoadErrorReason};
pub use events::{
    EventHeader, Events, MidiEvent, MidiEventFlags, SysExEvent, EVENT_TYPE_MIDI, EVENT_TYPE_SYSEX,
};
pub use name::{Ascii24, Ascii32, Ascii64, Ascii8, FixedString};
pub use opcode::{EffectOpcode, HostOpcode};
pub use parameter::{ParameterFlags, ParameterProperties, PinFlags, PinProperties};
pub use sample::{NativeProcessFn, NativeSample, Sample};
pub use speaker::{ArrangementType, SpeakerArrangement, SpeakerProperties, SpeakerType, MAX_SPEAKERS};
pub use time_info::{SmpteFrameRate, TimeInfo, TimeInfoFlags};
pub use types::{CanDo, ChunkKind, HostLanguage, PluginCategory, ProcessLevel, ProcessPrecision};
