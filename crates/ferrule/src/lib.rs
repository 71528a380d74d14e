//! # Ferrule
//!
//! Host VST2 plugins from Rust.
//!
//! Ferrule loads native VST2 modules, drives them through the opcode
//! protocol and moves audio and MIDI across the native boundary. Calls the
//! plugin makes back into the host are routed to a per-instance callback.
//!
//! ## Architecture
//!
//! ```text
//! Your host (closures or a raw callback)
//!        ↓
//! Module / Plugin (ferrule-vst2)
//!        ↓
//! VST2 ABI (ferrule-core)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrule::prelude::*;
//!
//! static CONFIG: HostConfig = HostConfig::new("My Host").with_sample_rate(48000.0);
//!
//! let module = unsafe { Module::open("/usr/lib/vst/again.so")? };
//! let plugin = module.load(Host::new(CONFIG.clone()).into_callback())?;
//!
//! plugin.set_sample_rate(48000.0);
//! plugin.set_block_size(512);
//! plugin.resume();
//!
//! let mut inputs = FloatBuffer::new(2, 512);
//! let mut outputs = FloatBuffer::new(2, 512);
//! inputs.copy_from(&host_input);
//! plugin.process(&mut inputs, &mut outputs)?;
//! outputs.copy_into(&mut host_output);
//!
//! plugin.close();
//! module.close()?;
//! ```

// Re-export sub-crates
pub use ferrule_core as core;
pub use ferrule_vst2 as vst2;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use ferrule::prelude::*;
/// ```
pub mod prelude {
    pub use ferrule_core::{
        // Errors
        BridgeError, BridgeResult, LoadError, LoadErrorReason,
        // Configuration
        HostConfig, HostLanguage,
        // Protocol
        CanDo, EffectFlags, EffectOpcode, HostOpcode, PluginCategory, ProcessLevel,
        ProcessPrecision,
        // Structures
        ArrangementType, ParameterProperties, PinProperties, SpeakerArrangement, TimeInfo,
        // Samples
        NativeSample, Sample,
    };

    pub use ferrule_vst2::{
        noop_callback, scan_paths, DoubleBuffer, Event, EventsBuffer, FloatBuffer, Host,
        HostCall, HostCallback, Module, Plugin, PluginState, SampleBuffer, FILE_EXTENSION,
    };
}
