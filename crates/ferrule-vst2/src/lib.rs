//! # ferrule-vst2
//!
//! Live VST2 host bridge.
//!
//! Loads plugin libraries, instantiates effects, routes calls in both
//! directions and marshals audio and events across the native boundary.
//!
//! ## Flow
//!
//! ```text
//! Module::open(path)          resolve entry point
//!        ↓
//! Module::load(callback)      entry(), register callback, Open
//!        ↓
//! Plugin::{resume, process, process_events, ...}
//!        ↓                    plugin calls back through host_trampoline
//! Plugin::close()             Close, unregister
//!        ↓
//! Module::close()
//! ```
//!
//! ## Modules
//!
//! - [`loader`] - [`Module`]: library handle and entry point
//! - [`plugin`] - [`Plugin`]: one open effect and its typed accessors
//! - [`dispatch`] - Raw dispatch, the host trampoline, instantiate/shutdown
//! - [`registry`] - Effect to callback map consulted by the trampoline
//! - [`host`] - [`Host`]: closure-based host callback
//! - [`buffer`] - [`SampleBuffer`]: native per-channel sample storage
//! - [`events`] - [`EventsBuffer`]: native event containers
//! - [`paths`] - Default search locations

pub mod buffer;
pub mod dispatch;
pub mod events;
pub mod host;
pub mod loader;
pub mod paths;
pub mod plugin;
pub mod registry;

#[cfg(test)]
mod test_plugin;

pub use buffer::{DoubleBuffer, FloatBuffer, SampleBuffer};
pub use dispatch::{dispatch_raw, host_trampoline, instantiate, shutdown};
pub use events::{read_events, Event, EventsBuffer, MidiMessage, SysExMessage};
pub use host::{noop_callback, Host};
pub use loader::Module;
pub use paths::{module_name, resolve_bundle, scan_paths, FILE_EXTENSION};
pub use plugin::{Plugin, PluginState};
pub use registry::{registry, CallbackRegistry, EffectHandle, HostCall, HostCallback};
