//! Typed host callback.
//!
//! [`Host`] answers the plugin-to-host queries most plugins make, so callers
//! supply plain closures instead of decoding raw pointers. Identity queries
//! (vendor, product, language, `can do`) are answered from a [`HostConfig`];
//! everything that changes at runtime comes from optional closures and
//! falls back to the config defaults.
//!
//! # Example
//!
//! ```ignore
//! use ferrule_core::{HostConfig, TimeInfo};
//! use ferrule_vst2::Host;
//!
//! static CONFIG: HostConfig = HostConfig::new("My Host").with_vendor("Me");
//!
//! let callback = Host::new(CONFIG.clone())
//!     .on_time_info(|| Some(TimeInfo::new(0.0, 48000.0).with_tempo(120.0)))
//!     .on_automate(|index, value| println!("param {} -> {}", index, value))
//!     .into_callback();
//! ```

use std::ffi::CStr;
use std::sync::{Arc, Mutex, PoisonError};

use ferrule_core::{Ascii64, CanDo, HostConfig, HostOpcode, ProcessLevel, TimeInfo, VST_VERSION};

use crate::events::{read_events, Event};
use crate::registry::{HostCall, HostCallback};

type SampleRateFn = dyn Fn() -> f32 + Send + Sync;
type BlockSizeFn = dyn Fn() -> i32 + Send + Sync;
type ProcessLevelFn = dyn Fn() -> ProcessLevel + Send + Sync;
type TimeInfoFn = dyn Fn() -> Option<TimeInfo> + Send + Sync;
type AutomateFn = dyn Fn(i32, f32) + Send + Sync;
type EventsFn = dyn Fn(Vec<Event>) + Send + Sync;

/// Host callback built from closures and a [`HostConfig`].
pub struct Host {
    config: HostConfig,
    sample_rate: Option<Box<SampleRateFn>>,
    block_size: Option<Box<BlockSizeFn>>,
    process_level: Option<Box<ProcessLevelFn>>,
    time_info: Option<Box<TimeInfoFn>>,
    automate: Option<Box<AutomateFn>>,
    events: Option<Box<EventsFn>>,
    /// Latest answer to `GetTime`. Boxed so the address handed to the
    /// plugin stays fixed for the lifetime of the host.
    time: Mutex<Box<TimeInfo>>,
}

impl Host {
    pub fn new(config: HostConfig) -> Self {
        let time = TimeInfo::new(0.0, config.sample_rate as f64);
        Self {
            config,
            sample_rate: None,
            block_size: None,
            process_level: None,
            time_info: None,
            automate: None,
            events: None,
            time: Mutex::new(Box::new(time)),
        }
    }

    /// Current sample rate. Defaults to [`HostConfig::sample_rate`].
    pub fn on_sample_rate(mut self, f: impl Fn() -> f32 + Send + Sync + 'static) -> Self {
        self.sample_rate = Some(Box::new(f));
        self
    }

    /// Current block size. Defaults to [`HostConfig::block_size`].
    pub fn on_block_size(mut self, f: impl Fn() -> i32 + Send + Sync + 'static) -> Self {
        self.block_size = Some(Box::new(f));
        self
    }

    /// Thread the plugin is calling from. Defaults to
    /// [`ProcessLevel::Unknown`].
    pub fn on_process_level(mut self, f: impl Fn() -> ProcessLevel + Send + Sync + 'static) -> Self {
        self.process_level = Some(Box::new(f));
        self
    }

    /// Transport state. Returning `None` answers the query with a null
    /// pointer.
    pub fn on_time_info(mut self, f: impl Fn() -> Option<TimeInfo> + Send + Sync + 'static) -> Self {
        self.time_info = Some(Box::new(f));
        self
    }

    /// Parameter changes made by the plugin itself, as `(index, value)`.
    pub fn on_automate(mut self, f: impl Fn(i32, f32) + Send + Sync + 'static) -> Self {
        self.automate = Some(Box::new(f));
        self
    }

    /// Events sent by the plugin (MIDI output).
    pub fn on_events(mut self, f: impl Fn(Vec<Event>) + Send + Sync + 'static) -> Self {
        self.events = Some(Box::new(f));
        self
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Wrap the host into a callback for [`Plugin::load`] or
    /// [`Module::load`].
    ///
    /// [`Plugin::load`]: crate::plugin::Plugin::load
    /// [`Module::load`]: crate::loader::Module::load
    pub fn into_callback(self) -> HostCallback {
        let host = Arc::new(self);
        Arc::new(move |call: &HostCall| host.handle(call))
    }

    /// Answer one inbound call.
    pub fn handle(&self, call: &HostCall) -> isize {
        match call.opcode {
            HostOpcode::Version => VST_VERSION as isize,
            HostOpcode::Automate => {
                if let Some(automate) = &self.automate {
                    automate(call.index, call.opt);
                }
                0
            }
            HostOpcode::GetTime => self.time(),
            HostOpcode::ProcessEvents => self.receive_events(call),
            HostOpcode::GetSampleRate => match &self.sample_rate {
                Some(f) => f() as isize,
                None => self.config.sample_rate as isize,
            },
            HostOpcode::GetBlockSize => match &self.block_size {
                Some(f) => f() as isize,
                None => self.config.block_size as isize,
            },
            HostOpcode::GetCurrentProcessLevel => {
                let level = self.process_level.as_ref().map_or(ProcessLevel::Unknown, |f| f());
                level as isize
            }
            HostOpcode::GetVendorString => {
                // SAFETY: The protocol gives a 64 byte buffer for this query.
                unsafe { write_field(call, self.config.vendor) }
            }
            HostOpcode::GetProductString => {
                // SAFETY: The protocol gives a 64 byte buffer for this query.
                unsafe { write_field(call, self.config.product) }
            }
            HostOpcode::GetVendorVersion => self.config.vendor_version as isize,
            HostOpcode::GetLanguage => self.config.language as isize,
            HostOpcode::CanDo => self.can_do(call).to_raw(),
            HostOpcode::CurrentId
            | HostOpcode::Idle
            | HostOpcode::IoChanged
            | HostOpcode::SizeWindow
            | HostOpcode::GetInputLatency
            | HostOpcode::GetOutputLatency
            | HostOpcode::GetAutomationState
            | HostOpcode::VendorSpecific
            | HostOpcode::GetDirectory
            | HostOpcode::UpdateDisplay
            | HostOpcode::BeginEdit
            | HostOpcode::EndEdit
            | HostOpcode::OpenFileSelector
            | HostOpcode::CloseFileSelector => {
                log::trace!("Host call {} answered with 0", call.opcode);
                0
            }
            opcode if opcode.is_deprecated() => {
                log::debug!("Deprecated host call {} from {:?}", opcode, call.effect);
                0
            }
            _ => 0,
        }
    }

    fn time(&self) -> isize {
        let Some(info) = self.time_info.as_ref().and_then(|f| f()) else {
            return 0;
        };
        let mut slot = self.time.lock().unwrap_or_else(PoisonError::into_inner);
        **slot = info;
        let ptr: *const TimeInfo = &**slot;
        ptr as isize
    }

    fn receive_events(&self, call: &HostCall) -> isize {
        let Some(handler) = &self.events else {
            return 0;
        };
        if call.ptr.is_null() {
            return 0;
        }
        // SAFETY: For ProcessEvents the plugin passes an events container
        // that stays valid for the duration of the call.
        let events = unsafe { read_events(call.ptr.cast()) };
        handler(events);
        1
    }

    fn can_do(&self, call: &HostCall) -> CanDo {
        if call.ptr.is_null() {
            return CanDo::Maybe;
        }
        // SAFETY: CanDo carries a null-terminated capability string.
        let query = unsafe { CStr::from_ptr(call.ptr.cast()) };
        match query.to_str() {
            Ok(capability) if self.config.can_do(capability) => CanDo::Yes,
            Ok(_) => CanDo::No,
            Err(_) => CanDo::Maybe,
        }
    }
}

/// Write a 64 byte string field into the call's buffer.
///
/// # Safety
///
/// A non-null `call.ptr` must be valid for 64 bytes of writes.
unsafe fn write_field(call: &HostCall, text: &str) -> isize {
    if call.ptr.is_null() {
        return 0;
    }
    call.ptr.cast::<Ascii64>().write(Ascii64::encode(text));
    1
}

impl Default for Host {
    fn default() -> Self {
        Self::new(HostConfig::DEFAULT)
    }
}

/// Callback that answers every call with 0.
///
/// `Version` is still answered by the trampoline.
pub fn noop_callback() -> HostCallback {
    Arc::new(|call: &HostCall| {
        log::debug!("Host call {} from {:?} ignored", call.opcode, call.effect);
        0
    })
}
