//! Loaded plugin instance.
//!
//! [`Plugin`] owns one live effect: it was registered and opened when it
//! was created, and it is closed and unregistered exactly once, either by
//! [`Plugin::close`] or on drop. Closing consumes the value, so no call can
//! be in flight on the same instance while it closes.
//!
//! The typed accessors wrap the raw dispatcher. Plugin answers that the
//! protocol defines as "don't know" are passed through as-is.

use std::cell::Cell;
use std::ffi::{c_void, CString};
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};

use ferrule_core::{
    AEffect, Ascii24, BridgeError, BridgeResult, CanDo, ChunkKind, EffectFlags, EffectOpcode,
    EntryProc, FixedString, NativeSample, ParameterProperties, PinProperties, PluginCategory,
    ProcessPrecision, SpeakerArrangement, MAX_SPEAKERS,
};

use crate::buffer::SampleBuffer;
use crate::dispatch::{dispatch_raw, instantiate, shutdown};
use crate::events::EventsBuffer;
use crate::loader::Module;
use crate::registry::{EffectHandle, HostCallback};

/// Scratch field for string queries.
///
/// The ABI limits most names to 8 or 24 bytes, but plugins routinely write
/// past those limits.
type Scratch = FixedString<256>;

// =============================================================================
// Lifecycle State
// =============================================================================

/// Lifecycle position of a plugin, tracked from the opcodes sent to it.
///
/// Tracking is informational: no call is rejected because of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Unopened,
    Opened,
    /// Sample rate or block size has been set.
    Configured,
    Resumed,
    Suspended,
    Closed,
}

impl PluginState {
    fn after(self, opcode: EffectOpcode, value: isize) -> Self {
        match opcode {
            EffectOpcode::Open => Self::Opened,
            EffectOpcode::Close => Self::Closed,
            EffectOpcode::SetSampleRate | EffectOpcode::SetBlockSize if self == Self::Opened => {
                Self::Configured
            }
            EffectOpcode::MainsChanged if value != 0 => Self::Resumed,
            EffectOpcode::MainsChanged => Self::Suspended,
            _ => self,
        }
    }
}

// =============================================================================
// Plugin
// =============================================================================

/// An open effect instance.
///
/// The lifetime ties the instance to the [`Module`] it was loaded from, so
/// the library cannot be unloaded while the instance is alive. Instances
/// created directly from an entry point with [`Plugin::load`] are
/// `'static`.
///
/// `Plugin` is `Send` but not `Sync`: calls on one instance are serialized
/// by whoever owns it.
pub struct Plugin<'m> {
    effect: NonNull<AEffect>,
    state: Cell<PluginState>,
    path: PathBuf,
    name: String,
    open: bool,
    _module: PhantomData<&'m Module>,
}

// SAFETY: The effect is only reached through this value, and `Plugin` is
// not `Sync`, so moving it to another thread moves the sole caller.
unsafe impl Send for Plugin<'_> {}

impl Plugin<'static> {
    /// Instantiate an effect from an entry point, register `callback` and
    /// open it.
    ///
    /// # Safety
    ///
    /// `entry` must be a VST2 entry point whose code stays loaded for the
    /// lifetime of the returned plugin.
    pub unsafe fn load(entry: EntryProc, callback: HostCallback) -> BridgeResult<Self> {
        let effect = instantiate(entry, callback)?;
        Ok(Self::from_effect(effect, PathBuf::new(), String::new()))
    }
}

impl<'m> Plugin<'m> {
    pub(crate) fn from_effect(effect: NonNull<AEffect>, path: PathBuf, name: String) -> Self {
        Self {
            effect,
            state: Cell::new(PluginState::Opened),
            path,
            name,
            open: true,
            _module: PhantomData,
        }
    }

    /// Registry key of this instance.
    pub fn handle(&self) -> EffectHandle {
        EffectHandle::from_ptr(self.effect.as_ptr())
    }

    /// Path of the module the plugin was loaded from (empty when loaded
    /// from a bare entry point).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Module name the plugin was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PluginState {
        self.state.get()
    }

    fn header(&self) -> &AEffect {
        // SAFETY: The effect stays valid until `Close`, which only happens
        // when `self` is consumed or dropped.
        unsafe { self.effect.as_ref() }
    }

    /// Send a raw dispatcher call.
    ///
    /// # Safety
    ///
    /// `value` and `ptr` must satisfy the contract of `opcode`: pointers
    /// must be valid for the reads and writes the plugin performs.
    /// `Close` must not be sent this way; use [`Plugin::close`].
    pub unsafe fn dispatch(
        &self,
        opcode: EffectOpcode,
        index: i32,
        value: isize,
        ptr: *mut c_void,
        opt: f32,
    ) -> isize {
        let result = dispatch_raw(self.effect, opcode, index, value, ptr, opt);
        let previous = self.state.get();
        let next = previous.after(opcode, value);
        if next != previous {
            log::debug!("{:?} {:?} -> {:?}", self.handle(), previous, next);
            self.state.set(next);
        }
        result
    }

    /// Dispatch a call that carries no pointer.
    fn send(&self, opcode: EffectOpcode, index: i32, value: isize, opt: f32) -> isize {
        // SAFETY: A null pointer is valid for every opcode routed here.
        unsafe { self.dispatch(opcode, index, value, ptr::null_mut(), opt) }
    }

    /// Dispatch a string query and decode the answer.
    fn query_string(&self, opcode: EffectOpcode, index: i32) -> String {
        let mut scratch = Scratch::zeroed();
        // SAFETY: The scratch field is larger than any name the protocol
        // defines.
        unsafe { self.dispatch(opcode, index, 0, scratch.as_mut_ptr(), 0.0) };
        scratch.decode()
    }

    // =========================================================================
    // Header
    // =========================================================================

    pub fn num_params(&self) -> i32 {
        self.header().num_params
    }

    pub fn num_programs(&self) -> i32 {
        self.header().num_programs
    }

    pub fn num_inputs(&self) -> i32 {
        self.header().num_inputs
    }

    pub fn num_outputs(&self) -> i32 {
        self.header().num_outputs
    }

    pub fn flags(&self) -> EffectFlags {
        self.header().effect_flags()
    }

    /// Four character identifier registered by the vendor.
    pub fn unique_id(&self) -> i32 {
        self.header().unique_id
    }

    /// Plugin-defined version number.
    pub fn version(&self) -> i32 {
        self.header().version
    }

    /// Latency in samples.
    pub fn initial_delay(&self) -> i32 {
        self.header().initial_delay
    }

    pub fn can_process_f32(&self) -> bool {
        self.can_process::<f32>()
    }

    pub fn can_process_f64(&self) -> bool {
        self.can_process::<f64>()
    }

    /// Whether the plugin advertises the process routine for `S`.
    pub fn can_process<S: NativeSample>(&self) -> bool {
        self.flags().contains(S::CAPABILITY) && S::process_fn(self.header()).is_some()
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Normalized value of a parameter, 0.0 if the plugin has no getter.
    pub fn parameter(&self, index: i32) -> f32 {
        match self.header().get_parameter {
            Some(get) => get(self.effect.as_ptr(), index),
            None => 0.0,
        }
    }

    pub fn set_parameter(&self, index: i32, value: f32) {
        if let Some(set) = self.header().set_parameter {
            set(self.effect.as_ptr(), index, value);
        }
    }

    pub fn param_name(&self, index: i32) -> String {
        self.query_string(EffectOpcode::GetParamName, index)
    }

    /// Current value as text, as the plugin would display it.
    pub fn param_display(&self, index: i32) -> String {
        self.query_string(EffectOpcode::GetParamDisplay, index)
    }

    /// Unit label, such as "dB".
    pub fn param_label(&self, index: i32) -> String {
        self.query_string(EffectOpcode::GetParamLabel, index)
    }

    pub fn param_properties(&self, index: i32) -> Option<ParameterProperties> {
        let mut properties = ParameterProperties::default();
        let ptr = ptr::addr_of_mut!(properties).cast();
        // SAFETY: `ptr` points to a properties struct of the ABI layout.
        let supported = unsafe { self.dispatch(EffectOpcode::GetParameterProperties, index, 0, ptr, 0.0) };
        (supported != 0).then_some(properties)
    }

    // =========================================================================
    // Programs
    // =========================================================================

    pub fn program(&self) -> i32 {
        self.send(EffectOpcode::GetProgram, 0, 0, 0.0) as i32
    }

    pub fn set_program(&self, program: i32) {
        self.send(EffectOpcode::SetProgram, 0, program as isize, 0.0);
    }

    /// Name of the current program.
    pub fn program_name(&self) -> String {
        self.query_string(EffectOpcode::GetProgramName, 0)
    }

    /// Rename the current program. The name is truncated to 23 ASCII bytes.
    pub fn set_program_name(&self, name: &str) {
        let mut field = Ascii24::encode(name);
        // SAFETY: The plugin reads at most the 24 byte field.
        unsafe { self.dispatch(EffectOpcode::SetProgramName, 0, 0, field.as_mut_ptr(), 0.0) };
    }

    /// Name of any program without switching to it. `None` if the plugin
    /// does not support the query or the index is out of range.
    pub fn program_name_indexed(&self, index: i32) -> Option<String> {
        let mut scratch = Scratch::zeroed();
        // SAFETY: The scratch field is larger than a program name.
        let found = unsafe {
            self.dispatch(EffectOpcode::GetProgramNameIndexed, index, 0, scratch.as_mut_ptr(), 0.0)
        };
        (found != 0).then(|| scratch.decode())
    }

    // =========================================================================
    // Chunks
    // =========================================================================

    /// Opaque state of the current program.
    pub fn program_data(&self) -> Vec<u8> {
        self.chunk(ChunkKind::Program)
    }

    /// Restore the current program from [`Plugin::program_data`] output.
    pub fn set_program_data(&self, data: &[u8]) -> bool {
        self.set_chunk(ChunkKind::Program, data)
    }

    /// Opaque state of the whole bank.
    pub fn bank_data(&self) -> Vec<u8> {
        self.chunk(ChunkKind::Bank)
    }

    pub fn set_bank_data(&self, data: &[u8]) -> bool {
        self.set_chunk(ChunkKind::Bank, data)
    }

    fn chunk(&self, kind: ChunkKind) -> Vec<u8> {
        let mut data: *mut u8 = ptr::null_mut();
        let slot = ptr::addr_of_mut!(data).cast();
        // SAFETY: The plugin stores a pointer to memory it owns in `slot`.
        let len = unsafe { self.dispatch(EffectOpcode::GetChunk, kind as i32, 0, slot, 0.0) };
        if len <= 0 || data.is_null() {
            return Vec::new();
        }
        // SAFETY: The plugin guarantees `len` readable bytes at `data` until
        // the next call into it. They are copied out before returning.
        unsafe { std::slice::from_raw_parts(data, len as usize) }.to_vec()
    }

    fn set_chunk(&self, kind: ChunkKind, data: &[u8]) -> bool {
        // The plugin only reads through the pointer.
        let ptr = data.as_ptr().cast_mut().cast();
        // SAFETY: `data` is valid for `data.len()` bytes for the whole call.
        unsafe { self.dispatch(EffectOpcode::SetChunk, kind as i32, data.len() as isize, ptr, 0.0) != 0 }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Send `Open` again. Loading already opens the plugin; some plugins
    /// reinitialize on a repeated `Open`.
    pub fn start(&self) {
        self.send(EffectOpcode::Open, 0, 0, 0.0);
    }

    /// Switch the plugin on. Processing is only meaningful while resumed.
    pub fn resume(&self) {
        self.send(EffectOpcode::MainsChanged, 0, 1, 0.0);
    }

    /// Switch the plugin off, for example before changing the sample rate.
    pub fn suspend(&self) {
        self.send(EffectOpcode::MainsChanged, 0, 0, 0.0);
    }

    pub fn set_sample_rate(&self, sample_rate: f32) {
        self.send(EffectOpcode::SetSampleRate, 0, 0, sample_rate);
    }

    /// Maximum number of frames passed to a single process call.
    pub fn set_block_size(&self, block_size: i32) {
        self.send(EffectOpcode::SetBlockSize, 0, block_size as isize, 0.0);
    }

    pub fn set_process_precision(&self, precision: ProcessPrecision) -> bool {
        self.send(EffectOpcode::SetProcessPrecision, 0, precision as isize, 0.0) != 0
    }

    /// Called before the first process call after resume.
    pub fn start_process(&self) {
        self.send(EffectOpcode::StartProcess, 0, 0, 0.0);
    }

    pub fn stop_process(&self) {
        self.send(EffectOpcode::StopProcess, 0, 0, 0.0);
    }

    pub fn set_bypass(&self, bypass: bool) -> bool {
        self.send(EffectOpcode::SetBypass, 0, bypass as isize, 0.0) != 0
    }

    // =========================================================================
    // Channel Layout
    // =========================================================================

    /// Propose input and output layouts. Returns whether the plugin
    /// accepted them.
    ///
    /// Channel counts are clamped to the [`MAX_SPEAKERS`] inline slots
    /// before the arrangements are handed to the plugin.
    pub fn set_speaker_arrangement(&self, input: &SpeakerArrangement, output: &SpeakerArrangement) -> bool {
        let input = fit_inline(input);
        let output = fit_inline(output);
        let value = ptr::from_ref(&input) as isize;
        let ptr = ptr::from_ref(&output).cast_mut().cast();
        // SAFETY: Both arrangements outlive the call and are only read.
        unsafe { self.dispatch(EffectOpcode::SetSpeakerArrangement, 0, value, ptr, 0.0) != 0 }
    }

    /// Current input and output layouts, copied out of plugin memory.
    pub fn speaker_arrangement(&self) -> Option<(SpeakerArrangement, SpeakerArrangement)> {
        let mut input: *const SpeakerArrangement = ptr::null();
        let mut output: *const SpeakerArrangement = ptr::null();
        let value = ptr::addr_of_mut!(input) as isize;
        let ptr = ptr::addr_of_mut!(output).cast();
        // SAFETY: The plugin writes a pointer to its own arrangement into
        // each slot.
        let found = unsafe { self.dispatch(EffectOpcode::GetSpeakerArrangement, 0, value, ptr, 0.0) };
        if found == 0 || input.is_null() || output.is_null() {
            return None;
        }
        // SAFETY: Both pointers were just provided by the plugin and point
        // to arrangements it owns.
        unsafe { Some((*input, *output)) }
    }

    pub fn input_properties(&self, index: i32) -> Option<PinProperties> {
        self.pin_properties(EffectOpcode::GetInputProperties, index)
    }

    pub fn output_properties(&self, index: i32) -> Option<PinProperties> {
        self.pin_properties(EffectOpcode::GetOutputProperties, index)
    }

    fn pin_properties(&self, opcode: EffectOpcode, index: i32) -> Option<PinProperties> {
        let mut properties = PinProperties::default();
        let ptr = ptr::addr_of_mut!(properties).cast();
        // SAFETY: `ptr` points to a pin properties struct of the ABI layout.
        let found = unsafe { self.dispatch(opcode, index, 0, ptr, 0.0) };
        (found != 0).then_some(properties)
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn effect_name(&self) -> String {
        self.query_string(EffectOpcode::GetEffectName, 0)
    }

    pub fn vendor_string(&self) -> String {
        self.query_string(EffectOpcode::GetVendorString, 0)
    }

    pub fn product_string(&self) -> String {
        self.query_string(EffectOpcode::GetProductString, 0)
    }

    pub fn vendor_version(&self) -> i32 {
        self.send(EffectOpcode::GetVendorVersion, 0, 0, 0.0) as i32
    }

    /// Protocol version the plugin implements, 0 for pre-2.0 plugins.
    pub fn vst_version(&self) -> i32 {
        self.send(EffectOpcode::GetVstVersion, 0, 0, 0.0) as i32
    }

    pub fn category(&self) -> PluginCategory {
        PluginCategory::from_raw(self.send(EffectOpcode::GetPlugCategory, 0, 0, 0.0))
    }

    /// Ask whether the plugin supports a capability such as
    /// `"receiveVstEvents"`.
    pub fn can_do(&self, capability: &str) -> CanDo {
        let Ok(query) = CString::new(capability) else {
            return CanDo::Maybe;
        };
        let ptr = query.as_ptr().cast_mut().cast();
        // SAFETY: `query` is a valid C string for the whole call and is only
        // read.
        CanDo::from_raw(unsafe { self.dispatch(EffectOpcode::CanDo, 0, 0, ptr, 0.0) })
    }

    /// Samples of output after the input goes silent. The protocol uses 1
    /// for "no tail" and 0 for "unknown".
    pub fn tail_size(&self) -> isize {
        self.send(EffectOpcode::GetTailSize, 0, 0, 0.0)
    }

    // =========================================================================
    // Processing
    // =========================================================================

    /// Deliver events for the next process call.
    ///
    /// The buffer must stay alive until that process call returns; the
    /// plugin may keep pointers into it until then.
    pub fn process_events(&self, events: &mut EventsBuffer) -> isize {
        let ptr = events.as_void_ptr();
        // SAFETY: `ptr` is a well-formed events container owned by `events`.
        unsafe { self.dispatch(EffectOpcode::ProcessEvents, 0, 0, ptr, 0.0) }
    }

    /// Run the native process routine for `S` over one block.
    ///
    /// Processes `min(inputs.frames(), outputs.frames())` frames. Fails
    /// with [`BridgeError::Unsupported`] if the plugin lacks the routine,
    /// and with [`BridgeError::DimensionMismatch`] if either buffer has
    /// fewer channels than the plugin declares.
    pub fn process<S: NativeSample>(
        &self,
        inputs: &mut SampleBuffer<S>,
        outputs: &mut SampleBuffer<S>,
    ) -> BridgeResult<()> {
        let Some(process) = S::process_fn(self.header()) else {
            return Err(BridgeError::Unsupported(format!(
                "plugin has no {:?} precision process routine",
                S::PRECISION
            )));
        };

        check_channels("input", self.num_inputs(), inputs.channels())?;
        check_channels("output", self.num_outputs(), outputs.channels())?;

        let frames = inputs.frames().min(outputs.frames());
        let frames = i32::try_from(frames).unwrap_or(i32::MAX);
        let input_ptrs = inputs.as_raw().cast_const().cast::<*const S>();
        let output_ptrs = outputs.as_raw();
        process(self.effect.as_ptr(), input_ptrs, output_ptrs, frames);
        Ok(())
    }

    // =========================================================================
    // Close
    // =========================================================================

    /// Send `Close` and unregister. Equivalent to dropping the plugin.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        // SAFETY: The effect is live and registered, and `open` guarantees
        // this is the only `Close` it receives.
        unsafe { shutdown(self.effect) };
        self.state.set(PluginState::Closed);
    }
}

/// Copy of `arrangement` whose channel count stays within the inline slots.
fn fit_inline(arrangement: &SpeakerArrangement) -> SpeakerArrangement {
    let mut fitted = *arrangement;
    let channels = arrangement.channels().min(MAX_SPEAKERS);
    if channels != arrangement.channels() || arrangement.num_channels < 0 {
        log::warn!(
            "Speaker arrangement declares {} channels, sending {}",
            arrangement.num_channels,
            channels
        );
    }
    fitted.num_channels = channels as i32;
    fitted
}

fn check_channels(side: &'static str, required: i32, provided: usize) -> BridgeResult<()> {
    let required = usize::try_from(required).unwrap_or(0);
    if provided < required {
        return Err(BridgeError::DimensionMismatch {
            side,
            required,
            provided,
        });
    }
    Ok(())
}

impl Drop for Plugin<'_> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Plugin<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("handle", &self.handle())
            .field("name", &self.name)
            .field("state", &self.state.get())
            .finish()
    }
}
