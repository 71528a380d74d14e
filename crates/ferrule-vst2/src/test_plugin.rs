//! In-process fake plugins for tests.
//!
//! Each entry point builds a real [`AEffect`] whose dispatcher, process and
//! parameter routines are plain `extern "C"` functions, and calls back into
//! the host through the trampoline exactly like a native plugin would.
//! Effects are never freed so tests can inspect them after `Close` and no
//! address is reused while another test still holds it.

use std::ffi::{c_void, CStr};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ferrule_core::{
    AEffect, Ascii24, EffectFlags, EffectOpcode, Events, HostCallbackProc, HostOpcode,
    ParameterFlags, ParameterProperties, PinFlags, PinProperties, SpeakerArrangement, TimeInfo,
    EFFECT_MAGIC, VST_VERSION,
};
use ferrule_utils::encode_ascii;

use crate::events::{read_events, Event, EventsBuffer};
use crate::registry::HostCallback;

pub const NUM_CHANNELS: i32 = 2;
pub const NUM_PARAMS: i32 = 2;
pub const NUM_PROGRAMS: i32 = 3;
pub const UNIQUE_ID: i32 = i32::from_be_bytes(*b"FkGn");

/// VendorSpecific index: return the number of events last received.
pub const VENDOR_EVENT_COUNT: i32 = 0;
/// VendorSpecific index: send two MIDI events to the host.
pub const VENDOR_SEND_EVENTS: i32 = 1;
/// VendorSpecific index: report parameter 0 automated to 0.75.
pub const VENDOR_AUTOMATE: i32 = 2;

#[derive(Default)]
pub struct FakeState {
    pub open: bool,
    pub closed: bool,
    pub sample_rate_seen: isize,
    pub tempo_seen: Option<f64>,
    pub sample_rate: f32,
    pub block_size: isize,
    pub mains: isize,
    pub bypass: bool,
    pub precision: isize,
    pub processing: bool,
    pub params: [f32; NUM_PARAMS as usize],
    pub program: isize,
    pub program_name: Ascii24,
    pub program_chunk: Vec<u8>,
    pub bank_chunk: Vec<u8>,
    pub received_events: Vec<Event>,
    pub input_arrangement: SpeakerArrangement,
    pub output_arrangement: SpeakerArrangement,
}

#[repr(C)]
pub struct FakeEffect {
    effect: AEffect,
    host: HostCallbackProc,
    state: FakeState,
}

/// State of a fake effect.
///
/// # Safety
///
/// `effect` must come from one of the entry points in this module.
pub unsafe fn state<'a>(effect: NonNull<AEffect>) -> &'a FakeState {
    &(*effect.as_ptr().cast::<FakeEffect>()).state
}

pub unsafe fn is_open(effect: NonNull<AEffect>) -> bool {
    state(effect).open
}

pub unsafe fn observed_sample_rate(effect: NonNull<AEffect>) -> isize {
    state(effect).sample_rate_seen
}

/// Callback counting every inbound call.
pub fn counting_callback() -> (HostCallback, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let callback: HostCallback = Arc::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        0
    });
    (callback, count)
}

unsafe fn fake_mut<'a>(effect: *mut AEffect) -> &'a mut FakeEffect {
    &mut *effect.cast::<FakeEffect>()
}

fn build(host: HostCallbackProc, flags: EffectFlags, double: bool) -> *mut AEffect {
    let mut effect = AEffect::empty();
    effect.dispatcher = Some(fake_dispatcher);
    effect.set_parameter = Some(fake_set_parameter);
    effect.get_parameter = Some(fake_get_parameter);
    effect.process_replacing = Some(fake_process::<f32>);
    if double {
        effect.process_double_replacing = Some(fake_process::<f64>);
    }
    effect.num_programs = NUM_PROGRAMS;
    effect.num_params = NUM_PARAMS;
    effect.num_inputs = NUM_CHANNELS;
    effect.num_outputs = NUM_CHANNELS;
    effect.flags = flags.bits();
    effect.initial_delay = 64;
    effect.unique_id = UNIQUE_ID;
    effect.version = 1100;

    let fake = Box::new(FakeEffect {
        effect,
        host,
        state: FakeState {
            params: [1.0, 0.5],
            program_name: Ascii24::encode("Init"),
            program_chunk: vec![1, 2, 3, 4],
            bank_chunk: vec![9; 16],
            ..FakeState::default()
        },
    });
    Box::into_raw(fake).cast()
}

/// Gain effect supporting both precisions.
pub unsafe extern "C" fn fake_main(host: HostCallbackProc) -> *mut AEffect {
    if host(std::ptr::null_mut(), HostOpcode::Version.raw(), 0, 0, std::ptr::null_mut(), 0.0)
        != VST_VERSION as isize
    {
        return std::ptr::null_mut();
    }
    build(
        host,
        EffectFlags::CAN_REPLACING | EffectFlags::CAN_DOUBLE_REPLACING | EffectFlags::PROGRAM_CHUNKS,
        true,
    )
}

/// Gain effect without double precision.
pub unsafe extern "C" fn single_precision_main(host: HostCallbackProc) -> *mut AEffect {
    build(host, EffectFlags::CAN_REPLACING, false)
}

/// Effect that queries the host with its own pointer before returning.
pub unsafe extern "C" fn eager_main(host: HostCallbackProc) -> *mut AEffect {
    let effect = build(host, EffectFlags::CAN_REPLACING, false);
    host(effect, HostOpcode::GetBlockSize.raw(), 0, 0, std::ptr::null_mut(), 0.0);
    effect
}

pub unsafe extern "C" fn null_main(_host: HostCallbackProc) -> *mut AEffect {
    std::ptr::null_mut()
}

pub unsafe extern "C" fn bad_magic_main(host: HostCallbackProc) -> *mut AEffect {
    let effect = build(host, EffectFlags::default(), false);
    (*effect).magic = 0;
    effect
}

extern "C" fn fake_set_parameter(effect: *mut AEffect, index: i32, value: f32) {
    let fake = unsafe { fake_mut(effect) };
    if let Some(slot) = fake.state.params.get_mut(index as usize) {
        *slot = value;
    }
}

extern "C" fn fake_get_parameter(effect: *mut AEffect, index: i32) -> f32 {
    let fake = unsafe { fake_mut(effect) };
    fake.state.params.get(index as usize).copied().unwrap_or(0.0)
}

/// Applies parameter 0 as gain to every declared channel.
extern "C" fn fake_process<S>(effect: *mut AEffect, inputs: *const *const S, outputs: *mut *mut S, frames: i32)
where
    S: ferrule_core::Sample,
{
    let fake = unsafe { fake_mut(effect) };
    let gain = S::from_f32(fake.state.params[0]);
    for channel in 0..fake.effect.num_outputs as usize {
        unsafe {
            let input = *inputs.add(channel);
            let output = *outputs.add(channel);
            for frame in 0..frames as usize {
                *output.add(frame) = *input.add(frame) * gain;
            }
        }
    }
}

unsafe fn write_str(ptr: *mut c_void, width: usize, text: &str) {
    let dest = std::slice::from_raw_parts_mut(ptr.cast::<u8>(), width);
    encode_ascii(text, dest);
}

extern "C" fn fake_dispatcher(
    effect: *mut AEffect,
    opcode: i32,
    index: i32,
    value: isize,
    ptr: *mut c_void,
    opt: f32,
) -> isize {
    let fake = unsafe { fake_mut(effect) };
    let host = fake.host;
    let Some(opcode) = EffectOpcode::from_raw(opcode) else {
        return 0;
    };

    unsafe {
        match opcode {
            EffectOpcode::Open => {
                fake.state.open = true;
                fake.state.sample_rate_seen =
                    host(effect, HostOpcode::GetSampleRate.raw(), 0, 0, std::ptr::null_mut(), 0.0);
                let time = host(effect, HostOpcode::GetTime.raw(), 0, 0, std::ptr::null_mut(), 0.0)
                    as *const TimeInfo;
                if !time.is_null() {
                    fake.state.tempo_seen = (*time).tempo();
                }
                0
            }
            EffectOpcode::Close => {
                host(effect, HostOpcode::UpdateDisplay.raw(), 0, 0, std::ptr::null_mut(), 0.0);
                fake.state.open = false;
                fake.state.closed = true;
                0
            }
            EffectOpcode::SetProgram => {
                fake.state.program = value;
                0
            }
            EffectOpcode::GetProgram => fake.state.program,
            EffectOpcode::SetProgramName => {
                let src = std::slice::from_raw_parts(ptr.cast::<u8>(), 24);
                fake.state.program_name.0.copy_from_slice(src);
                0
            }
            EffectOpcode::GetProgramName => {
                write_str(ptr, 24, &fake.state.program_name.decode());
                0
            }
            EffectOpcode::GetParamLabel => {
                write_str(ptr, 8, if index == 0 { "dB" } else { "%" });
                0
            }
            EffectOpcode::GetParamDisplay => {
                let v = fake.state.params.get(index as usize).copied().unwrap_or(0.0);
                write_str(ptr, 8, &format!("{:.2}", v));
                0
            }
            EffectOpcode::GetParamName => {
                write_str(ptr, 8, if index == 0 { "Gain" } else { "Mix" });
                0
            }
            EffectOpcode::SetSampleRate => {
                fake.state.sample_rate = opt;
                0
            }
            EffectOpcode::SetBlockSize => {
                fake.state.block_size = value;
                0
            }
            EffectOpcode::MainsChanged => {
                fake.state.mains = value;
                0
            }
            EffectOpcode::GetChunk => {
                let chunk = if index == 0 { &fake.state.bank_chunk } else { &fake.state.program_chunk };
                *ptr.cast::<*const u8>() = chunk.as_ptr();
                chunk.len() as isize
            }
            EffectOpcode::SetChunk => {
                let data = std::slice::from_raw_parts(ptr.cast::<u8>(), value as usize).to_vec();
                if index == 0 {
                    fake.state.bank_chunk = data;
                } else {
                    fake.state.program_chunk = data;
                }
                1
            }
            EffectOpcode::ProcessEvents => {
                fake.state.received_events = read_events(ptr.cast::<Events>());
                1
            }
            EffectOpcode::CanBeAutomated => 1,
            EffectOpcode::GetProgramNameIndexed => {
                if index >= NUM_PROGRAMS {
                    return 0;
                }
                write_str(ptr, 24, &format!("Program {}", index));
                1
            }
            EffectOpcode::GetInputProperties | EffectOpcode::GetOutputProperties => {
                if index >= NUM_CHANNELS {
                    return 0;
                }
                let props = &mut *ptr.cast::<PinProperties>();
                let prefix = if opcode == EffectOpcode::GetInputProperties { "In" } else { "Out" };
                props.label = format!("{} {}", prefix, index + 1).as_str().into();
                props.flags = PinFlags::IS_ACTIVE.bits()
                    | if index == 0 { PinFlags::IS_STEREO.bits() } else { 0 };
                1
            }
            EffectOpcode::GetPlugCategory => 1,
            EffectOpcode::SetSpeakerArrangement => {
                fake.state.input_arrangement = *(value as *const SpeakerArrangement);
                fake.state.output_arrangement = *ptr.cast::<SpeakerArrangement>();
                1
            }
            EffectOpcode::GetSpeakerArrangement => {
                *(value as *mut *mut SpeakerArrangement) = &mut fake.state.input_arrangement;
                *ptr.cast::<*mut SpeakerArrangement>() = &mut fake.state.output_arrangement;
                1
            }
            EffectOpcode::SetBypass => {
                fake.state.bypass = value != 0;
                1
            }
            EffectOpcode::GetEffectName => {
                write_str(ptr, 32, "Fake Gain");
                1
            }
            EffectOpcode::GetVendorString => {
                write_str(ptr, 64, "Ferrule Tests");
                1
            }
            EffectOpcode::GetProductString => {
                write_str(ptr, 64, "Fake Suite");
                1
            }
            EffectOpcode::GetVendorVersion => 1000,
            EffectOpcode::VendorSpecific => match index {
                VENDOR_EVENT_COUNT => fake.state.received_events.len() as isize,
                VENDOR_SEND_EVENTS => {
                    let mut events = EventsBuffer::build(&[
                        Event::midi(0, [0x90, 60, 100]),
                        Event::midi(32, [0x80, 60, 0]),
                    ]);
                    host(effect, HostOpcode::ProcessEvents.raw(), 0, 0, events.as_void_ptr(), 0.0)
                }
                VENDOR_AUTOMATE => host(effect, HostOpcode::Automate.raw(), 0, 0, std::ptr::null_mut(), 0.75),
                _ => 0,
            },
            EffectOpcode::CanDo => {
                let query = CStr::from_ptr(ptr.cast());
                match query.to_bytes() {
                    b"receiveVstEvents" | b"bypass" => 1,
                    b"sendVstEvents" => 0,
                    _ => -1,
                }
            }
            EffectOpcode::GetTailSize => 1,
            EffectOpcode::GetParameterProperties => {
                if index != 0 {
                    return 0;
                }
                let props = &mut *ptr.cast::<ParameterProperties>();
                props.label = "Gain".into();
                props.short_label = "Gn".into();
                props.flags = ParameterFlags::CAN_RAMP.bits();
                1
            }
            EffectOpcode::GetVstVersion => VST_VERSION as isize,
            EffectOpcode::StartProcess => {
                fake.state.processing = true;
                0
            }
            EffectOpcode::StopProcess => {
                fake.state.processing = false;
                0
            }
            EffectOpcode::SetProcessPrecision => {
                fake.state.precision = value;
                1
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::host_trampoline;

    #[test]
    fn test_fake_effect_has_magic() {
        let effect = unsafe { fake_main(host_trampoline) };
        assert!(!effect.is_null());
        assert_eq!(unsafe { (*effect).magic }, EFFECT_MAGIC);
    }
}
