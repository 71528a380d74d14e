//! Call primitives in both directions.
//!
//! Outbound calls go through [`dispatch_raw`] into the effect's dispatcher.
//! Inbound calls arrive at [`host_trampoline`], the single `extern "C"`
//! function handed to every plugin, which routes them through the global
//! [`registry`](crate::registry::registry).
//!
//! # Safety
//!
//! A panic must never unwind into the plugin's native frames. The
//! trampoline runs host callbacks inside `catch_unwind` and treats a call
//! for an effect it does not know as fatal: it logs and aborts the process.

use std::cell::RefCell;
use std::ffi::c_void;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr::NonNull;

use ferrule_core::{
    AEffect, BridgeResult, EffectOpcode, EntryProc, HostOpcode, LoadError, LoadErrorReason,
    EFFECT_MAGIC, VST_VERSION,
};

use crate::registry::{registry, EffectHandle, HostCall, HostCallback};

// =============================================================================
// Construction Window
// =============================================================================

thread_local! {
    /// Callback of the effect currently being constructed on this thread.
    ///
    /// Plugins may call the host with their own effect pointer from inside
    /// the entry point, before the host has seen that pointer. Those calls
    /// are routed here instead of the registry.
    static CONSTRUCTING: RefCell<Option<HostCallback>> = const { RefCell::new(None) };
}

/// Clears the construction slot when dropped, including on unwind.
struct ConstructionGuard;

impl ConstructionGuard {
    fn enter(callback: HostCallback) -> Self {
        CONSTRUCTING.with(|slot| *slot.borrow_mut() = Some(callback));
        Self
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTING.with(|slot| slot.borrow_mut().take());
    }
}

fn constructing_callback() -> Option<HostCallback> {
    CONSTRUCTING.with(|slot| slot.borrow().clone())
}

// =============================================================================
// Trampoline
// =============================================================================

/// Host callback passed to every plugin entry point.
///
/// - `HostOpcode::Version` is answered with 2400 without a lookup, since it
///   is typically asked before any effect exists.
/// - Calls with a null effect (other pre-construction queries) return 0.
/// - Unknown opcodes return 0.
/// - A non-null effect with no registered callback is a protocol violation
///   and aborts the process.
pub extern "C" fn host_trampoline(
    effect: *mut AEffect,
    opcode: i32,
    index: i32,
    value: isize,
    ptr: *mut c_void,
    opt: f32,
) -> isize {
    if opcode == HostOpcode::Version.raw() {
        return VST_VERSION as isize;
    }

    if effect.is_null() {
        log::debug!("Host call {} with null effect ignored", opcode);
        return 0;
    }

    let handle = EffectHandle::from_ptr(effect);
    let callback = match registry().lookup(handle) {
        Ok(callback) => callback,
        Err(err) => match constructing_callback() {
            Some(callback) => callback,
            None => {
                log::error!("Host call {} from unknown effect: {}", opcode, err);
                std::process::abort();
            }
        },
    };

    let Some(opcode) = HostOpcode::from_raw(opcode) else {
        log::warn!("Unknown host opcode {} from {:?}", opcode, handle);
        return 0;
    };

    log::trace!(
        "<- {} index={} value={} opt={} ({:?})",
        opcode,
        index,
        value,
        opt,
        handle
    );

    let call = HostCall {
        effect: handle,
        opcode,
        index,
        value,
        ptr,
        opt,
    };

    catch_unwind(AssertUnwindSafe(|| callback(&call))).unwrap_or_else(|_| {
        log::error!("Host callback panicked on {}", opcode);
        0
    })
}

// =============================================================================
// Outbound Dispatch
// =============================================================================

/// Call the effect's dispatcher.
///
/// Synchronous and blocking; the plugin may call back into the host through
/// the trampoline before this returns. An effect without a dispatcher
/// answers 0.
///
/// # Safety
///
/// `effect` must point to a live effect that has not received `Close`.
pub unsafe fn dispatch_raw(
    effect: NonNull<AEffect>,
    opcode: EffectOpcode,
    index: i32,
    value: isize,
    ptr: *mut c_void,
    opt: f32,
) -> isize {
    log::trace!("-> {} index={} value={} opt={}", opcode, index, value, opt);
    match effect.as_ref().dispatcher {
        Some(dispatcher) => dispatcher(effect.as_ptr(), opcode.raw(), index, value, ptr, opt),
        None => 0,
    }
}

// =============================================================================
// Instantiation
// =============================================================================

/// Run an entry point, validate the effect, register `callback` and send
/// `Open`.
///
/// On success the effect is registered and open. Validation failures are
/// reported as [`LoadError`] with an empty path; [`Module::load`] fills in
/// the module path.
///
/// # Safety
///
/// `entry` must be a VST2 entry point: a function that returns either null
/// or a pointer to a valid [`AEffect`] that stays alive until `Close`.
///
/// [`Module::load`]: crate::loader::Module::load
pub unsafe fn instantiate(entry: EntryProc, callback: HostCallback) -> BridgeResult<NonNull<AEffect>> {
    let raw = {
        let _guard = ConstructionGuard::enter(callback.clone());
        entry(host_trampoline)
    };

    let Some(effect) = NonNull::new(raw) else {
        return Err(LoadError::new("", LoadErrorReason::NullEffect).into());
    };

    let magic = effect.as_ref().magic;
    if magic != EFFECT_MAGIC {
        log::warn!("Effect at {:p} has bad magic {:#010x}", raw, magic);
        return Err(LoadError::new("", LoadErrorReason::BadMagic)
            .with_detail(format!("{:#010x}", magic))
            .into());
    }

    registry().register(EffectHandle::from_ptr(raw), callback)?;
    dispatch_raw(effect, EffectOpcode::Open, 0, 0, std::ptr::null_mut(), 0.0);
    log::debug!("Effect {:p} loaded and opened", raw);
    Ok(effect)
}

/// Send `Close` and remove the registry entry.
///
/// The effect pointer is invalid once this returns.
///
/// # Safety
///
/// `effect` must be a live, registered effect that is not used afterwards.
pub unsafe fn shutdown(effect: NonNull<AEffect>) {
    let handle = EffectHandle::from_ptr(effect.as_ptr());
    dispatch_raw(effect, EffectOpcode::Close, 0, 0, std::ptr::null_mut(), 0.0);
    registry().unregister(handle);
    log::debug!("Effect {:?} closed", handle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_plugin::{self, counting_callback};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    #[test]
    fn test_version_answered_without_lookup() {
        let fake = 0x10 as *mut AEffect;
        let version = host_trampoline(
            fake,
            HostOpcode::Version.raw(),
            0,
            0,
            std::ptr::null_mut(),
            0.0,
        );
        assert_eq!(version, 2400);
    }

    #[test]
    fn test_null_effect_returns_zero() {
        let result = host_trampoline(
            std::ptr::null_mut(),
            HostOpcode::GetSampleRate.raw(),
            0,
            0,
            std::ptr::null_mut(),
            0.0,
        );
        assert_eq!(result, 0);
    }

    #[test]
    fn test_instantiate_registers_and_opens() {
        let (callback, count) = counting_callback();
        let effect = unsafe { instantiate(test_plugin::fake_main, callback) }.unwrap();
        let handle = EffectHandle::from_ptr(effect.as_ptr());

        assert!(registry().contains(handle));
        // Open asks for the sample rate and the time info.
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(unsafe { test_plugin::is_open(effect) });

        unsafe { shutdown(effect) };
        assert!(!registry().contains(handle));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_calls_during_construction_reach_callback() {
        let (callback, count) = counting_callback();
        let effect = unsafe { instantiate(test_plugin::eager_main, callback) }.unwrap();

        // One call from inside the entry point, two from Open.
        assert_eq!(count.load(Ordering::SeqCst), 3);
        unsafe { shutdown(effect) };
        assert!(constructing_callback().is_none());
    }

    #[test]
    fn test_null_entry_rejected() {
        let err = unsafe { instantiate(test_plugin::null_main, Arc::new(|_| 0)) }.unwrap_err();
        assert!(matches!(
            err,
            ferrule_core::BridgeError::Load(LoadError {
                reason: LoadErrorReason::NullEffect,
                ..
            })
        ));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let err = unsafe { instantiate(test_plugin::bad_magic_main, Arc::new(|_| 0)) }.unwrap_err();
        assert!(matches!(
            err,
            ferrule_core::BridgeError::Load(LoadError {
                reason: LoadErrorReason::BadMagic,
                ..
            })
        ));
    }

    #[test]
    fn test_callback_panic_is_contained() {
        let effect = unsafe {
            instantiate(
                test_plugin::fake_main,
                Arc::new(|call: &HostCall| {
                    if call.opcode == HostOpcode::GetSampleRate {
                        panic!("callback failure");
                    }
                    0
                }),
            )
        }
        .unwrap();

        // The panic during Open was caught and answered with 0.
        assert_eq!(unsafe { test_plugin::observed_sample_rate(effect) }, 0);
        unsafe { shutdown(effect) };
    }

    #[test]
    fn test_unknown_opcode_returns_zero() {
        let (callback, count) = counting_callback();
        let effect = unsafe { instantiate(test_plugin::fake_main, callback) }.unwrap();
        let before = count.load(Ordering::SeqCst);

        let result = host_trampoline(effect.as_ptr(), 5, 0, 0, std::ptr::null_mut(), 0.0);
        assert_eq!(result, 0);
        assert_eq!(count.load(Ordering::SeqCst), before);

        unsafe { shutdown(effect) };
    }
}
