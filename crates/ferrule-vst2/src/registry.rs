//! Process-wide callback registry.
//!
//! Plugins call back into the host through a single `extern "C"` trampoline
//! that receives nothing but the effect pointer. The registry maps that
//! pointer back to the host callback supplied at load time. It is the only
//! global mutable state in the bridge: entries are added right after a
//! plugin's entry point returns and removed right after `Close` returns.

use std::collections::HashMap;
use std::ffi::c_void;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use ferrule_core::{AEffect, BridgeError, BridgeResult, HostOpcode};

// =============================================================================
// Effect Handle
// =============================================================================

/// Identity of a loaded effect.
///
/// Wraps the effect pointer's address. It is only ever used as a key and
/// never dereferenced, so it is freely `Copy + Send + Sync`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectHandle(usize);

impl EffectHandle {
    /// Handle for an effect pointer.
    #[inline]
    pub fn from_ptr(effect: *const AEffect) -> Self {
        Self(effect as usize)
    }

    /// The effect pointer this handle was created from.
    #[inline]
    pub fn as_ptr(self) -> *mut AEffect {
        self.0 as *mut AEffect
    }

    /// Whether the handle wraps a null pointer.
    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EffectHandle({:#x})", self.0)
    }
}

// =============================================================================
// Host Call
// =============================================================================

/// One inbound call from a plugin, already decoded.
#[derive(Debug, Clone, Copy)]
pub struct HostCall {
    /// The effect that made the call.
    pub effect: EffectHandle,
    pub opcode: HostOpcode,
    pub index: i32,
    pub value: isize,
    /// Opcode-specific pointer. Owned by the plugin unless the opcode's
    /// contract says otherwise.
    pub ptr: *mut c_void,
    pub opt: f32,
}

/// Host-side handler for inbound calls.
///
/// May be invoked from any thread the plugin chooses, including the audio
/// thread and threads the host never created.
pub type HostCallback = Arc<dyn Fn(&HostCall) -> isize + Send + Sync>;

// =============================================================================
// Registry
// =============================================================================

/// Concurrent map from effect handle to host callback.
///
/// Lookups take the read lock only long enough to clone the `Arc`, so a
/// callback that re-enters the bridge (or blocks) never holds the lock.
pub struct CallbackRegistry {
    callbacks: RwLock<HashMap<EffectHandle, HostCallback>>,
}

impl CallbackRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Register the callback for `handle`.
    ///
    /// Fails if the handle already has a callback: at most one callback
    /// exists per handle.
    pub fn register(&self, handle: EffectHandle, callback: HostCallback) -> BridgeResult<()> {
        let mut callbacks = self.callbacks.write().unwrap_or_else(PoisonError::into_inner);
        if callbacks.contains_key(&handle) {
            return Err(BridgeError::ProtocolViolation(format!(
                "{:?} is already registered",
                handle
            )));
        }
        callbacks.insert(handle, callback);
        log::debug!("Registered host callback for {:?}", handle);
        Ok(())
    }

    /// Callback registered for `handle`.
    pub fn lookup(&self, handle: EffectHandle) -> BridgeResult<HostCallback> {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&handle)
            .cloned()
            .ok_or_else(|| BridgeError::ProtocolViolation(format!("{:?} is not registered", handle)))
    }

    /// Remove the callback for `handle`, returning it if present.
    pub fn unregister(&self, handle: EffectHandle) -> Option<HostCallback> {
        let removed = self
            .callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle);
        if removed.is_some() {
            log::debug!("Unregistered host callback for {:?}", handle);
        }
        removed
    }

    /// Whether `handle` has a callback.
    pub fn contains(&self, handle: EffectHandle) -> bool {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&handle)
    }

    /// Number of registered effects.
    pub fn len(&self) -> usize {
        self.callbacks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no effect is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global registry used by the trampoline.
static REGISTRY: OnceLock<CallbackRegistry> = OnceLock::new();

/// The process-wide registry.
pub fn registry() -> &'static CallbackRegistry {
    REGISTRY.get_or_init(CallbackRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn handle(addr: usize) -> EffectHandle {
        EffectHandle::from_ptr(addr as *const AEffect)
    }

    fn call(effect: EffectHandle) -> HostCall {
        HostCall {
            effect,
            opcode: HostOpcode::Idle,
            index: 0,
            value: 0,
            ptr: std::ptr::null_mut(),
            opt: 0.0,
        }
    }

    #[test]
    fn test_register_then_lookup() {
        let registry = CallbackRegistry::new();
        let h = handle(0x1000);
        registry.register(h, Arc::new(|_| 7)).unwrap();

        let callback = registry.lookup(h).unwrap();
        assert_eq!(callback(&call(h)), 7);
        assert!(registry.contains(h));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_then_lookup_fails() {
        let registry = CallbackRegistry::new();
        let h = handle(0x2000);
        registry.register(h, Arc::new(|_| 0)).unwrap();

        assert!(registry.unregister(h).is_some());
        assert!(matches!(registry.lookup(h), Err(BridgeError::ProtocolViolation(_))));
        assert!(registry.unregister(h).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_one_callback_per_handle() {
        let registry = CallbackRegistry::new();
        let h = handle(0x3000);
        registry.register(h, Arc::new(|_| 1)).unwrap();
        assert!(registry.register(h, Arc::new(|_| 2)).is_err());

        let callback = registry.lookup(h).unwrap();
        assert_eq!(callback(&call(h)), 1);
    }

    #[test]
    fn test_concurrent_lookups() {
        let registry = Arc::new(CallbackRegistry::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let h = handle(0x4000);
        let c = Arc::clone(&counter);
        registry
            .register(
                h,
                Arc::new(move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                    0
                }),
            )
            .unwrap();

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let callback = registry.lookup(h).unwrap();
                        callback(&call(h));
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 800);
    }

    #[test]
    fn test_lookups_during_registration_churn() {
        let registry = Arc::new(CallbackRegistry::new());
        let stable = handle(0x5000);
        registry.register(stable, Arc::new(|_| 7)).unwrap();

        let writer = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for round in 0..200 {
                    let h = handle(0x6000 + (round % 16) * 0x10);
                    registry.register(h, Arc::new(|_| 0)).unwrap();
                    assert!(registry.unregister(h).is_some());
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let callback = registry.lookup(stable).unwrap();
                        assert_eq!(callback(&call(stable)), 7);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(stable));
    }

    #[test]
    fn test_handle_identity() {
        let h = handle(0xdead0);
        assert_eq!(h.as_ptr() as usize, 0xdead0);
        assert!(!h.is_null());
        assert!(EffectHandle::from_ptr(std::ptr::null()).is_null());
        assert_eq!(format!("{:?}", h), "EffectHandle(0xdead0)");
    }
}
