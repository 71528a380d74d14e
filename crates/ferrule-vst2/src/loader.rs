//! Module loading and entry point resolution.
//!
//! A [`Module`] owns the OS handle of one plugin library together with its
//! resolved entry point. Plugins loaded from it borrow it, so the library
//! outlives every instance. [`Module::close`] consumes the module, which
//! makes a double close impossible.

use std::fmt;
use std::path::{Path, PathBuf};

use libloading::Library;

use ferrule_core::{BridgeError, BridgeResult, EntryProc, LoadError, LoadErrorReason};

use crate::dispatch::instantiate;
use crate::paths::{module_name, resolve_bundle};
use crate::plugin::Plugin;
use crate::registry::HostCallback;

/// Entry symbols in lookup order. Pre-2.4 plugins export `main` (and
/// `main_macho` on macOS) instead of `VSTPluginMain`.
#[cfg(target_os = "macos")]
const ENTRY_SYMBOLS: &[&[u8]] = &[b"VSTPluginMain\0", b"main_macho\0", b"main\0"];

#[cfg(not(target_os = "macos"))]
const ENTRY_SYMBOLS: &[&[u8]] = &[b"VSTPluginMain\0", b"main\0"];

/// A loaded plugin library.
pub struct Module {
    library: Library,
    entry: EntryProc,
    path: PathBuf,
    name: String,
}

impl Module {
    /// Load the library at `path` and resolve its entry point.
    ///
    /// macOS `.vst` bundles are resolved to the binary inside them.
    ///
    /// # Safety
    ///
    /// Loading a library runs its initialization routines, and the entry
    /// point is trusted to follow the VST2 ABI. Only open files that are
    /// VST2 plugins.
    pub unsafe fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let canonical = path
            .canonicalize()
            .map_err(|err| LoadError::new(path, LoadErrorReason::NotFound).with_detail(err.to_string()))?;
        let binary = resolve_bundle(&canonical);

        let library = Library::new(&binary).map_err(|err| {
            LoadError::new(&canonical, LoadErrorReason::PlatformRejected).with_detail(err.to_string())
        })?;

        let entry = resolve_entry(&library).ok_or_else(|| {
            LoadError::new(&canonical, LoadErrorReason::SymbolMissing).with_detail("VSTPluginMain")
        })?;

        let name = module_name(&canonical);
        log::debug!("Opened module {} from {}", name, binary.display());
        Ok(Self {
            library,
            entry,
            path: canonical,
            name,
        })
    }

    /// Create a plugin instance, register `callback` for it and open it.
    ///
    /// A module can create any number of instances.
    pub fn load(&self, callback: HostCallback) -> BridgeResult<Plugin<'_>> {
        // SAFETY: `entry` was resolved from `library`, which the returned
        // plugin borrows and therefore keeps loaded.
        let effect = unsafe { instantiate(self.entry, callback) }.map_err(|err| match err {
            BridgeError::Load(load) => BridgeError::Load(LoadError {
                path: self.path.clone(),
                ..load
            }),
            other => other,
        })?;
        Ok(Plugin::from_effect(effect, self.path.clone(), self.name.clone()))
    }

    /// Release the OS handle.
    pub fn close(self) -> Result<(), LoadError> {
        let Self { library, path, name, .. } = self;
        library.close().map_err(|err| {
            LoadError::new(&path, LoadErrorReason::PlatformRejected).with_detail(err.to_string())
        })?;
        log::debug!("Closed module {}", name);
        Ok(())
    }

    /// Raw entry point.
    pub fn entry(&self) -> EntryProc {
        self.entry
    }

    /// Canonical path the module was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without extension.
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn resolve_entry(library: &Library) -> Option<EntryProc> {
    ENTRY_SYMBOLS.iter().find_map(|symbol| {
        // SAFETY: Every entry symbol has the `EntryProc` signature.
        let entry = unsafe { library.get::<EntryProc>(symbol) }.ok()?;
        Some(*entry)
    })
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}
