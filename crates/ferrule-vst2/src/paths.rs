//! Default plugin locations and file naming per platform.

use std::path::{Path, PathBuf};

/// File extension of VST2 modules on this platform.
#[cfg(target_os = "macos")]
pub const FILE_EXTENSION: &str = ".vst";

/// File extension of VST2 modules on this platform.
#[cfg(target_os = "windows")]
pub const FILE_EXTENSION: &str = ".dll";

/// File extension of VST2 modules on this platform.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const FILE_EXTENSION: &str = ".so";

/// Default VST2 search locations for this platform.
///
/// Directories are returned whether or not they exist; scanning them is up
/// to the caller.
pub fn scan_paths() -> Vec<PathBuf> {
    platform_scan_paths()
}

#[cfg(target_os = "macos")]
fn platform_scan_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join("Library/Audio/Plug-Ins/VST"));
    }
    paths.push(PathBuf::from("/Library/Audio/Plug-Ins/VST"));
    paths
}

#[cfg(target_os = "windows")]
fn platform_scan_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from(r"C:\Program Files (x86)\Steinberg\VSTPlugins"),
        PathBuf::from(r"C:\Program Files\Steinberg\VSTPlugins"),
    ];
    if let Some(extra) = std::env::var_os("VST_PATH").filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(extra));
    }
    paths
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_scan_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/usr/local/lib/vst"), PathBuf::from("/usr/lib/vst")];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        paths.push(home.join(".vst"));
        paths.push(home.join("vst"));
    }
    paths
}

/// Resolve a macOS `.vst` bundle to the binary inside it.
///
/// Bundles keep the loadable image at `Contents/MacOS/<stem>`. Any other
/// path (or a bundle without that binary) is returned unchanged.
pub fn resolve_bundle(path: &Path) -> PathBuf {
    if path.is_dir() && path.extension().and_then(|e| e.to_str()) == Some("vst") {
        if let Some(stem) = path.file_stem() {
            let inner = path.join("Contents").join("MacOS").join(stem);
            if inner.exists() {
                return inner;
            }
        }
    }
    path.to_path_buf()
}

/// Display name of a module: its file name without extension.
pub fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_has_dot() {
        assert!(FILE_EXTENSION.starts_with('.'));
    }

    #[test]
    fn test_scan_paths_not_empty() {
        let paths = scan_paths();
        assert!(!paths.is_empty());
        assert!(paths.iter().all(|p| p.is_absolute() || cfg!(target_os = "windows")));
    }

    #[test]
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    fn test_linux_system_paths_first() {
        let paths = scan_paths();
        assert_eq!(paths[0], PathBuf::from("/usr/local/lib/vst"));
        assert_eq!(paths[1], PathBuf::from("/usr/lib/vst"));
    }

    #[test]
    fn test_module_name_from_stem() {
        assert_eq!(module_name(Path::new("/plugins/Delay Lama.so")), "Delay Lama");
        assert_eq!(module_name(Path::new("again.dll")), "again");
        assert_eq!(module_name(Path::new("/")), "");
    }

    #[test]
    fn test_resolve_bundle_passthrough() {
        let path = Path::new("/nonexistent/plugin.so");
        assert_eq!(resolve_bundle(path), path.to_path_buf());
    }

    #[test]
    fn test_resolve_bundle_inner_binary() {
        let root = std::env::temp_dir().join(format!("ferrule-bundle-{}", std::process::id()));
        let bundle = root.join("Echo.vst");
        let macos = bundle.join("Contents").join("MacOS");
        std::fs::create_dir_all(&macos).unwrap();
        std::fs::write(macos.join("Echo"), b"").unwrap();

        assert_eq!(resolve_bundle(&bundle), macos.join("Echo"));
        std::fs::remove_dir_all(&root).unwrap();
    }
}
