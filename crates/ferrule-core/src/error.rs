//! Error types for loading and talking to VST2 plugins.

use std::fmt;
use std::path::PathBuf;

/// Why a plugin module could not be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorReason {
    /// The path does not exist or cannot be resolved.
    NotFound,

    /// The library loaded but exports none of the known entry symbols.
    SymbolMissing,

    /// The OS loader refused the file (wrong architecture, bad format,
    /// missing dependent libraries) or failed to unload it.
    PlatformRejected,

    /// The entry point returned a null effect pointer.
    NullEffect,

    /// The returned effect does not carry the `VstP` magic number.
    BadMagic,
}

impl fmt::Display for LoadErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotFound => "not found",
            Self::SymbolMissing => "entry symbol missing",
            Self::PlatformRejected => "rejected by platform loader",
            Self::NullEffect => "entry point returned null",
            Self::BadMagic => "bad effect magic",
        };
        f.write_str(text)
    }
}

/// Recoverable failure while opening a module or instantiating an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// Module path the failure relates to. Empty for in-process entry points.
    pub path: PathBuf,

    /// Failure category.
    pub reason: LoadErrorReason,

    /// Platform detail, if any (loader message, offending magic value).
    pub detail: Option<String>,
}

impl LoadError {
    /// Create an error without platform detail.
    pub fn new(path: impl Into<PathBuf>, reason: LoadErrorReason) -> Self {
        Self {
            path: path.into(),
            reason,
            detail: None,
        }
    }

    /// Attach a platform detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to load {}: {}", self.path.display(), self.reason)?;
        if let Some(detail) = &self.detail {
            write!(f, " ({})", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadError {}

/// Error type for bridge operations.
#[derive(Debug)]
pub enum BridgeError {
    /// Module or effect could not be loaded.
    Load(LoadError),

    /// The registry was asked about a handle it does not know, or the
    /// plugin broke a protocol rule.
    ProtocolViolation(String),

    /// Sample buffers cannot cover the plugin's declared channel count.
    DimensionMismatch {
        /// Which side failed ("input" or "output").
        side: &'static str,
        /// Channels the plugin declares.
        required: usize,
        /// Channels the buffer provides.
        provided: usize,
    },

    /// The plugin does not support the requested operation.
    Unsupported(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(err) => write!(f, "{}", err),
            Self::ProtocolViolation(msg) => write!(f, "Protocol violation: {}", msg),
            Self::DimensionMismatch {
                side,
                required,
                provided,
            } => write!(
                f,
                "Dimension mismatch: plugin needs {} {} channels, buffer has {}",
                required, side, provided
            ),
            Self::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LoadError> for BridgeError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
