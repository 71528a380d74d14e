//! Host configuration.
//!
//! Static metadata the bridge reports to plugins on request: identity
//! strings, language, default audio settings and the capability list.
//!
//! # Example
//!
//! ```
//! use ferrule_core::HostConfig;
//!
//! pub static CONFIG: HostConfig = HostConfig::new("My Host")
//!     .with_vendor("My Company")
//!     .with_vendor_version(1_0_0)
//!     .with_can_do(&["sendVstEvents", "sendVstMidiEvent", "sizeWindow"]);
//!
//! assert!(CONFIG.can_do("sizeWindow"));
//! ```

use crate::types::HostLanguage;

/// Capabilities every host built on this bridge supports.
pub const DEFAULT_CAN_DO: &[&str] = &[
    "sendVstEvents",
    "sendVstMidiEvent",
    "sendVstTimeInfo",
    "receiveVstEvents",
    "receiveVstMidiEvent",
    "supplyIdle",
];

/// Host identity and defaults reported to plugins.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Product name (`GetProductString`, 64 bytes max).
    pub product: &'static str,

    /// Vendor name (`GetVendorString`, 64 bytes max).
    pub vendor: &'static str,

    /// Vendor-specific version number.
    pub vendor_version: i32,

    /// Language reported through `GetLanguage`.
    pub language: HostLanguage,

    /// Sample rate reported until the host supplies its own.
    pub sample_rate: f32,

    /// Block size reported until the host supplies its own.
    pub block_size: i32,

    /// Capability strings answered with "yes". Anything else is "no".
    pub can_do: &'static [&'static str],
}

impl HostConfig {
    /// Defaults used by `noop` hosts and tests.
    pub const DEFAULT: HostConfig = HostConfig::new("Ferrule");

    /// Create a configuration with default values.
    pub const fn new(product: &'static str) -> Self {
        Self {
            product,
            vendor: "Ferrule",
            vendor_version: 1,
            language: HostLanguage::English,
            sample_rate: 44100.0,
            block_size: 512,
            can_do: DEFAULT_CAN_DO,
        }
    }

    /// Set the vendor name.
    pub const fn with_vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    /// Set the vendor version.
    pub const fn with_vendor_version(mut self, version: i32) -> Self {
        self.vendor_version = version;
        self
    }

    /// Set the reported language.
    pub const fn with_language(mut self, language: HostLanguage) -> Self {
        self.language = language;
        self
    }

    /// Set the default sample rate.
    pub const fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the default block size.
    pub const fn with_block_size(mut self, block_size: i32) -> Self {
        self.block_size = block_size;
        self
    }

    /// Replace the capability list.
    pub const fn with_can_do(mut self, can_do: &'static [&'static str]) -> Self {
        self.can_do = can_do;
        self
    }

    /// Whether `capability` is in the list.
    pub fn can_do(&self, capability: &str) -> bool {
        self.can_do.iter().any(|c| *c == capability)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
