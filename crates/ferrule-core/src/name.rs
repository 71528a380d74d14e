//! Fixed-width ASCII name fields.

use std::ffi::c_void;
use std::fmt;

use ferrule_utils::{decode_ascii, encode_ascii};

/// A null-padded ASCII field of exactly `N` bytes.
///
/// Layout-compatible with `char[N]` so it can be embedded in `#[repr(C)]`
/// structures and passed to the plugin as a dispatch pointer.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedString<const N: usize>(pub [u8; N]);

/// Parameter names, labels and display text.
pub type Ascii8 = FixedString<8>;
/// Program names and category labels.
pub type Ascii24 = FixedString<24>;
/// Effect name.
pub type Ascii32 = FixedString<32>;
/// Vendor and product strings, pin and speaker labels.
pub type Ascii64 = FixedString<64>;

impl<const N: usize> FixedString<N> {
    /// Width of the field in bytes, terminator included.
    pub const WIDTH: usize = N;

    /// An all-zero field.
    pub const fn zeroed() -> Self {
        Self([0; N])
    }

    /// Encode `s`, dropping non-ASCII characters and truncating to `N - 1`
    /// bytes.
    pub fn encode(s: &str) -> Self {
        let mut field = Self::zeroed();
        encode_ascii(s, &mut field.0);
        field
    }

    /// Decode up to the first null byte.
    pub fn decode(&self) -> String {
        decode_ascii(&self.0)
    }

    /// Raw bytes, padding included.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Pointer suitable for the `ptr` argument of a dispatch call.
    pub fn as_mut_ptr(&mut self) -> *mut c_void {
        self.0.as_mut_ptr().cast()
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedString<{}>({:?})", N, self.decode())
    }
}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.decode())
    }
}

impl<const N: usize> From<&str> for FixedString<N> {
    fn from(s: &str) -> Self {
        Self::encode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(std::mem::size_of::<Ascii8>(), 8);
        assert_eq!(std::mem::size_of::<Ascii24>(), 24);
        assert_eq!(std::mem::size_of::<Ascii32>(), 32);
        assert_eq!(Ascii64::WIDTH, 64);
    }

    #[test]
    fn test_encode_truncates_to_width() {
        let name = Ascii8::encode("Frequency");
        assert_eq!(name.decode(), "Frequen");
        assert_eq!(name.as_bytes()[7], 0);
    }

    #[test]
    fn test_program_name_drops_non_ascii() {
        let name: Ascii24 = "Café Hall".into();
        assert_eq!(name.to_string(), "Caf Hall");
    }

    #[test]
    fn test_zeroed_decodes_empty() {
        assert_eq!(Ascii64::default().decode(), "");
    }
}
