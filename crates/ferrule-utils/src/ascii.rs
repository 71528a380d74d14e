//! Fixed-width ASCII field encoding.
//!
//! VST2 exchanges every name and label as a fixed-size `char` array that the
//! writer fills with ASCII text and pads with zero bytes. The reader stops at
//! the first zero byte. These helpers implement both directions without
//! allocating on the encode side.

/// Encode `s` into `dest` as a null-terminated, null-padded ASCII field.
///
/// Non-ASCII characters are skipped and interior null bytes end the string.
/// At most `dest.len() - 1` bytes of text are written so the field always
/// carries a terminator. Returns the number of text bytes written.
///
/// # Examples
///
/// ```
/// use ferrule_utils::encode_ascii;
///
/// let mut field = [0xffu8; 8];
/// let written = encode_ascii("Gain", &mut field);
/// assert_eq!(written, 4);
/// assert_eq!(&field, b"Gain\0\0\0\0");
/// ```
pub fn encode_ascii(s: &str, dest: &mut [u8]) -> usize {
    if dest.is_empty() {
        return 0;
    }

    let capacity = dest.len() - 1;
    let mut written = 0;
    for byte in s.bytes().filter(u8::is_ascii) {
        if byte == 0 || written == capacity {
            break;
        }
        dest[written] = byte;
        written += 1;
    }
    dest[written..].fill(0);
    written
}

/// Decode a fixed-width ASCII field.
///
/// Reads up to the first null byte (or the whole slice when no terminator is
/// present, which some plugins produce when they fill the field completely).
/// Bytes outside the ASCII range are replaced lossily.
///
/// # Examples
///
/// ```
/// use ferrule_utils::decode_ascii;
///
/// assert_eq!(decode_ascii(b"Hall\0\0\0\0"), "Hall");
/// assert_eq!(decode_ascii(b"FullName"), "FullName");
/// ```
pub fn decode_ascii(src: &[u8]) -> String {
    let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
    String::from_utf8_lossy(&src[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_with_nulls() {
        let mut field = [0xaau8; 24];
        assert_eq!(encode_ascii("Init", &mut field), 4);
        assert_eq!(&field[..4], b"Init");
        assert!(field[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_truncates_and_terminates() {
        let mut field = [0u8; 8];
        assert_eq!(encode_ascii("Resonance", &mut field), 7);
        assert_eq!(&field, b"Resonan\0");
    }

    #[test]
    fn test_encode_skips_non_ascii() {
        let mut field = [0u8; 8];
        encode_ascii("Größe", &mut field);
        assert_eq!(decode_ascii(&field), "Gre");
    }

    #[test]
    fn test_encode_stops_at_interior_null() {
        let mut field = [0u8; 8];
        assert_eq!(encode_ascii("ab\0cd", &mut field), 2);
        assert_eq!(decode_ascii(&field), "ab");
    }

    #[test]
    fn test_encode_empty_destination() {
        let mut field: [u8; 0] = [];
        assert_eq!(encode_ascii("anything", &mut field), 0);
    }

    #[test]
    fn test_decode_without_terminator() {
        assert_eq!(decode_ascii(b"12345678"), "12345678");
    }

    #[test]
    fn test_decode_empty_field() {
        assert_eq!(decode_ascii(&[0u8; 64]), "");
    }
}
