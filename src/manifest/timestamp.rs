//! Clip timestamp grammar.
//!
//! Timestamps are fixed-width `HH:MM:SS` strings. Because every field is
//! zero-padded to two digits, lexicographic comparison of two timestamps
//! matches chronological order, which is what duplicate detection and the
//! start-before-end check rely on.

/// Check that a timestamp is of the form `HH:MM:SS`.
///
/// Hours are accepted in `[0, 24]` and minutes/seconds in `[0, 60]`
/// inclusive. The upper bounds are deliberately lenient (24:60:60 passes);
/// this matches the manifest format in the wild rather than strict clock
/// arithmetic.
pub fn is_valid_timestamp(timestamp: &str) -> bool {
    let bytes = timestamp.as_bytes();
    if bytes.len() != 8 || bytes[2] != b':' || bytes[5] != b':' {
        return false;
    }

    let field = |a: usize, b: usize| -> Option<u8> {
        let (a, b) = (bytes[a], bytes[b]);
        if a.is_ascii_digit() && b.is_ascii_digit() {
            Some((a - b'0') * 10 + (b - b'0'))
        } else {
            None
        }
    };

    match (field(0, 1), field(3, 4), field(6, 7)) {
        (Some(hours), Some(minutes), Some(seconds)) => {
            hours <= 24 && minutes <= 60 && seconds <= 60
        }
        _ => false,
    }
}
