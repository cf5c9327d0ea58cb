//! Encoding helpers shared by the `credman` crates so that every binary value is rendered the same
//! way, whether it ends up in client data, a credential id or a log line.

use data_encoding::{Specification, BASE64URL, BASE64_NOPAD, BASE64URL_NOPAD};

const PADDING: char = '=';

/// Convert bytes to base64 without padding
pub fn base64(data: &[u8]) -> String {
    BASE64_NOPAD.encode(data)
}

/// Convert bytes to base64url without padding
pub fn base64url(data: &[u8]) -> String {
    BASE64URL_NOPAD.encode(data)
}

/// Try parsing from base64 with or without padding
pub fn try_from_base64(input: &str) -> Option<Vec<u8>> {
    BASE64_NOPAD
        .decode(input.trim_end_matches(PADDING).as_bytes())
        .ok()
}

/// Try parsing from base64url with or without padding.
///
/// Trailing bits are not checked since some relying parties produce non-canonical encodings of
/// their challenges.
pub fn try_from_base64url(input: &str) -> Option<Vec<u8>> {
    let lenient = Specification {
        check_trailing_bits: false,
        padding: None,
        ..BASE64URL.specification()
    }
    .encoding()
    .ok()?;
    lenient
        .decode(input.trim_end_matches(PADDING).as_bytes())
        .ok()
}
