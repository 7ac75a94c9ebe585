//! Question fingerprints.
//!
//! A fingerprint is the identity key of an outline entry: a 32-bit rolling
//! polynomial hash (`h = h * 31 + unit`, wrapping) over the UTF-16 code units
//! of the question text, printed as the base-36 magnitude.
//!
//! Collisions are not detected. Two different questions with the same
//! fingerprint are treated as one entry.
//!
//! ```ignore
//! let fp = hash::fingerprint("What is X?"); // -> "1v3k9qz" style string
//! ```

/// 32-bit rolling hash over UTF-16 code units.
#[inline]
pub fn compute(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Hash `text` and render it as a compact base-36 string.
pub fn fingerprint(text: &str) -> String {
    to_base36(compute(text).unsigned_abs())
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::with_capacity(7);
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
