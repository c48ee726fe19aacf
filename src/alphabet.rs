//! The 26-letter alphabet all cipher arithmetic works over.

/// A single uppercase Latin letter, stored as its zero-based index (0..26).
pub const ALPHABET_LEN: u8 = 26;

/// Converts an uppercase ASCII letter to its 0..26 index. Returns `None` for
/// anything that is not `'A'..='Z'`.
pub fn index_of(c: char) -> Option<u8> {
    if c.is_ascii_uppercase() {
        Some(c as u8 - b'A')
    } else {
        None
    }
}

/// Converts a 0..26 index back to its uppercase letter. Panics if `i >= 26`,
/// which would indicate a bug in the caller's arithmetic, not bad input.
pub fn letter_of(i: u8) -> char {
    assert!(i < ALPHABET_LEN, "letter index out of range: {i}");
    (b'A' + i) as char
}

/// `true` iff every character in `s` is an uppercase Latin letter.
pub fn is_all_letters(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_uppercase())
}
