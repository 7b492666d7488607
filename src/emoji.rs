//! Pictographic symbol extraction.
//!
//! A symbol is one scalar value with the Unicode `Extended_Pictographic`
//! property, using the tables bundled with `regex` (regex-syntax 0.8,
//! Unicode 15). Emoji sequences are split into their pictographic members:
//! ZWJ, variation selectors and skin-tone modifiers are not counted.

use regex::Regex;
use std::sync::OnceLock;

static PICTOGRAPHIC: OnceLock<Regex> = OnceLock::new();

fn pictographic() -> &'static Regex {
    PICTOGRAPHIC.get_or_init(|| {
        Regex::new(r"\p{Extended_Pictographic}").unwrap_or_else(|e| panic!("pictographic pattern must compile: {e}"))
    })
}

/// Pictographic symbols of `text`, in order, repeats included.
pub fn pictographs(text: &str) -> impl Iterator<Item = &str> {
    pictographic().find_iter(text).map(|m| m.as_str())
}

pub fn is_pictographic(c: char) -> bool {
    let mut buf = [0u8; 4];
    pictographic().is_match(c.encode_utf8(&mut buf))
}
