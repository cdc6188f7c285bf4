// src/escape.rs
//
// HTML escaping and UTF-8 decoding helpers shared by every recognizer.

use crate::sink::HtmlSink;

/// Decode the scalar at the front of `s`.
///
/// Returns the character and its encoded length, or `None` when `s` is empty
/// or starts with an invalid sequence.
pub(crate) fn decode_char(s: &[u8]) -> Option<(char, usize)> {
    let window = &s[..s.len().min(4)];
    let valid = match std::str::from_utf8(window) {
        Ok(v) => v,
        Err(e) => std::str::from_utf8(&window[..e.valid_up_to()]).ok()?,
    };
    valid.chars().next().map(|c| (c, c.len_utf8()))
}

/// Decode one character, falling back to the byte's own value for invalid input.
/// Never returns a length of zero for non-empty `s`.
pub(crate) fn decode_lossy(s: &[u8]) -> (char, usize) {
    decode_char(s).unwrap_or_else(|| (char::from(s[0]), 1))
}

#[inline]
fn escaped(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '>' => Some("&gt;"),
        '<' => Some("&lt;"),
        _ => None,
    }
}

/// Write a single character, escaping the four HTML-special ones.
pub(crate) fn write_escaped_char(out: &mut dyn HtmlSink, c: char) {
    match escaped(c) {
        Some(entity) => out.write_str(entity),
        None => {
            let mut buf = [0u8; 4];
            out.write_str(c.encode_utf8(&mut buf));
        }
    }
}

/// Write `text` with `&`, `"`, `<` and `>` replaced by entities.
///
/// Used for everything emitted without being re-parsed: code, attribute
/// values, autolink text.
pub fn write_escaped(out: &mut dyn HtmlSink, text: &[u8]) {
    let mut i = 0usize;
    let mut run = 0usize; // start of the pending verbatim run
    while i < text.len() {
        let b = text[i];
        if b.is_ascii() {
            if let Some(entity) = escaped(char::from(b)) {
                out.write_bytes(&text[run..i]);
                out.write_str(entity);
                run = i + 1;
            }
            i += 1;
            continue;
        }
        match decode_char(&text[i..]) {
            Some((_, len)) => i += len,
            None => {
                out.write_bytes(&text[run..i]);
                write_escaped_char(out, char::from(b));
                i += 1;
                run = i;
            }
        }
    }
    out.write_bytes(&text[run..]);
}

/// Write every character of `text` as a decimal numeric character reference.
pub(crate) fn write_char_refs(out: &mut dyn HtmlSink, text: &[u8]) {
    let mut i = 0usize;
    while i < text.len() {
        let (c, len) = decode_lossy(&text[i..]);
        out.write_str(&format!("&#{};", u32::from(c)));
        i += len;
    }
}
