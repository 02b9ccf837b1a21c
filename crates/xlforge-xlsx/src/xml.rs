//! Small XML helpers shared by the reader and writer
//!
//! Escaping, the `_xHHHH_` convention for characters XML cannot carry, and
//! attribute lookup on quick-xml start tags.

use std::fmt::Write as _;

use quick_xml::events::BytesStart;

/// Escape the five XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Characters that cannot appear literally in an XML 1.0 text node
///
/// Carriage returns are included: XML parsers normalize them away.
fn needs_hex_escape(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{D}' | '\u{E}'..='\u{1F}')
        || c == '\u{FFFE}'
        || c == '\u{FFFF}'
}

/// Length of a `_xHHHH_` sequence starting at byte `i`, if there is one
fn hex_escape_at(bytes: &[u8], i: usize) -> Option<u32> {
    let seq = bytes.get(i..i + 7)?;
    if seq[0] != b'_' || seq[1] != b'x' || seq[6] != b'_' {
        return None;
    }
    let hex = std::str::from_utf8(&seq[2..6]).ok()?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Encode cell text for a `<t>` element
///
/// Illegal characters become `_xHHHH_`; a literal `_xHHHH_` in the input is
/// protected by escaping its underscore as `_x005F_`. The result still needs
/// [`escape_xml`].
pub(crate) fn encode_text(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        if c == '_' && hex_escape_at(bytes, i).is_some() {
            out.push_str("_x005F_");
        } else if needs_hex_escape(c) {
            let _ = write!(out, "_x{:04X}_", c as u32);
        } else {
            out.push(c);
        }
    }
    out
}

/// Decode `_xHHHH_` sequences back into characters
///
/// Incomplete or malformed sequences are kept as-is.
pub(crate) fn decode_text(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if let Some(code) = hex_escape_at(bytes, i) {
            if let Some(c) = char::from_u32(code) {
                out.push(c);
                i += 7;
                continue;
            }
        }
        // Advance one full character
        let c = s[i..].chars().next().unwrap_or('\u{FFFD}');
        out.push(c);
        i += c.len_utf8().max(1);
    }
    out
}

/// Whether a text node needs `xml:space="preserve"`
pub(crate) fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}

/// Build a `<t>` element for cell text
pub(crate) fn text_element(s: &str) -> String {
    let body = escape_xml(&encode_text(s));
    if needs_space_preserve(s) {
        format!("<t xml:space=\"preserve\">{}</t>", body)
    } else {
        format!("<t>{}</t>", body)
    }
}

/// Unescaped value of an attribute, matched on its local name
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Attribute parsed with `FromStr`
pub(crate) fn attr_parse<T: std::str::FromStr>(e: &BytesStart<'_>, key: &[u8]) -> Option<T> {
    attr(e, key).and_then(|v| v.trim().parse().ok())
}

/// Boolean attribute (`1`/`true`); `None` when absent
pub(crate) fn attr_bool(e: &BytesStart<'_>, key: &[u8]) -> Option<bool> {
    attr(e, key).map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}
