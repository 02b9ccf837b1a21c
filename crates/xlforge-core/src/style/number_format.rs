//! Number format codes
//!
//! Cells carry number formats as plain code strings. This module knows the
//! built-in codes (ids below 164) and how to recognise a date format.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The General format
pub const GENERAL: &str = "General";

/// Built-in number formats that have a fixed id in every package
pub const BUILTIN_FORMATS: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

static BUILTIN_BY_CODE: Lazy<HashMap<&'static str, u32>> =
    Lazy::new(|| BUILTIN_FORMATS.iter().map(|&(id, code)| (code, id)).collect());

/// Code of a built-in format id
pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    BUILTIN_FORMATS
        .iter()
        .find(|(builtin, _)| *builtin == id)
        .map(|(_, code)| *code)
}

/// Built-in id of a code, if the code is one of the built-ins
pub fn builtin_format_id(code: &str) -> Option<u32> {
    BUILTIN_BY_CODE.get(code).copied()
}

/// Check whether a built-in format id displays a date or time
pub fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

/// Check whether a format code displays a date or time
///
/// Quoted literals, escaped characters and bracketed sections (colors,
/// conditions) are ignored; `[h]`, `[m]` and `[s]` elapsed-time sections
/// count as time.
pub fn is_date_format_code(code: &str) -> bool {
    // Only the first (positive) section decides
    let mut chars = code.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut inner = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    inner.push(b);
                }
                let inner = inner.to_ascii_lowercase();
                if !inner.is_empty() && inner.chars().all(|c| matches!(c, 'h' | 'm' | 's')) {
                    return true;
                }
            }
            ';' => return false,
            'y' | 'Y' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' | 'm' | 'M' => return true,
            _ => {}
        }
    }
    false
}
