//! Number-format ids used in `styles.xml`
//!
//! Ids below 164 are the built-ins every consumer knows. 164..=172 are
//! presets this codec always assigns the same way; anything else gets an id
//! from [`FIRST_CUSTOM_ID`] upwards.

use xlforge_core::style::number_format::{
    builtin_format_code, builtin_format_id, is_builtin_date_format, is_date_format_code,
};
use xlforge_core::CellValue;

/// Format applied to date cells that have no explicit number format
pub const DEFAULT_DATE_FORMAT_ID: u32 = 164;

/// First id handed out to a custom code
pub const FIRST_CUSTOM_ID: u32 = 173;

/// Date/time and numeric precision presets
pub const PRESET_FORMATS: &[(u32, &str)] = &[
    (164, "yyyy-mm-dd hh:mm:ss"),
    (165, "yyyy-mm-dd"),
    (166, "hh:mm:ss"),
    (167, "yyyy-mm-dd hh:mm"),
    (168, "yyyy-mm-dd hh:mm:ss.000"),
    (169, "0.0"),
    (170, "0.000"),
    (171, "0.0000"),
    (172, "#,##0.000"),
];

pub fn preset_format_code(id: u32) -> Option<&'static str> {
    PRESET_FORMATS
        .iter()
        .find(|(preset, _)| *preset == id)
        .map(|(_, code)| *code)
}

pub fn preset_format_id(code: &str) -> Option<u32> {
    PRESET_FORMATS
        .iter()
        .find(|(_, preset)| *preset == code)
        .map(|(id, _)| *id)
}

/// Fixed id of a code, if it is a built-in or a preset
pub fn known_format_id(code: &str) -> Option<u32> {
    builtin_format_id(code).or_else(|| preset_format_id(code))
}

/// Code of a fixed id, if it is a built-in or a preset
pub fn known_format_code(id: u32) -> Option<&'static str> {
    builtin_format_code(id).or_else(|| preset_format_code(id))
}

/// Number format a value gets when its style does not name one
///
/// Date and time values need a date format to display as dates; every
/// other value uses General.
pub fn default_format_for(value: &CellValue) -> Option<u32> {
    match value {
        CellValue::DateTime(_) | CellValue::DateTimeOffset(_) => Some(DEFAULT_DATE_FORMAT_ID),
        _ => None,
    }
}

/// Whether a format id (with its declared code, if any) displays dates
pub fn is_date_format(id: u32, code: Option<&str>) -> bool {
    match code {
        Some(code) => is_date_format_code(code),
        None => is_builtin_date_format(id) || matches!(id, 164..=168),
    }
}
