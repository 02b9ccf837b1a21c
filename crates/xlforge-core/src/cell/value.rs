//! Cell value types

use crate::date;
use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Represents the value stored in a cell
///
/// There is no empty variant: an empty cell is simply absent from its sheet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Exact decimal number
    Decimal(Decimal),

    /// Integer number
    Integer(i64),

    /// Text
    Text(String),

    /// Date and time without offset
    DateTime(NaiveDateTime),

    /// Date and time with a fixed UTC offset
    DateTimeOffset(DateTime<FixedOffset>),

    /// Formula text, stored without the leading `=`
    Formula(String),
}

impl CellValue {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Create a formula value (one leading `=` is stripped)
    pub fn formula<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        match text.strip_prefix('=') {
            Some(rest) => CellValue::Formula(rest.to_string()),
            None => CellValue::Formula(text),
        }
    }

    /// Create a decimal value from a float
    ///
    /// Fails for NaN, infinities and magnitudes a [`Decimal`] cannot hold.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::ValueOutOfRange(format!(
                "{} is not a finite number",
                value
            )));
        }
        Decimal::from_f64(value)
            .map(CellValue::Decimal)
            .ok_or_else(|| Error::ValueOutOfRange(format!("{} does not fit a decimal", value)))
    }

    /// Name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Decimal(_) => "decimal",
            CellValue::Integer(_) => "integer",
            CellValue::Text(_) => "text",
            CellValue::DateTime(_) => "datetime",
            CellValue::DateTimeOffset(_) => "datetime-offset",
            CellValue::Formula(_) => "formula",
        }
    }

    /// Check if the value is a date (with or without offset)
    pub fn is_date(&self) -> bool {
        matches!(self, CellValue::DateTime(_) | CellValue::DateTimeOffset(_))
    }

    /// Check if the value is numeric
    pub fn is_number(&self) -> bool {
        matches!(self, CellValue::Decimal(_) | CellValue::Integer(_))
    }

    /// Check if the value is a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula(_))
    }

    /// Get the text if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn not_for_formula(&self, expected: &'static str) -> Error {
        Error::InvalidValueType {
            expected,
            actual: self.type_name(),
        }
    }

    /// Coerce to a decimal
    ///
    /// Text that does not parse yields zero; dates yield their tick count.
    pub fn to_decimal(&self) -> Result<Decimal> {
        match self {
            CellValue::Decimal(d) => Ok(*d),
            CellValue::Integer(i) => Ok(Decimal::from(*i)),
            CellValue::Text(s) => Ok(parse_decimal(s).unwrap_or(Decimal::ZERO)),
            CellValue::DateTime(dt) => Ok(Decimal::from(date::to_ticks(*dt))),
            CellValue::DateTimeOffset(dt) => Ok(Decimal::from(date::to_ticks(dt.naive_local()))),
            CellValue::Formula(_) => Err(self.not_for_formula("number")),
        }
    }

    /// Coerce to a float
    pub fn to_f64(&self) -> Result<f64> {
        match self {
            CellValue::Decimal(d) => d
                .to_f64()
                .ok_or_else(|| Error::ValueOutOfRange(d.to_string())),
            CellValue::Integer(i) => Ok(*i as f64),
            CellValue::Text(s) => Ok(s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0)),
            CellValue::DateTime(dt) => Ok(date::to_ticks(*dt) as f64),
            CellValue::DateTimeOffset(dt) => Ok(date::to_ticks(dt.naive_local()) as f64),
            CellValue::Formula(_) => Err(self.not_for_formula("number")),
        }
    }

    /// Coerce to a 64-bit integer, truncating toward zero
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            CellValue::Integer(i) => Ok(*i),
            CellValue::DateTime(dt) => Ok(date::to_ticks(*dt)),
            CellValue::DateTimeOffset(dt) => Ok(date::to_ticks(dt.naive_local())),
            CellValue::Text(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    return Ok(i);
                }
                match parse_decimal(s) {
                    Some(d) => decimal_to_i64(d),
                    None => Ok(0),
                }
            }
            CellValue::Decimal(d) => decimal_to_i64(*d),
            CellValue::Formula(_) => Err(self.not_for_formula("number")),
        }
    }

    /// Coerce to a 32-bit integer, truncating toward zero
    pub fn to_i32(&self) -> Result<i32> {
        let wide = self.to_i64()?;
        i32::try_from(wide)
            .map_err(|_| Error::ValueOutOfRange(format!("{} does not fit in i32", wide)))
    }

    /// Render as text
    ///
    /// Dates use `YYYY-MM-DD hh:mm:ss`, offset dates RFC 3339, formulas their
    /// text without `=`.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Decimal(d) => d.to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            CellValue::DateTimeOffset(dt) => dt.to_rfc3339(),
            CellValue::Formula(f) => f.clone(),
        }
    }

    /// Coerce to a date-time
    ///
    /// Offset dates give their local clock time, numbers are read as ticks,
    /// and text that does not parse yields 0001-01-01T00:00:00.
    pub fn to_date_time(&self) -> Result<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Ok(*dt),
            CellValue::DateTimeOffset(dt) => Ok(dt.naive_local()),
            CellValue::Integer(_) | CellValue::Decimal(_) => {
                let ticks = self.to_i64()?;
                date::from_ticks(ticks).ok_or_else(|| {
                    Error::ValueOutOfRange(format!("{} ticks is not a valid date", ticks))
                })
            }
            CellValue::Text(s) => Ok(parse_date_time(s).unwrap_or_else(date::tick_epoch)),
            CellValue::Formula(_) => Err(self.not_for_formula("date")),
        }
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn decimal_to_i64(d: Decimal) -> Result<i64> {
    d.trunc()
        .to_i64()
        .ok_or_else(|| Error::ValueOutOfRange(format!("{} does not fit in i64", d)))
}

fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Formula(text) => write!(f, "={}", text),
            other => f.write_str(&other.to_text()),
        }
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Integer(v as i64)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Integer(v)
    }
}

impl From<Decimal> for CellValue {
    fn from(v: Decimal) -> Self {
        CellValue::Decimal(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::DateTime(d.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN))
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for CellValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        CellValue::DateTimeOffset(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_formula_strips_one_equals() {
        assert_eq!(CellValue::formula("=SUM(A1:A3)"), CellValue::Formula("SUM(A1:A3)".into()));
        assert_eq!(CellValue::formula("A1+1"), CellValue::Formula("A1+1".into()));
        assert_eq!(CellValue::formula("==A1"), CellValue::Formula("=A1".into()));
    }

    #[test]
    fn test_numeric_coercions() {
        let d = CellValue::Decimal(Decimal::new(-275, 2));
        assert_eq!(d.to_i64().unwrap(), -2);
        assert_eq!(d.to_f64().unwrap(), -2.75);
        assert_eq!(CellValue::Integer(7).to_decimal().unwrap(), Decimal::from(7));
        assert_eq!(CellValue::text(" 12.5 ").to_decimal().unwrap(), Decimal::new(125, 1));
        assert_eq!(CellValue::text("abc").to_decimal().unwrap(), Decimal::ZERO);
        assert_eq!(CellValue::text("abc").to_i32().unwrap(), 0);
        assert_eq!(CellValue::text("1e3").to_i64().unwrap(), 1000);
    }

    #[test]
    fn test_to_i32_out_of_range() {
        let big = CellValue::Integer(i64::from(i32::MAX) + 1);
        assert!(matches!(big.to_i32(), Err(Error::ValueOutOfRange(_))));
        assert_eq!(CellValue::Integer(-5).to_i32().unwrap(), -5);
    }

    #[test]
    fn test_formula_coercion_is_usage_error() {
        let f = CellValue::formula("=A1");
        assert!(matches!(
            f.to_decimal(),
            Err(Error::InvalidValueType { actual: "formula", .. })
        ));
        assert!(f.to_date_time().is_err());
        assert_eq!(f.to_text(), "A1");
        assert_eq!(f.to_string(), "=A1");
    }

    #[test]
    fn test_dates_coerce_to_ticks() {
        let v = CellValue::DateTime(dt(2000, 1, 1, 0, 0, 0));
        assert_eq!(v.to_i64().unwrap(), 630_822_816_000_000_000);

        let offset = FixedOffset::east_opt(3600).unwrap();
        let local = dt(2000, 1, 1, 0, 0, 0).and_local_timezone(offset).unwrap();
        assert_eq!(
            CellValue::DateTimeOffset(local).to_i64().unwrap(),
            630_822_816_000_000_000
        );
    }

    #[test]
    fn test_to_text() {
        assert_eq!(
            CellValue::DateTime(dt(2024, 1, 31, 13, 45, 0)).to_text(),
            "2024-01-31 13:45:00"
        );
        assert_eq!(CellValue::Integer(42).to_text(), "42");
        assert_eq!(CellValue::Decimal(Decimal::new(15, 1)).to_text(), "1.5");
    }

    #[test]
    fn test_to_date_time() {
        let expected = dt(2024, 1, 31, 13, 45, 0);
        assert_eq!(CellValue::text("2024-01-31 13:45:00").to_date_time().unwrap(), expected);
        assert_eq!(CellValue::text("2024-01-31T13:45:00").to_date_time().unwrap(), expected);
        assert_eq!(
            CellValue::text("2024-01-31T13:45:00+02:00").to_date_time().unwrap(),
            expected
        );
        assert_eq!(
            CellValue::text("2024-01-31").to_date_time().unwrap(),
            dt(2024, 1, 31, 0, 0, 0)
        );
        assert_eq!(
            CellValue::text("not a date").to_date_time().unwrap(),
            dt(1, 1, 1, 0, 0, 0)
        );
        let ticks = CellValue::Integer(630_822_816_000_000_000);
        assert_eq!(ticks.to_date_time().unwrap(), dt(2000, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(
            CellValue::from_f64(2.5).unwrap(),
            CellValue::Decimal(Decimal::new(25, 1))
        );
        assert!(CellValue::from_f64(f64::NAN).is_err());
        assert!(CellValue::from_f64(f64::INFINITY).is_err());
    }
}
