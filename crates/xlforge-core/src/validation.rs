//! Data validation
//!
//! Validation rules restrict the data that can be entered in a range of
//! cells. A sheet maps each [`CellRange`](crate::CellRange) to one
//! [`Validation`].
//!
//! ## Example
//!
//! ```rust
//! use xlforge_core::{CellRange, Validation, WorkSheet};
//!
//! let mut sheet = WorkSheet::new("Input").unwrap();
//! let validation = Validation::list(["Yes", "No", "Maybe"])
//!     .unwrap()
//!     .with_error_message("Invalid value", "Please select from the list");
//!
//! sheet
//!     .add_validation(CellRange::parse("A1:A10").unwrap(), validation)
//!     .unwrap();
//! ```

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Longest inline list accepted, measured on the comma-joined text
pub const MAX_LIST_LEN: usize = 255;

/// Data validation for a cell range
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validation {
    rule: ValidationRule,
    /// Allow blank/empty cells
    pub allow_blank: bool,

    /// Show input message when the cell is selected
    pub show_input_message: bool,
    pub prompt_title: Option<String>,
    pub prompt: Option<String>,

    /// Show error alert when invalid data is entered
    pub show_error_message: bool,
    pub error_style: ValidationErrorStyle,
    pub error_title: Option<String>,
    pub error: Option<String>,
}

impl Validation {
    /// Create a validation from a rule, checking the rule's invariants
    pub fn new(rule: ValidationRule) -> Result<Self> {
        rule.check()?;
        Ok(Self {
            rule,
            allow_blank: true,
            show_input_message: false,
            prompt_title: None,
            prompt: None,
            show_error_message: true,
            error_style: ValidationErrorStyle::Stop,
            error_title: None,
            error: None,
        })
    }

    /// Whole number constraint
    pub fn whole(operator: ValidationOperator, first: i64, second: Option<i64>) -> Result<Self> {
        Self::new(ValidationRule::Whole {
            operator,
            first,
            second,
        })
    }

    /// Decimal number constraint
    pub fn decimal(
        operator: ValidationOperator,
        first: Decimal,
        second: Option<Decimal>,
    ) -> Result<Self> {
        Self::new(ValidationRule::Decimal {
            operator,
            first,
            second,
        })
    }

    /// Date constraint
    pub fn date(
        operator: ValidationOperator,
        first: NaiveDateTime,
        second: Option<NaiveDateTime>,
    ) -> Result<Self> {
        Self::new(ValidationRule::Date {
            operator,
            first,
            second,
        })
    }

    /// Text length constraint
    pub fn text_length(
        operator: ValidationOperator,
        first: u32,
        second: Option<u32>,
    ) -> Result<Self> {
        Self::new(ValidationRule::TextLength {
            operator,
            first,
            second,
        })
    }

    /// Dropdown list of allowed values
    pub fn list<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ValidationRule::List(
            items.into_iter().map(Into::into).collect(),
        ))
    }

    /// Custom formula that evaluates to TRUE for valid input
    pub fn custom(formula: impl Into<String>) -> Result<Self> {
        let formula = formula.into();
        let formula = formula.strip_prefix('=').unwrap_or(&formula).to_string();
        Self::new(ValidationRule::Custom(formula))
    }

    pub fn rule(&self) -> &ValidationRule {
        &self.rule
    }

    /// Set whether blank cells are allowed
    pub fn with_allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    /// Set an input message (shown when cell is selected)
    pub fn with_prompt(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.show_input_message = true;
        self.prompt_title = Some(title.into());
        self.prompt = Some(message.into());
        self
    }

    /// Set an error message (shown when invalid data entered)
    pub fn with_error_message(
        mut self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.show_error_message = true;
        self.error_title = Some(title.into());
        self.error = Some(message.into());
        self
    }

    /// Set the error style
    pub fn with_error_style(mut self, style: ValidationErrorStyle) -> Self {
        self.error_style = style;
        self
    }
}

/// What a validation checks
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationRule {
    Whole {
        operator: ValidationOperator,
        first: i64,
        second: Option<i64>,
    },
    Decimal {
        operator: ValidationOperator,
        first: Decimal,
        second: Option<Decimal>,
    },
    Date {
        operator: ValidationOperator,
        first: NaiveDateTime,
        second: Option<NaiveDateTime>,
    },
    TextLength {
        operator: ValidationOperator,
        first: u32,
        second: Option<u32>,
    },
    /// Inline list of allowed values
    List(Vec<String>),
    /// Formula without the leading `=`
    Custom(String),
}

impl ValidationRule {
    /// OOXML `type` attribute value
    pub fn xlsx_type(&self) -> &'static str {
        match self {
            ValidationRule::Whole { .. } => "whole",
            ValidationRule::Decimal { .. } => "decimal",
            ValidationRule::Date { .. } => "date",
            ValidationRule::TextLength { .. } => "textLength",
            ValidationRule::List(_) => "list",
            ValidationRule::Custom(_) => "custom",
        }
    }

    /// Comparison operator, for the rules that have one
    pub fn operator(&self) -> Option<ValidationOperator> {
        match self {
            ValidationRule::Whole { operator, .. }
            | ValidationRule::Decimal { operator, .. }
            | ValidationRule::Date { operator, .. }
            | ValidationRule::TextLength { operator, .. } => Some(*operator),
            ValidationRule::List(_) | ValidationRule::Custom(_) => None,
        }
    }

    fn has_second(&self) -> bool {
        match self {
            ValidationRule::Whole { second, .. } => second.is_some(),
            ValidationRule::Decimal { second, .. } => second.is_some(),
            ValidationRule::Date { second, .. } => second.is_some(),
            ValidationRule::TextLength { second, .. } => second.is_some(),
            ValidationRule::List(_) | ValidationRule::Custom(_) => true,
        }
    }

    fn check(&self) -> Result<()> {
        if let Some(op) = self.operator() {
            if op.requires_two_values() && !self.has_second() {
                return Err(Error::InvalidValidation(format!(
                    "operator {} needs a second value",
                    op.xlsx_operator()
                )));
            }
        }

        match self {
            ValidationRule::List(items) => {
                if items.is_empty() {
                    return Err(Error::InvalidValidation("list is empty".into()));
                }
                for item in items {
                    if item.is_empty() {
                        return Err(Error::InvalidValidation("list item is empty".into()));
                    }
                    if item.contains(',') || item.contains('"') {
                        return Err(Error::InvalidValidation(format!(
                            "list item '{}' contains ',' or '\"'",
                            item
                        )));
                    }
                }
                let joined = items.iter().map(|i| i.chars().count()).sum::<usize>() + items.len() - 1;
                if joined > MAX_LIST_LEN {
                    return Err(Error::InvalidValidation(format!(
                        "list is {} characters long (max {})",
                        joined, MAX_LIST_LEN
                    )));
                }
            }
            ValidationRule::Custom(formula) if formula.trim().is_empty() => {
                return Err(Error::InvalidValidation("formula is empty".into()));
            }
            _ => {}
        }
        Ok(())
    }
}

/// Comparison operators for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationOperator {
    /// Value must be between first and second
    #[default]
    Between,
    NotBetween,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl ValidationOperator {
    /// Get the XLSX operator string
    pub fn xlsx_operator(&self) -> &'static str {
        match self {
            ValidationOperator::Between => "between",
            ValidationOperator::NotBetween => "notBetween",
            ValidationOperator::Equal => "equal",
            ValidationOperator::NotEqual => "notEqual",
            ValidationOperator::GreaterThan => "greaterThan",
            ValidationOperator::LessThan => "lessThan",
            ValidationOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            ValidationOperator::LessThanOrEqual => "lessThanOrEqual",
        }
    }

    /// Parse from XLSX operator string
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "between" => Some(ValidationOperator::Between),
            "notBetween" => Some(ValidationOperator::NotBetween),
            "equal" => Some(ValidationOperator::Equal),
            "notEqual" => Some(ValidationOperator::NotEqual),
            "greaterThan" => Some(ValidationOperator::GreaterThan),
            "lessThan" => Some(ValidationOperator::LessThan),
            "greaterThanOrEqual" => Some(ValidationOperator::GreaterThanOrEqual),
            "lessThanOrEqual" => Some(ValidationOperator::LessThanOrEqual),
            _ => None,
        }
    }

    /// Check if this operator requires two values
    pub fn requires_two_values(&self) -> bool {
        matches!(
            self,
            ValidationOperator::Between | ValidationOperator::NotBetween
        )
    }
}

/// Error alert styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationErrorStyle {
    /// Reject invalid data (default)
    #[default]
    Stop,
    /// Warn but allow
    Warning,
    /// Just inform
    Information,
}

impl ValidationErrorStyle {
    /// Get the XLSX error style string
    pub fn xlsx_style(&self) -> &'static str {
        match self {
            ValidationErrorStyle::Stop => "stop",
            ValidationErrorStyle::Warning => "warning",
            ValidationErrorStyle::Information => "information",
        }
    }

    /// Parse from XLSX style string
    pub fn from_xlsx(s: &str) -> Option<Self> {
        match s {
            "stop" => Some(ValidationErrorStyle::Stop),
            "warning" => Some(ValidationErrorStyle::Warning),
            "information" => Some(ValidationErrorStyle::Information),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_validation() {
        let v = Validation::list(["Yes", "No", "Maybe"]).unwrap();
        assert_eq!(
            v.rule(),
            &ValidationRule::List(vec!["Yes".into(), "No".into(), "Maybe".into()])
        );
        assert!(v.allow_blank);
        assert!(v.show_error_message);
    }

    #[test]
    fn test_list_item_rules() {
        assert!(Validation::list(Vec::<String>::new()).is_err());
        assert!(Validation::list(["a", ""]).is_err());
        assert!(Validation::list(["a,b"]).is_err());
        assert!(Validation::list(["say \"hi\""]).is_err());

        let long = "x".repeat(128);
        assert!(Validation::list([long.as_str(), long.as_str()]).is_err());
        let fits = "x".repeat(127);
        assert!(Validation::list([fits.as_str(), fits.as_str()]).is_ok());
    }

    #[test]
    fn test_between_requires_second() {
        assert!(matches!(
            Validation::whole(ValidationOperator::Between, 1, None),
            Err(Error::InvalidValidation(_))
        ));
        assert!(Validation::text_length(ValidationOperator::NotBetween, 1, None).is_err());
        let v = Validation::whole(ValidationOperator::Between, 1, Some(100)).unwrap();
        assert_eq!(v.rule().operator(), Some(ValidationOperator::Between));
        assert!(Validation::whole(ValidationOperator::GreaterThan, 0, None).is_ok());
    }

    #[test]
    fn test_with_messages() {
        let v = Validation::list(["A", "B", "C"])
            .unwrap()
            .with_prompt("Choose", "Select a value from the list")
            .with_error_message("Error", "Invalid selection")
            .with_error_style(ValidationErrorStyle::Warning);

        assert!(v.show_input_message);
        assert_eq!(v.prompt_title.as_deref(), Some("Choose"));
        assert_eq!(v.prompt.as_deref(), Some("Select a value from the list"));
        assert_eq!(v.error_title.as_deref(), Some("Error"));
        assert_eq!(v.error.as_deref(), Some("Invalid selection"));
        assert_eq!(v.error_style, ValidationErrorStyle::Warning);
    }

    #[test]
    fn test_custom_strips_equals() {
        let v = Validation::custom("=MOD(A1,5)=0").unwrap();
        assert_eq!(v.rule(), &ValidationRule::Custom("MOD(A1,5)=0".into()));
        assert!(Validation::custom("=").is_err());
    }

    #[test]
    fn test_operator_xlsx_strings() {
        assert_eq!(ValidationOperator::Between.xlsx_operator(), "between");
        assert_eq!(
            ValidationOperator::from_xlsx("lessThanOrEqual"),
            Some(ValidationOperator::LessThanOrEqual)
        );
        assert_eq!(ValidationOperator::from_xlsx("sideways"), None);
    }
}
