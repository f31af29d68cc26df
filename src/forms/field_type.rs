//! Field type registry.
//!
//! Each supported CRF field type knows how to clean a raw submitted value,
//! which input control renders it, and how its cleaned value is stored.
//!
//! Raw input contract:
//! - A value is *absent* when its key is missing from the submission or the
//!   value is empty after trimming surrounding whitespace.
//! - `boolean` never reports absence: missing, empty, `false`, `0` and `off`
//!   (any case) mean false, anything else means true. It is never blocked by
//!   the required flag.
//! - Absent values of every other type are `None` when optional and fail with
//!   [`REQUIRED_MESSAGE`] when required.

use serde::{Deserialize, Serialize};

use crate::validate::checkbox_checked;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const WHOLE_NUMBER_MESSAGE: &str = "Enter a whole number.";
pub const NUMBER_MESSAGE: &str = "Enter a number.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Choice,
}

/// Render hint handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Number,
    Decimal,
    Checkbox,
    Select,
}

/// A cleaned, typed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Choice(String),
}

impl FieldType {
    pub const ALL: [FieldType; 5] = [
        FieldType::Text,
        FieldType::Integer,
        FieldType::Float,
        FieldType::Boolean,
        FieldType::Choice,
    ];

    /// Canonical tag, as stored in `crf_fields.field_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Choice => "choice",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Integer => "Integer",
            FieldType::Float => "Float",
            FieldType::Boolean => "Boolean",
            FieldType::Choice => "Choice",
        }
    }

    /// Look up a type by tag. Accepts the short `int` / `bool` aliases.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "text" => Some(FieldType::Text),
            "integer" | "int" => Some(FieldType::Integer),
            "float" => Some(FieldType::Float),
            "boolean" | "bool" => Some(FieldType::Boolean),
            "choice" => Some(FieldType::Choice),
            _ => None,
        }
    }

    pub fn input_kind(&self) -> InputKind {
        match self {
            FieldType::Text => InputKind::Text,
            FieldType::Integer => InputKind::Number,
            FieldType::Float => InputKind::Decimal,
            FieldType::Boolean => InputKind::Checkbox,
            FieldType::Choice => InputKind::Select,
        }
    }

    /// Whether the required flag can block a submission for this type.
    pub fn honours_required(&self) -> bool {
        !matches!(self, FieldType::Boolean)
    }

    /// Clean one raw value.
    ///
    /// `Ok(None)` means "no answer". `choices` is only consulted for
    /// [`FieldType::Choice`], where membership is enforced strictly.
    pub fn clean(
        &self,
        raw: Option<&str>,
        required: bool,
        choices: &[String],
    ) -> Result<Option<FieldValue>, String> {
        if let FieldType::Boolean = self {
            return Ok(Some(FieldValue::Boolean(checkbox_checked(raw))));
        }

        let value = match raw.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => v,
            None if required => return Err(REQUIRED_MESSAGE.to_string()),
            None => return Ok(None),
        };

        let cleaned = match self {
            FieldType::Text => FieldValue::Text(value.to_string()),
            FieldType::Integer => {
                FieldValue::Integer(parse_whole_number(value).ok_or(WHOLE_NUMBER_MESSAGE)?)
            }
            FieldType::Float => FieldValue::Float(parse_number(value).ok_or(NUMBER_MESSAGE)?),
            FieldType::Choice => {
                if !choices.iter().any(|c| c == value) {
                    return Err(format!(
                        "Select a valid choice. {value} is not one of the available choices."
                    ));
                }
                FieldValue::Choice(value.to_string())
            }
            FieldType::Boolean => FieldValue::Boolean(checkbox_checked(Some(value))),
        };
        Ok(Some(cleaned))
    }
}

impl FieldValue {
    /// Canonical stored text. Empty text normalizes to `None`.
    pub fn normalize(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) | FieldValue::Choice(s) => {
                if s.is_empty() {
                    None
                } else {
                    Some(s.clone())
                }
            }
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::Float(x) => Some(format_float(*x)),
            FieldValue::Boolean(b) => Some(if *b { "true" } else { "false" }.to_string()),
        }
    }
}

impl InputKind {
    /// `type` attribute of the `<input>` element; `select` is rendered separately.
    pub fn html_type(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Number | InputKind::Decimal => "number",
            InputKind::Checkbox => "checkbox",
            InputKind::Select => "select",
        }
    }

    pub fn step(&self) -> Option<&'static str> {
        match self {
            InputKind::Number => Some("1"),
            InputKind::Decimal => Some("any"),
            _ => None,
        }
    }
}

/// Base-10 integer with optional sign. A trailing all-zero fraction
/// (`"42.0"`, `"42."`) still counts as a whole number.
fn parse_whole_number(value: &str) -> Option<i64> {
    let digits = match value.find('.') {
        Some(dot) if value[dot + 1..].chars().all(|c| c == '0') => &value[..dot],
        Some(_) => return None,
        None => value,
    };
    digits.parse::<i64>().ok()
}

fn parse_number(value: &str) -> Option<f64> {
    // f64::from_str also accepts "inf" and "NaN"; those are not clinical values.
    value.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Shortest round-tripping form that always reads as a float: `37` becomes
/// `"37.0"` and `1e16` stays in exponent form instead of a bare digit string.
fn format_float(x: f64) -> String {
    format!("{x:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> Vec<String> {
        vec!["Stable".to_string(), "Critical".to_string()]
    }

    #[test]
    fn tags_round_trip_and_accept_aliases() {
        for ty in FieldType::ALL {
            assert_eq!(FieldType::from_tag(ty.as_str()), Some(ty));
        }
        assert_eq!(FieldType::from_tag("int"), Some(FieldType::Integer));
        assert_eq!(FieldType::from_tag(" BOOL "), Some(FieldType::Boolean));
        assert_eq!(FieldType::from_tag("date"), None);
    }

    #[test]
    fn integer_accepts_whole_numbers_only() {
        let ty = FieldType::Integer;
        assert_eq!(ty.clean(Some("42"), true, &[]), Ok(Some(FieldValue::Integer(42))));
        assert_eq!(ty.clean(Some(" -7 "), true, &[]), Ok(Some(FieldValue::Integer(-7))));
        assert_eq!(ty.clean(Some("42.00"), true, &[]), Ok(Some(FieldValue::Integer(42))));
        assert_eq!(ty.clean(Some("abc"), true, &[]), Err(WHOLE_NUMBER_MESSAGE.to_string()));
        assert_eq!(ty.clean(Some("4.5"), false, &[]), Err(WHOLE_NUMBER_MESSAGE.to_string()));
        assert_eq!(FieldValue::Integer(42).normalize(), Some("42".to_string()));
    }

    #[test]
    fn whole_number_error_mentions_whole_number() {
        let err = FieldType::Integer.clean(Some("abc"), false, &[]).unwrap_err();
        assert!(err.contains("whole number"));
    }

    #[test]
    fn float_parses_and_normalizes() {
        let ty = FieldType::Float;
        assert_eq!(ty.clean(Some("37.5"), false, &[]), Ok(Some(FieldValue::Float(37.5))));
        assert_eq!(ty.clean(Some("x"), false, &[]), Err(NUMBER_MESSAGE.to_string()));
        assert_eq!(ty.clean(Some("NaN"), false, &[]), Err(NUMBER_MESSAGE.to_string()));
        assert_eq!(ty.clean(Some("inf"), false, &[]), Err(NUMBER_MESSAGE.to_string()));
        assert_eq!(FieldValue::Float(37.5).normalize(), Some("37.5".to_string()));
        assert_eq!(FieldValue::Float(37.0).normalize(), Some("37.0".to_string()));
        assert_eq!(FieldValue::Float(-0.25).normalize(), Some("-0.25".to_string()));
    }

    #[test]
    fn large_integral_float_never_normalizes_to_bare_digits() {
        for x in [1e15, 1e16, 2.5e17, -1e20] {
            let stored = FieldValue::Float(x).normalize().unwrap();
            assert!(stored.contains(['.', 'e']), "{stored} reads back as an integer");
            assert_eq!(stored.parse::<f64>(), Ok(x));
        }
        let ty = FieldType::Float;
        assert_eq!(ty.clean(Some("10000000000000000"), false, &[]), Ok(Some(FieldValue::Float(1e16))));
        assert_eq!(FieldValue::Float(1e16).normalize(), Some("1e16".to_string()));
    }

    #[test]
    fn boolean_never_fails_and_defaults_false() {
        let ty = FieldType::Boolean;
        assert_eq!(ty.clean(None, true, &[]), Ok(Some(FieldValue::Boolean(false))));
        assert_eq!(ty.clean(Some(""), true, &[]), Ok(Some(FieldValue::Boolean(false))));
        assert_eq!(ty.clean(Some("on"), false, &[]), Ok(Some(FieldValue::Boolean(true))));
        assert_eq!(FieldValue::Boolean(false).normalize(), Some("false".to_string()));
        assert_eq!(FieldValue::Boolean(true).normalize(), Some("true".to_string()));
        assert!(!ty.honours_required());
    }

    #[test]
    fn choice_enforces_membership() {
        let ty = FieldType::Choice;
        assert_eq!(
            ty.clean(Some("Stable"), false, &choices()),
            Ok(Some(FieldValue::Choice("Stable".to_string())))
        );
        let err = ty.clean(Some("Unknown"), false, &choices()).unwrap_err();
        assert!(err.contains("not one of the available choices"));
        assert!(ty.clean(Some("stable"), false, &choices()).is_err());
        assert!(ty.clean(Some("Stable"), false, &[]).is_err());
        assert_eq!(FieldValue::Choice("Stable".to_string()).normalize(), Some("Stable".to_string()));
    }

    #[test]
    fn absent_values_respect_required_flag() {
        for ty in [FieldType::Text, FieldType::Integer, FieldType::Float, FieldType::Choice] {
            assert_eq!(ty.clean(None, false, &choices()), Ok(None));
            assert_eq!(ty.clean(Some("   "), false, &choices()), Ok(None));
            assert_eq!(ty.clean(None, true, &choices()), Err(REQUIRED_MESSAGE.to_string()));
            assert_eq!(ty.clean(Some(""), true, &choices()), Err(REQUIRED_MESSAGE.to_string()));
        }
    }

    #[test]
    fn text_is_trimmed_and_empty_text_normalizes_to_none() {
        assert_eq!(
            FieldType::Text.clean(Some("  fever "), false, &[]),
            Ok(Some(FieldValue::Text("fever".to_string())))
        );
        assert_eq!(FieldValue::Text(String::new()).normalize(), None);
    }

    #[test]
    fn input_kinds() {
        assert_eq!(FieldType::Integer.input_kind().html_type(), "number");
        assert_eq!(FieldType::Integer.input_kind().step(), Some("1"));
        assert_eq!(FieldType::Float.input_kind().step(), Some("any"));
        assert_eq!(FieldType::Boolean.input_kind(), InputKind::Checkbox);
        assert_eq!(FieldType::Choice.input_kind(), InputKind::Select);
    }
}
