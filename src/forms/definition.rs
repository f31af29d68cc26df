//! Definition-time validation of CRF fields.
//!
//! Everything here runs before a field is persisted; a rejected definition
//! leaves the schema untouched.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use super::field_type::FieldType;
use crate::models::crf::{CrfFieldForm, CrfForm};
use crate::validate::{checkbox_checked, validate_code, validate_required};

pub const CHOICES_NOT_JSON: &str = "Choices must be valid JSON, e.g. [\"A\", \"B\"].";
pub const CHOICES_NOT_ARRAY: &str = "Choices must be a JSON array, e.g. [\"A\", \"B\"].";
pub const CHOICES_BAD_FORMAT: &str = "Invalid choices format. Use a JSON array, e.g. [\"A\", \"B\"].";

/// Keys the entry form posts alongside field values; a field may not share them.
pub const RESERVED_CODES: &[&str] = &["csrf_token"];

/// One rejected attribute of a schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaError {
    /// Attribute the message belongs to (`name`, `code`, `field_type`, `choices`, `order`).
    pub field: &'static str,
    pub message: String,
}

impl SchemaError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Raw field definition as submitted by the builder page or the JSON API.
///
/// `choices` and `order` stay loosely typed so both surfaces share one
/// validation path: the HTML form posts strings, the API may post a real
/// array or number.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub code: String,
    pub field_type: String,
    pub choices: Value,
    pub required: bool,
    pub order: Value,
}

/// A validated field definition, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCrfField {
    pub name: String,
    pub code: String,
    pub field_type: FieldType,
    pub choices: Option<Vec<String>>,
    pub required: bool,
    pub sort_order: i32,
}

impl From<&CrfFieldForm> for FieldDefinition {
    fn from(form: &CrfFieldForm) -> Self {
        Self {
            name: form.name.clone(),
            code: form.code.clone(),
            field_type: form.field_type.clone(),
            choices: form.choices.clone().map(Value::String).unwrap_or(Value::Null),
            required: checkbox_checked(form.required.as_deref()),
            order: form.order.clone().map(Value::String).unwrap_or(Value::Null),
        }
    }
}

/// Accepts three shapes: empty (stored as `None`), an already structured
/// list (items stringified), or a string holding a serialized list.
pub fn parse_choices(raw: &Value) -> Result<Option<Vec<String>>, SchemaError> {
    match raw {
        Value::Null => Ok(None),
        Value::Array(items) => Ok(Some(items.iter().map(stringify_choice).collect())),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => {
            let parsed: Value = serde_json::from_str(s.trim())
                .map_err(|_| SchemaError::new("choices", CHOICES_NOT_JSON))?;
            match parsed {
                Value::Array(items) => Ok(Some(items.iter().map(stringify_choice).collect())),
                _ => Err(SchemaError::new("choices", CHOICES_NOT_ARRAY)),
            }
        }
        _ => Err(SchemaError::new("choices", CHOICES_BAD_FORMAT)),
    }
}

fn stringify_choice(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_order(raw: &Value) -> Result<i32, SchemaError> {
    let n = match raw {
        Value::Null => return Ok(0),
        Value::String(s) if s.trim().is_empty() => return Ok(0),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| SchemaError::new("order", "Enter a whole number."))?,
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| SchemaError::new("order", "Enter a whole number."))?,
        _ => return Err(SchemaError::new("order", "Enter a whole number.")),
    };
    if n < 0 {
        return Err(SchemaError::new("order", "Ensure this value is greater than or equal to 0."));
    }
    i32::try_from(n)
        .map_err(|_| SchemaError::new("order", "Ensure this value is less than or equal to 2147483647."))
}

/// Validate every attribute of a field definition, collecting all problems.
pub fn validate_field_definition(def: &FieldDefinition) -> Result<NewCrfField, Vec<SchemaError>> {
    let mut errors = Vec::new();

    if let Some(msg) = validate_required(&def.name, "Name", 120) {
        errors.push(SchemaError::new("name", msg));
    }
    if let Some(msg) = validate_code(&def.code, "Code", 64, false) {
        errors.push(SchemaError::new("code", msg));
    } else if RESERVED_CODES.contains(&def.code.trim()) {
        errors.push(SchemaError::new(
            "code",
            format!("{} is reserved and cannot be used as a field code.", def.code.trim()),
        ));
    }

    let field_type = FieldType::from_tag(&def.field_type);
    if field_type.is_none() {
        errors.push(SchemaError::new(
            "field_type",
            format!(
                "Select a valid choice. {} is not one of the available choices.",
                def.field_type.trim()
            ),
        ));
    }

    let choices = parse_choices(&def.choices).map_err(|e| errors.push(e)).ok().flatten();
    let sort_order = parse_order(&def.order).map_err(|e| errors.push(e)).unwrap_or(0);

    match field_type {
        Some(field_type) if errors.is_empty() => {
            if field_type == FieldType::Choice && choices.as_ref().is_none_or(|c| c.is_empty()) {
                log::warn!(
                    "Choice field '{}' defined without choices; only blank answers will validate",
                    def.code.trim()
                );
            }
            Ok(NewCrfField {
                name: def.name.trim().to_string(),
                code: def.code.trim().to_string(),
                field_type,
                choices,
                required: def.required,
                sort_order,
            })
        }
        _ => Err(errors),
    }
}

/// Validated CRF creation input: `(name, is_active)`.
pub fn validate_crf_definition(form: &CrfForm) -> Result<(String, bool), Vec<SchemaError>> {
    match validate_required(&form.name, "Name", 120) {
        Some(msg) => Err(vec![SchemaError::new("name", msg)]),
        None => Ok((form.name.trim().to_string(), checkbox_checked(form.is_active.as_deref()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(choices: Value) -> FieldDefinition {
        FieldDefinition {
            name: "Clinical Status".to_string(),
            code: "status".to_string(),
            field_type: "choice".to_string(),
            choices,
            required: true,
            order: json!("1"),
        }
    }

    #[test]
    fn serialized_list_is_parsed() {
        assert_eq!(
            parse_choices(&json!("[\"A\",\"B\"]")),
            Ok(Some(vec!["A".to_string(), "B".to_string()]))
        );
    }

    #[test]
    fn bare_string_is_rejected() {
        let err = parse_choices(&json!("Never")).unwrap_err();
        assert_eq!(err.field, "choices");
        assert_eq!(err.message, CHOICES_NOT_JSON);
    }

    #[test]
    fn serialized_non_list_is_rejected() {
        let err = parse_choices(&json!("{\"a\": 1}")).unwrap_err();
        assert_eq!(err.message, CHOICES_NOT_ARRAY);
        let err = parse_choices(&json!("\"A\"")).unwrap_err();
        assert_eq!(err.message, CHOICES_NOT_ARRAY);
    }

    #[test]
    fn empty_input_is_none_but_empty_list_is_kept() {
        assert_eq!(parse_choices(&Value::Null), Ok(None));
        assert_eq!(parse_choices(&json!("")), Ok(None));
        assert_eq!(parse_choices(&json!("  ")), Ok(None));
        assert_eq!(parse_choices(&json!("[]")), Ok(Some(vec![])));
        assert_eq!(parse_choices(&json!([])), Ok(Some(vec![])));
    }

    #[test]
    fn structured_list_items_are_stringified() {
        assert_eq!(
            parse_choices(&json!(["A", 1, 2.5, true])),
            Ok(Some(vec!["A".to_string(), "1".to_string(), "2.5".to_string(), "true".to_string()]))
        );
        assert_eq!(parse_choices(&json!("[1, 2]")), Ok(Some(vec!["1".to_string(), "2".to_string()])));
    }

    #[test]
    fn other_shapes_are_rejected() {
        assert_eq!(parse_choices(&json!(5)).unwrap_err().message, CHOICES_BAD_FORMAT);
        assert_eq!(parse_choices(&json!({"a": "b"})).unwrap_err().message, CHOICES_BAD_FORMAT);
    }

    #[test]
    fn valid_definition_is_normalized() {
        let field = validate_field_definition(&definition(json!("[\"Stable\",\"Critical\"]"))).unwrap();
        assert_eq!(field.field_type, FieldType::Choice);
        assert_eq!(field.choices, Some(vec!["Stable".to_string(), "Critical".to_string()]));
        assert_eq!(field.sort_order, 1);
        assert!(field.required);
    }

    #[test]
    fn aliases_are_stored_canonically() {
        let mut def = definition(Value::Null);
        def.field_type = "int".to_string();
        assert_eq!(validate_field_definition(&def).unwrap().field_type, FieldType::Integer);
    }

    #[test]
    fn all_problems_are_reported_together() {
        let def = FieldDefinition {
            name: String::new(),
            code: "bad code".to_string(),
            field_type: "date".to_string(),
            choices: json!("Never"),
            required: false,
            order: json!("-1"),
        };
        let errors = validate_field_definition(&def).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "code", "field_type", "choices", "order"]);
    }

    #[test]
    fn form_control_keys_cannot_be_field_codes() {
        let mut def = definition(Value::Null);
        def.code = " csrf_token ".to_string();
        let errors = validate_field_definition(&def).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "code");
        assert!(errors[0].message.contains("reserved"));

        def.code = "csrf_token_2".to_string();
        assert!(validate_field_definition(&def).is_ok());
    }

    #[test]
    fn order_defaults_to_zero_and_accepts_numbers() {
        let mut def = definition(Value::Null);
        def.order = Value::Null;
        assert_eq!(validate_field_definition(&def).unwrap().sort_order, 0);
        def.order = json!(7);
        assert_eq!(validate_field_definition(&def).unwrap().sort_order, 7);
        def.order = json!("x");
        assert_eq!(validate_field_definition(&def).unwrap_err()[0].field, "order");
    }

    #[test]
    fn form_checkbox_maps_to_required() {
        let form = CrfFieldForm {
            name: "On Ventilation".to_string(),
            code: "on_vent".to_string(),
            field_type: "bool".to_string(),
            choices: Some(String::new()),
            required: None,
            order: Some("4".to_string()),
            csrf_token: String::new(),
        };
        let field = validate_field_definition(&FieldDefinition::from(&form)).unwrap();
        assert!(!field.required);
        assert_eq!(field.choices, None);
        assert_eq!(field.field_type, FieldType::Boolean);
    }

    #[test]
    fn crf_name_is_required() {
        let form = CrfForm { name: " ".to_string(), is_active: Some("on".to_string()), csrf_token: String::new() };
        assert_eq!(validate_crf_definition(&form).unwrap_err()[0].field, "name");
        let form = CrfForm { name: "Baseline CRF".to_string(), is_active: None, csrf_token: String::new() };
        assert_eq!(validate_crf_definition(&form), Ok(("Baseline CRF".to_string(), false)));
    }
}
