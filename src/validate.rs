use chrono::{NaiveDate, NaiveDateTime};

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate a machine code: 1-`max_len` chars of letters, digits, underscore or dash.
pub fn validate_code(value: &str, field_name: &str, max_len: usize, allow_dash: bool) -> Option<String> {
    if let Some(err) = validate_required(value, field_name, max_len) {
        return Some(err);
    }
    let ok = value
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || (allow_dash && c == '-'));
    if !ok {
        let allowed = if allow_dash {
            "letters, numbers, underscores and dashes"
        } else {
            "letters, numbers and underscores"
        };
        return Some(format!("{field_name} may only contain {allowed}"));
    }
    None
}

/// Parse an HTML `date` input (`YYYY-MM-DD`).
pub fn parse_date(value: &str, field_name: &str) -> Result<NaiveDate, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field_name} is required"));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| format!("{field_name} must be a valid date (YYYY-MM-DD)"))
}

/// Parse an HTML `datetime-local` input (`YYYY-MM-DDTHH:MM`, seconds optional).
pub fn parse_datetime_local(value: &str, field_name: &str) -> Result<NaiveDateTime, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field_name} is required"));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| format!("{field_name} must be a valid date and time"))
}

/// HTML checkbox semantics: a missing key, an empty value, or an explicit
/// "false"/"0"/"off" (any case) is unchecked; any other value is checked.
pub fn checkbox_checked(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None | Some("") => false,
        Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "off"),
    }
}
