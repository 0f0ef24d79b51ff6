//! Registration form field schemas.
//!
//! Each event declares an ordered list of typed fields; submitted form data
//! is a JSON object validated against that schema before anything is
//! persisted. Unknown keys are rejected -- the stored `form_data` blob only
//! ever contains declared fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::phone::normalize_phone;

/// The type of a single form field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Phone,
    Email,
    Number,
    Select { options: Vec<String> },
}

/// One declared field of an event's registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

/// Validate submitted form data against an event's declared field schema.
///
/// Checks, in order: no undeclared keys, required fields present and
/// non-empty, values well-formed for their kind (phone numbers must
/// normalize, select values must be one of the declared options).
pub fn validate_form_data(
    schema: &[FormField],
    data: &serde_json::Map<String, Value>,
) -> Result<(), CoreError> {
    for key in data.keys() {
        if !schema.iter().any(|f| &f.name == key) {
            return Err(CoreError::Validation(format!(
                "unknown form field: {key}"
            )));
        }
    }

    for field in schema {
        match data.get(&field.name) {
            None | Some(Value::Null) => require_present(field)?,
            Some(Value::String(s)) if s.trim().is_empty() => require_present(field)?,
            Some(value) => validate_value(field, value)?,
        }
    }

    Ok(())
}

/// A missing or blank value is fine unless the field is required.
fn require_present(field: &FormField) -> Result<(), CoreError> {
    if field.required {
        return Err(CoreError::Validation(format!(
            "missing required field: {}",
            field.name
        )));
    }
    Ok(())
}

fn validate_value(field: &FormField, value: &Value) -> Result<(), CoreError> {
    match &field.kind {
        FieldKind::Text => match value {
            Value::String(_) => Ok(()),
            _ => Err(type_error(field, "a string")),
        },
        FieldKind::Phone => match value {
            Value::String(s) => normalize_phone(s).map(|_| ()),
            _ => Err(type_error(field, "a phone number string")),
        },
        FieldKind::Email => match value {
            Value::String(s) if looks_like_email(s) => Ok(()),
            _ => Err(type_error(field, "an email address")),
        },
        FieldKind::Number => match value {
            Value::Number(_) => Ok(()),
            _ => Err(type_error(field, "a number")),
        },
        FieldKind::Select { options } => match value {
            Value::String(s) if options.iter().any(|o| o == s) => Ok(()),
            Value::String(_) => Err(CoreError::Validation(format!(
                "field {} must be one of the declared options",
                field.name
            ))),
            _ => Err(type_error(field, "a string")),
        },
    }
}

fn type_error(field: &FormField, expected: &str) -> CoreError {
    CoreError::Validation(format!("field {} must be {expected}", field.name))
}

/// Minimal shape check; real deliverability is the notification
/// collaborator's problem.
fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn schema() -> Vec<FormField> {
        vec![
            FormField {
                name: "full_name".into(),
                label: "Full name".into(),
                kind: FieldKind::Text,
                required: true,
            },
            FormField {
                name: "phone".into(),
                label: "Phone".into(),
                kind: FieldKind::Phone,
                required: true,
            },
            FormField {
                name: "email".into(),
                label: "Email".into(),
                kind: FieldKind::Email,
                required: false,
            },
            FormField {
                name: "meal".into(),
                label: "Meal".into(),
                kind: FieldKind::Select {
                    options: vec!["meat".into(), "vegetarian".into()],
                },
                required: false,
            },
        ]
    }

    fn data(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn accepts_valid_submission() {
        let submitted = data(json!({
            "full_name": "Dana Levi",
            "phone": "050-123-4567",
            "meal": "vegetarian",
        }));
        validate_form_data(&schema(), &submitted).unwrap();
    }

    #[test]
    fn rejects_unknown_key() {
        let submitted = data(json!({
            "full_name": "Dana Levi",
            "phone": "0501234567",
            "favorite_color": "blue",
        }));
        assert_matches!(
            validate_form_data(&schema(), &submitted),
            Err(CoreError::Validation(msg)) if msg.contains("favorite_color")
        );
    }

    #[test]
    fn rejects_missing_required() {
        let submitted = data(json!({ "phone": "0501234567" }));
        assert_matches!(
            validate_form_data(&schema(), &submitted),
            Err(CoreError::Validation(msg)) if msg.contains("full_name")
        );
    }

    #[test]
    fn blank_string_counts_as_missing() {
        let submitted = data(json!({ "full_name": "   ", "phone": "0501234567" }));
        assert_matches!(
            validate_form_data(&schema(), &submitted),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_invalid_phone_value() {
        let submitted = data(json!({ "full_name": "Dana", "phone": "12345" }));
        assert_matches!(
            validate_form_data(&schema(), &submitted),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_select_value_outside_options() {
        let submitted = data(json!({
            "full_name": "Dana",
            "phone": "0501234567",
            "meal": "fish",
        }));
        assert_matches!(
            validate_form_data(&schema(), &submitted),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let submitted = data(json!({ "full_name": "Dana", "phone": "0501234567" }));
        validate_form_data(&schema(), &submitted).unwrap();
    }

    #[test]
    fn schema_round_trips_through_json() {
        let fields = schema();
        let encoded = serde_json::to_value(&fields).unwrap();
        let decoded: Vec<FormField> = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.len(), fields.len());
        assert_eq!(decoded[3].kind, fields[3].kind);
    }
}
