//! Schema Validator — checks a free-form section payload against its
//! declared `SectionSchema` before it is persisted.
//!
//! Contract: never panics on malformed input, never stops at the first
//! problem. Every failing field is reported so the client can fix a form
//! in one round trip. Payloads that pass are carried internally as
//! already-validated values and are not re-checked downstream.

use serde_json::Value;
use url::Url;

use crate::assets::is_asset_url;
use crate::errors::FieldViolation;
use crate::schema::{FieldSpec, FieldType, SchemaKind, SectionSchema};

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<FieldViolation>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<FieldViolation>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates `data` against `schema`, collecting every violation.
pub fn validate(data: &Value, schema: &SectionSchema) -> ValidationResult {
    let mut errors = Vec::new();

    match schema.kind {
        SchemaKind::Singleton => {
            validate_object(data, &schema.fields, "", &mut errors);
        }
        SchemaKind::Repeatable => match data.as_array() {
            Some(items) => {
                if let Some(min) = schema.min_items {
                    if items.len() < min {
                        errors.push(violation(
                            "",
                            format!("expected at least {min} item(s), got {}", items.len()),
                        ));
                    }
                }
                if let Some(max) = schema.max_items {
                    if items.len() > max {
                        errors.push(violation(
                            "",
                            format!("expected at most {max} item(s), got {}", items.len()),
                        ));
                    }
                }
                for (i, item) in items.iter().enumerate() {
                    validate_object(item, &schema.fields, &format!("[{i}]."), &mut errors);
                }
            }
            None => {
                errors.push(violation("", "expected an array of items".to_string()));
            }
        },
    }

    ValidationResult::from_errors(errors)
}

fn violation(field: &str, message: String) -> FieldViolation {
    FieldViolation {
        field: field.to_string(),
        message,
    }
}

fn validate_object(
    value: &Value,
    fields: &[FieldSpec],
    path: &str,
    errors: &mut Vec<FieldViolation>,
) {
    let obj = match value.as_object() {
        Some(o) => o,
        None => {
            errors.push(violation(path.trim_end_matches('.'), "expected an object".to_string()));
            return;
        }
    };

    for spec in fields {
        let field_path = format!("{path}{}", spec.name);
        match obj.get(&spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    errors.push(violation(&field_path, "required field is missing".to_string()));
                }
            }
            Some(v) => validate_field(v, spec, &field_path, errors),
        }
    }
}

fn validate_field(value: &Value, spec: &FieldSpec, path: &str, errors: &mut Vec<FieldViolation>) {
    match spec.field_type {
        FieldType::String | FieldType::LongText => {
            if !value.is_string() {
                errors.push(violation(path, "expected a string".to_string()));
            }
        }
        FieldType::Url => match value.as_str() {
            Some(s) if Url::parse(s).is_ok() => {}
            Some(_) => errors.push(violation(path, "expected an absolute URL".to_string())),
            None => errors.push(violation(path, "expected a URL string".to_string())),
        },
        FieldType::Date => match value.as_str() {
            Some(s) if is_valid_date(s) => {}
            Some(s) => errors.push(violation(
                path,
                format!("invalid date '{s}': expected YYYY-MM or YYYY-MM-DD"),
            )),
            None => errors.push(violation(path, "expected a date string".to_string())),
        },
        FieldType::Number => {
            if !value.is_number() {
                errors.push(violation(path, "expected a number".to_string()));
            }
        }
        FieldType::Boolean => {
            if !value.is_boolean() {
                errors.push(violation(path, "expected a boolean".to_string()));
            }
        }
        FieldType::StringArray => match value.as_array() {
            Some(items) if items.iter().all(Value::is_string) => {}
            Some(_) => errors.push(violation(path, "expected an array of strings".to_string())),
            None => errors.push(violation(path, "expected an array of strings".to_string())),
        },
        FieldType::Image => match value.as_str() {
            Some(s) if is_asset_url(s) => {}
            Some(_) => errors.push(violation(
                path,
                "expected an asset-storage image URL".to_string(),
            )),
            None => errors.push(violation(path, "expected an image URL string".to_string())),
        },
        FieldType::NestedObject => match spec.fields.as_deref() {
            Some(nested) => validate_object(value, nested, &format!("{path}."), errors),
            // A nested field with no declared shape cannot be checked;
            // treat it as an opaque object requirement.
            None => {
                if !value.is_object() {
                    errors.push(violation(path, "expected an object".to_string()));
                }
            }
        },
        // Fail closed: a field type this build does not recognize never
        // validates, rather than silently letting arbitrary data through.
        FieldType::Unknown => {
            errors.push(violation(path, "field has an unknown declared type".to_string()));
        }
    }
}

/// Accepts `YYYY-MM` and `YYYY-MM-DD` with plausible month/day ranges.
fn is_valid_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);

    let (month_ok, day_ok) = match bytes.len() {
        7 => {
            if !(digits(0..4) && bytes[4] == b'-' && digits(5..7)) {
                return false;
            }
            (parse2(bytes, 5), true)
        }
        10 => {
            if !(digits(0..4) && bytes[4] == b'-' && digits(5..7) && bytes[7] == b'-' && digits(8..10))
            {
                return false;
            }
            (parse2(bytes, 5), parse2_day(bytes, 8))
        }
        _ => return false,
    };
    month_ok && day_ok
}

fn parse2(bytes: &[u8], at: usize) -> bool {
    let v = (bytes[at] - b'0') * 10 + (bytes[at + 1] - b'0');
    (1..=12).contains(&v)
}

fn parse2_day(bytes: &[u8], at: usize) -> bool {
    let v = (bytes[at] - b'0') * 10 + (bytes[at + 1] - b'0');
    (1..=31).contains(&v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SectionSchema;
    use serde_json::json;

    fn experience_schema() -> SectionSchema {
        SectionSchema::repeatable(
            vec![
                FieldSpec::new("company", "Company", FieldType::String).required(),
                FieldSpec::new("title", "Job Title", FieldType::String).required(),
                FieldSpec::new("start_date", "Start Date", FieldType::Date),
                FieldSpec::new("url", "Company URL", FieldType::Url),
                FieldSpec::new("highlights", "Highlights", FieldType::StringArray),
                FieldSpec::new("current", "Current Role", FieldType::Boolean),
            ],
            0,
            20,
        )
    }

    #[test]
    fn test_valid_repeatable_payload() {
        let data = json!([{
            "company": "Acme",
            "title": "Eng",
            "start_date": "2022-04",
            "url": "https://acme.example.com",
            "highlights": ["shipped things"],
            "current": true,
        }]);
        let r = validate(&data, &experience_schema());
        assert!(r.valid, "unexpected errors: {:?}", r.errors);
    }

    #[test]
    fn test_two_missing_required_fields_yield_two_errors() {
        let data = json!([{ "start_date": "2022-04" }]);
        let r = validate(&data, &experience_schema());
        assert!(!r.valid);
        assert_eq!(r.errors.len(), 2);
        let fields: Vec<&str> = r.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"[0].company"));
        assert!(fields.contains(&"[0].title"));
    }

    #[test]
    fn test_slash_date_rejected_and_names_the_field() {
        let data = json!([{ "company": "Acme", "title": "Eng", "start_date": "2024/01" }]);
        let r = validate(&data, &experience_schema());
        assert!(!r.valid);
        assert!(r.errors.iter().any(|e| e.field.contains("start_date")));
    }

    #[test]
    fn test_repeatable_rejects_non_array() {
        let data = json!({ "company": "Acme" });
        let r = validate(&data, &experience_schema());
        assert!(!r.valid);
        assert!(r.errors[0].message.contains("array"));
    }

    #[test]
    fn test_max_items_enforced() {
        let schema = SectionSchema::repeatable(
            vec![FieldSpec::new("v", "V", FieldType::Number)],
            0,
            2,
        );
        let data = json!([{ "v": 1 }, { "v": 2 }, { "v": 3 }]);
        let r = validate(&data, &schema);
        assert!(!r.valid);
        assert!(r.errors[0].message.contains("at most 2"));
    }

    #[test]
    fn test_min_items_enforced() {
        let schema = SectionSchema::repeatable(
            vec![FieldSpec::new("v", "V", FieldType::Number)],
            1,
            10,
        );
        let r = validate(&json!([]), &schema);
        assert!(!r.valid);
        assert!(r.errors[0].message.contains("at least 1"));
    }

    #[test]
    fn test_singleton_validates_object() {
        let schema = SectionSchema::singleton(vec![
            FieldSpec::new("name", "Name", FieldType::String).required(),
            FieldSpec::new("age", "Age", FieldType::Number),
        ]);
        assert!(validate(&json!({ "name": "Jane", "age": 34 }), &schema).valid);
        assert!(!validate(&json!({ "age": "old" }), &schema).valid);
    }

    #[test]
    fn test_all_violations_collected_not_just_first() {
        let schema = SectionSchema::singleton(vec![
            FieldSpec::new("a", "A", FieldType::Number),
            FieldSpec::new("b", "B", FieldType::Boolean),
            FieldSpec::new("c", "C", FieldType::StringArray),
        ]);
        let r = validate(&json!({ "a": "x", "b": "y", "c": "z" }), &schema);
        assert_eq!(r.errors.len(), 3);
    }

    #[test]
    fn test_nested_object_recurses_with_path() {
        let schema = SectionSchema::singleton(vec![FieldSpec::new(
            "address",
            "Address",
            FieldType::NestedObject,
        )
        .nested(vec![
            FieldSpec::new("city", "City", FieldType::String).required(),
        ])]);
        let r = validate(&json!({ "address": { "zip": "94110" } }), &schema);
        assert!(!r.valid);
        assert_eq!(r.errors[0].field, "address.city");
    }

    #[test]
    fn test_relative_url_rejected() {
        let schema = SectionSchema::singleton(vec![FieldSpec::new("url", "URL", FieldType::Url)]);
        assert!(!validate(&json!({ "url": "/profile/jane" }), &schema).valid);
        assert!(validate(&json!({ "url": "https://example.com/jane" }), &schema).valid);
    }

    #[test]
    fn test_unknown_field_type_fails_closed() {
        let schema = SectionSchema::singleton(vec![FieldSpec::new(
            "mystery",
            "Mystery",
            FieldType::Unknown,
        )]);
        let r = validate(&json!({ "mystery": "anything" }), &schema);
        assert!(!r.valid);
        assert!(r.errors[0].message.contains("unknown"));
    }

    #[test]
    fn test_optional_missing_field_is_fine() {
        let schema = SectionSchema::singleton(vec![
            FieldSpec::new("name", "Name", FieldType::String).required(),
            FieldSpec::new("photo", "Photo", FieldType::Image),
        ]);
        assert!(validate(&json!({ "name": "Jane" }), &schema).valid);
    }

    #[test]
    fn test_image_must_match_asset_url_pattern() {
        let schema =
            SectionSchema::singleton(vec![FieldSpec::new("photo", "Photo", FieldType::Image)]);
        let ok = json!({ "photo": "https://cdn.example.com/assets/images/u1/pic.png" });
        let bad = json!({ "photo": "https://elsewhere.example.com/pic.png" });
        assert!(validate(&ok, &schema).valid);
        assert!(!validate(&bad, &schema).valid);
    }

    #[test]
    fn test_date_edge_cases() {
        assert!(is_valid_date("2024-01"));
        assert!(is_valid_date("2024-12-31"));
        assert!(!is_valid_date("2024-13"));
        assert!(!is_valid_date("2024-00-10"));
        assert!(!is_valid_date("2024-1-1"));
        assert!(!is_valid_date("24-01-01"));
        assert!(!is_valid_date("2024-01-32"));
        assert!(!is_valid_date(""));
    }
}
