//! Schema Definition — the declarative shape of one section type.
//!
//! A `SectionSchema` says whether a section type is a singleton object
//! (personal info) or a repeatable list (experience entries), and what
//! fields each instance carries. Schemas are data: the built-in catalog
//! (`templates::catalog`) constructs them in code, and template records
//! persist them as JSON under `input_data_schema`.

pub mod validator;

use serde::{Deserialize, Serialize};

/// Cardinality of a section type. Immutable once sections of the type exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SchemaKind {
    /// One instance per document (an object payload).
    Singleton,
    /// An ordered list of instances (an array payload).
    Repeatable,
}

/// The declared type of one field.
///
/// `Unknown` is the fail-closed catch-all: a stored schema naming a field
/// type this build does not recognize deserializes to `Unknown`, and the
/// validator rejects every value for it rather than silently accepting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    LongText,
    Url,
    Date,
    Number,
    Boolean,
    StringArray,
    NestedObject,
    Image,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Human-readable label for form rendering.
    pub title: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Present only for `NestedObject` fields: the nested field list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSpec>>,
}

impl FieldSpec {
    pub fn new(name: &str, title: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            field_type,
            required: false,
            fields: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nested(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields = Some(fields);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSchema {
    pub kind: SchemaKind,
    /// Field declarations. Names are unique within a schema.
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
}

impl SectionSchema {
    pub fn singleton(fields: Vec<FieldSpec>) -> Self {
        Self {
            kind: SchemaKind::Singleton,
            fields,
            min_items: None,
            max_items: None,
        }
    }

    pub fn repeatable(fields: Vec<FieldSpec>, min_items: usize, max_items: usize) -> Self {
        Self {
            kind: SchemaKind::Repeatable,
            fields,
            min_items: Some(min_items),
            max_items: Some(max_items),
        }
    }

    /// True when no two fields share a name, recursing into nested objects.
    pub fn has_unique_field_names(&self) -> bool {
        fn unique(fields: &[FieldSpec]) -> bool {
            let mut names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
            names.sort_unstable();
            names.windows(2).all(|w| w[0] != w[1])
                && fields
                    .iter()
                    .filter_map(|f| f.fields.as_deref())
                    .all(unique)
        }
        unique(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_type_from_unrecognized_name() {
        let spec: FieldSpec = serde_json::from_value(serde_json::json!({
            "name": "x",
            "title": "X",
            "field_type": "hologram"
        }))
        .unwrap();
        assert_eq!(spec.field_type, FieldType::Unknown);
    }

    #[test]
    fn test_duplicate_field_names_detected() {
        let schema = SectionSchema::singleton(vec![
            FieldSpec::new("name", "Name", FieldType::String),
            FieldSpec::new("name", "Name again", FieldType::String),
        ]);
        assert!(!schema.has_unique_field_names());
    }

    #[test]
    fn test_nested_duplicate_field_names_detected() {
        let schema = SectionSchema::singleton(vec![FieldSpec::new(
            "address",
            "Address",
            FieldType::NestedObject,
        )
        .nested(vec![
            FieldSpec::new("city", "City", FieldType::String),
            FieldSpec::new("city", "City", FieldType::String),
        ])]);
        assert!(!schema.has_unique_field_names());
    }

    #[test]
    fn test_schema_round_trips_through_json() {
        let schema = SectionSchema::repeatable(
            vec![FieldSpec::new("company", "Company", FieldType::String).required()],
            0,
            20,
        );
        let json = serde_json::to_value(&schema).unwrap();
        let back: SectionSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, SchemaKind::Repeatable);
        assert_eq!(back.max_items, Some(20));
        assert!(back.fields[0].required);
    }
}
