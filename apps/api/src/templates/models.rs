#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::keys;
use crate::schema::SectionSchema;

/// An immutable catalog entry: a renderable template plus the map of
/// section types it expects (`input_data_schema`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub template_id: Uuid,
    pub name: String,
    pub category: String,
    /// Reference to the renderable resource (template file key/URL).
    pub resource_ref: String,
    /// section_type -> SectionSchema, stored as JSON.
    pub input_data_schema: Value,
    pub created_at: DateTime<Utc>,
}

impl Template {
    /// Parses `input_data_schema` into typed schemas, skipping entries
    /// that do not deserialize. Unknown field type names inside an entry
    /// survive as `FieldType::Unknown` and fail closed at validation.
    pub fn parsed_schemas(&self) -> BTreeMap<String, SectionSchema> {
        match self.input_data_schema.as_object() {
            Some(map) => map
                .iter()
                .filter_map(|(k, v)| {
                    serde_json::from_value::<SectionSchema>(v.clone())
                        .ok()
                        .map(|s| (k.clone(), s))
                })
                .collect(),
            None => BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TemplateRecord {
    pub pk: String,
    pub sk: String,
    pub template_id: Uuid,
    pub name: String,
    pub category: String,
    pub resource_ref: String,
    pub input_data_schema: Value,
    pub created_at: DateTime<Utc>,
}

impl TemplateRecord {
    pub fn from_template(template: &Template) -> Self {
        Self {
            pk: keys::template_pk(),
            sk: keys::template_sk(template.template_id),
            template_id: template.template_id,
            name: template.name.clone(),
            category: template.category.clone(),
            resource_ref: template.resource_ref.clone(),
            input_data_schema: template.input_data_schema.clone(),
            created_at: template.created_at,
        }
    }

    pub fn into_template(self) -> Template {
        Template {
            template_id: self.template_id,
            name: self.name,
            category: self.category,
            resource_ref: self.resource_ref,
            input_data_schema: self.input_data_schema,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_storage_round_trip() {
        let template = Template {
            template_id: Uuid::new_v4(),
            name: "Modern".to_string(),
            category: "professional".to_string(),
            resource_ref: "templates/modern.hbs".to_string(),
            input_data_schema: json!({}),
            created_at: Utc::now(),
        };
        let record = TemplateRecord::from_template(&template);
        assert_eq!(record.into_template(), template);
    }

    #[test]
    fn test_parsed_schemas_skips_malformed_entries() {
        let template = Template {
            template_id: Uuid::new_v4(),
            name: "Modern".to_string(),
            category: "professional".to_string(),
            resource_ref: "templates/modern.hbs".to_string(),
            input_data_schema: json!({
                "experience": {
                    "kind": "repeatable",
                    "fields": [
                        { "name": "company", "title": "Company", "field_type": "string" }
                    ],
                    "min_items": 0,
                    "max_items": 20
                },
                "broken": 42
            }),
            created_at: Utc::now(),
        };
        let schemas = template.parsed_schemas();
        assert!(schemas.contains_key("experience"));
        assert!(!schemas.contains_key("broken"));
    }
}
