use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::keys;

/// One reusable content block (e.g. one job entry), addressable
/// independently of any document. `data` has already been validated
/// against the schema for `section_type` by the time a `Section` exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub section_id: Uuid,
    pub owner_id: Uuid,
    /// The resume this section currently belongs to; `None` = unassigned.
    pub document_id: Option<Uuid>,
    pub section_type: String,
    pub title: String,
    pub tags: Vec<String>,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Section {
    /// Builds a fresh section with server-assigned id and timestamps.
    pub fn new(
        owner_id: Uuid,
        document_id: Option<Uuid>,
        section_type: String,
        title: String,
        tags: Vec<String>,
        data: Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            section_id: Uuid::new_v4(),
            owner_id,
            document_id,
            section_type,
            title,
            tags,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// The replacement record for a type change: fresh id and timestamps,
    /// new type, all content fields copied.
    pub fn retyped(&self, new_type: &str) -> Self {
        let now = Utc::now();
        Self {
            section_id: Uuid::new_v4(),
            owner_id: self.owner_id,
            document_id: self.document_id,
            section_type: new_type.to_string(),
            title: self.title.clone(),
            tags: self.tags.clone(),
            data: self.data.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of the mutable section fields. `section_type` is
/// deliberately absent: changing it re-keys the record and goes through
/// the explicit type-change operation instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionPatch {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    pub data: Option<Value>,
}

/// Merges a patch onto a section, stamping `updated_at`.
pub fn apply_patch(mut section: Section, patch: SectionPatch, now: DateTime<Utc>) -> Section {
    if let Some(title) = patch.title {
        section.title = title;
    }
    if let Some(tags) = patch.tags {
        section.tags = tags;
    }
    if let Some(data) = patch.data {
        section.data = data;
    }
    section.updated_at = now;
    section
}

/// The physical storage row: the domain fields plus the derived key
/// columns. Key columns never leak to callers; `into_section` strips them.
#[derive(Debug, Clone, FromRow)]
pub struct SectionRecord {
    pub pk: String,
    pub sk: String,
    pub tag_sk: String,
    pub type_pk: String,
    pub owner_id: Uuid,
    pub section_id: Uuid,
    pub document_id: Option<Uuid>,
    pub section_type: String,
    pub title: String,
    pub tags: Vec<String>,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SectionRecord {
    /// `toStorageItem`: derives every key column from the domain entity.
    pub fn from_section(section: &Section) -> Self {
        Self {
            pk: keys::owner_pk(section.owner_id),
            sk: keys::section_sk(
                section.document_id,
                &section.section_type,
                section.section_id,
            ),
            tag_sk: keys::tag_sk(&section.tags, section.section_id),
            type_pk: keys::type_pk(section.document_id, &section.section_type),
            owner_id: section.owner_id,
            section_id: section.section_id,
            document_id: section.document_id,
            section_type: section.section_type.clone(),
            title: section.title.clone(),
            tags: section.tags.clone(),
            data: section.data.clone(),
            created_at: section.created_at,
            updated_at: section.updated_at,
        }
    }

    /// `fromStorageItem`: strips the storage-only key fields.
    pub fn into_section(self) -> Section {
        Section {
            section_id: self.section_id,
            owner_id: self.owner_id,
            document_id: self.document_id,
            section_type: self.section_type,
            title: self.title,
            tags: self.tags,
            data: self.data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_section() -> Section {
        Section::new(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            "experience".to_string(),
            "Acme years".to_string(),
            vec!["backend".to_string(), "go".to_string()],
            json!([{ "company": "Acme", "title": "Eng" }]),
        )
    }

    #[test]
    fn test_storage_round_trip_reproduces_section() {
        let section = sample_section();
        let record = SectionRecord::from_section(&section);
        assert_eq!(record.into_section(), section);
    }

    #[test]
    fn test_round_trip_for_unassigned_section() {
        let mut section = sample_section();
        section.document_id = None;
        let record = SectionRecord::from_section(&section);
        assert!(record.sk.contains(keys::UNASSIGNED_DOC));
        assert_eq!(record.into_section(), section);
    }

    #[test]
    fn test_tag_order_does_not_change_index_key() {
        let mut a = sample_section();
        let mut b = a.clone();
        a.tags = vec!["b".to_string(), "a".to_string()];
        b.tags = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            SectionRecord::from_section(&a).tag_sk,
            SectionRecord::from_section(&b).tag_sk
        );
    }

    #[test]
    fn test_apply_patch_merges_only_given_fields() {
        let section = sample_section();
        let original_data = section.data.clone();
        let patched = apply_patch(
            section,
            SectionPatch {
                title: Some("New title".to_string()),
                tags: None,
                data: None,
            },
            Utc::now(),
        );
        assert_eq!(patched.title, "New title");
        assert_eq!(patched.data, original_data);
    }

    #[test]
    fn test_retyped_copies_content_under_new_identity() {
        let section = sample_section();
        let replacement = section.retyped("projects");
        assert_ne!(replacement.section_id, section.section_id);
        assert_eq!(replacement.section_type, "projects");
        assert_eq!(replacement.title, section.title);
        assert_eq!(replacement.tags, section.tags);
        assert_eq!(replacement.data, section.data);
        assert_eq!(replacement.document_id, section.document_id);
    }

    #[test]
    fn test_apply_patch_stamps_updated_at() {
        let section = sample_section();
        let created = section.created_at;
        let later = created + chrono::Duration::seconds(90);
        let patched = apply_patch(section, SectionPatch::default(), later);
        assert_eq!(patched.updated_at, later);
        assert_eq!(patched.created_at, created);
    }
}
