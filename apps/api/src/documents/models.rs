use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::keys;

/// Ordered lists of section references, keyed by section type. A document
/// does not own section content, only the ordering of references to it.
pub type SectionRefs = BTreeMap<String, Vec<Uuid>>;

/// A named arrangement of sections — the resume itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub document_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Immutable after creation.
    pub template_id: Uuid,
    pub sections: SectionRefs,
    /// Free-form optimization hints.
    pub metadata: Value,
    /// Presentation hints.
    pub styling: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Removes the given section ids from every reference list, dropping
/// types whose list becomes empty. Returns whether anything was removed.
pub fn strip_refs(sections: &mut SectionRefs, ids: &[Uuid]) -> bool {
    let mut changed = false;
    for refs in sections.values_mut() {
        let before = refs.len();
        refs.retain(|id| !ids.contains(id));
        changed |= refs.len() != before;
    }
    if changed {
        sections.retain(|_, refs| !refs.is_empty());
    }
    changed
}

impl Document {
    pub fn new(owner_id: Uuid, name: String, template_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            document_id: Uuid::new_v4(),
            owner_id,
            name,
            template_id,
            sections: SectionRefs::new(),
            metadata: Value::Object(Default::default()),
            styling: Value::Object(Default::default()),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DocumentRecord {
    pub pk: String,
    pub sk: String,
    pub document_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub template_id: Uuid,
    pub sections: Json<SectionRefs>,
    pub metadata: Value,
    pub styling: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn from_document(document: &Document) -> Self {
        Self {
            pk: keys::owner_pk(document.owner_id),
            sk: keys::document_sk(document.document_id),
            document_id: document.document_id,
            owner_id: document.owner_id,
            name: document.name.clone(),
            template_id: document.template_id,
            sections: Json(document.sections.clone()),
            metadata: document.metadata.clone(),
            styling: document.styling.clone(),
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }

    pub fn into_document(self) -> Document {
        Document {
            document_id: self.document_id,
            owner_id: self.owner_id,
            name: self.name,
            template_id: self.template_id,
            sections: self.sections.0,
            metadata: self.metadata,
            styling: self.styling,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_storage_round_trip() {
        let mut document = Document::new(Uuid::new_v4(), "SWE roles".to_string(), Uuid::new_v4());
        document
            .sections
            .insert("experience".to_string(), vec![Uuid::new_v4(), Uuid::new_v4()]);
        let record = DocumentRecord::from_document(&document);
        assert_eq!(record.into_document(), document);
    }

    #[test]
    fn test_strip_refs_removes_ids_everywhere() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut sections = SectionRefs::new();
        sections.insert("experience".to_string(), vec![a, b]);
        sections.insert("projects".to_string(), vec![c, a]);

        assert!(strip_refs(&mut sections, &[a]));
        assert_eq!(sections["experience"], vec![b]);
        assert_eq!(sections["projects"], vec![c]);
    }

    #[test]
    fn test_strip_refs_prunes_emptied_types() {
        let a = Uuid::new_v4();
        let mut sections = SectionRefs::new();
        sections.insert("links".to_string(), vec![a]);

        assert!(strip_refs(&mut sections, &[a]));
        assert!(!sections.contains_key("links"));
    }

    #[test]
    fn test_strip_refs_reports_no_change_for_absent_ids() {
        let mut sections = SectionRefs::new();
        sections.insert("skills".to_string(), vec![Uuid::new_v4()]);

        assert!(!strip_refs(&mut sections, &[Uuid::new_v4()]));
        assert_eq!(sections["skills"].len(), 1);
    }

    #[test]
    fn test_document_keys_scope_by_owner() {
        let document = Document::new(Uuid::new_v4(), "n".to_string(), Uuid::new_v4());
        let record = DocumentRecord::from_document(&document);
        assert_eq!(record.pk, keys::owner_pk(document.owner_id));
        assert_eq!(record.sk, format!("RESUME#{}", document.document_id));
    }
}
