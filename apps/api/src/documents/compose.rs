//! Document Composer — assembles the full resume view.
//!
//! Resolution is one batched read against the section store, never N
//! sequential point reads. Resolved sections are regrouped by their
//! actual `section_type`, not by the reference list they were found
//! under: during a type change both the old and new record can be
//! transiently visible, and consistent grouping matters more than
//! echoing the exact reference order. Reference ids that no longer
//! resolve are silently dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::documents::models::SectionRefs;
use crate::documents::store as document_store;
use crate::errors::AppError;
use crate::profiles::models::PersonalInfo;
use crate::profiles::store as profile_store;
use crate::sections::models::Section;
use crate::sections::store as section_store;

/// A document's metadata merged with its fully resolved, type-grouped
/// section content and the owner's profile.
#[derive(Debug, Clone, Serialize)]
pub struct FullDocument {
    pub document_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub template_id: Uuid,
    pub metadata: Value,
    pub styling: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: ComposedData,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComposedData {
    pub personal_info: PersonalInfo,
    #[serde(flatten)]
    pub sections: BTreeMap<String, Vec<Section>>,
}

/// Flattens the type->id-list map into `(section_id, section_type)` pairs,
/// preserving per-type order.
pub fn flatten_refs(refs: &SectionRefs) -> Vec<(Uuid, String)> {
    refs.iter()
        .flat_map(|(section_type, ids)| {
            ids.iter().map(move |id| (*id, section_type.clone()))
        })
        .collect()
}

/// Groups resolved sections by their actual type. Stale references never
/// reach this point (they simply did not resolve), so the output contains
/// exactly the sections that still exist.
pub fn group_by_type(resolved: Vec<Section>) -> BTreeMap<String, Vec<Section>> {
    let mut grouped: BTreeMap<String, Vec<Section>> = BTreeMap::new();
    for section in resolved {
        grouped
            .entry(section.section_type.clone())
            .or_default()
            .push(section);
    }
    grouped
}

pub async fn compose_full(
    pool: &PgPool,
    owner_id: Uuid,
    document_id: Uuid,
) -> Result<FullDocument, AppError> {
    let document = document_store::get_document(pool, owner_id, document_id).await?;

    // Absent profile is empty personal info, not an error.
    let personal_info = profile_store::get_profile(pool, owner_id)
        .await?
        .map(|p| p.personal_info)
        .unwrap_or_default();

    let refs = flatten_refs(&document.sections);
    let ids: Vec<Uuid> = refs.iter().map(|(id, _)| *id).collect();
    let resolved = section_store::batch_get(pool, owner_id, &ids).await?;
    let sections = group_by_type(resolved);

    Ok(FullDocument {
        document_id: document.document_id,
        owner_id: document.owner_id,
        name: document.name,
        template_id: document.template_id,
        metadata: document.metadata,
        styling: document.styling,
        created_at: document.created_at,
        updated_at: document.updated_at,
        data: ComposedData {
            personal_info,
            sections,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(owner: Uuid, doc: Uuid, section_type: &str) -> Section {
        Section::new(
            owner,
            Some(doc),
            section_type.to_string(),
            format!("{section_type} block"),
            vec![],
            json!([]),
        )
    }

    #[test]
    fn test_flatten_preserves_per_type_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut refs = SectionRefs::new();
        refs.insert("experience".to_string(), vec![a, b]);
        refs.insert("education".to_string(), vec![c]);

        let flat = flatten_refs(&refs);
        assert_eq!(flat.len(), 3);
        let exp: Vec<Uuid> = flat
            .iter()
            .filter(|(_, t)| t.as_str() == "experience")
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(exp, vec![a, b]);
    }

    #[test]
    fn test_group_by_actual_type() {
        let owner = Uuid::new_v4();
        let doc = Uuid::new_v4();
        let resolved = vec![
            section(owner, doc, "experience"),
            section(owner, doc, "education"),
            section(owner, doc, "experience"),
        ];
        let grouped = group_by_type(resolved);
        assert_eq!(grouped["experience"].len(), 2);
        assert_eq!(grouped["education"].len(), 1);
    }

    #[test]
    fn test_stale_refs_simply_absent_from_groups() {
        // The document references three ids but only two resolved: the
        // composed view contains the two, with no error for the third.
        let owner = Uuid::new_v4();
        let doc = Uuid::new_v4();
        let s1 = section(owner, doc, "experience");
        let s2 = section(owner, doc, "experience");

        let mut refs = SectionRefs::new();
        refs.insert(
            "experience".to_string(),
            vec![s1.section_id, s2.section_id, Uuid::new_v4()],
        );

        assert_eq!(flatten_refs(&refs).len(), 3);
        let grouped = group_by_type(vec![s1, s2]);
        assert_eq!(grouped["experience"].len(), 2);
    }

    #[test]
    fn test_retyped_section_groups_under_new_type() {
        // Mid type-change, a section referenced under "experience" can
        // already carry "projects": it groups under what it is now.
        let owner = Uuid::new_v4();
        let doc = Uuid::new_v4();
        let moved = section(owner, doc, "projects");
        let grouped = group_by_type(vec![moved]);
        assert!(grouped.contains_key("projects"));
        assert!(!grouped.contains_key("experience"));
    }

    #[test]
    fn test_composed_data_serializes_types_at_top_level() {
        let owner = Uuid::new_v4();
        let doc = Uuid::new_v4();
        let data = ComposedData {
            personal_info: PersonalInfo {
                name: Some("Jane".to_string()),
                ..Default::default()
            },
            sections: group_by_type(vec![section(owner, doc, "experience")]),
        };
        let v = serde_json::to_value(&data).unwrap();
        assert_eq!(v["personal_info"]["name"], "Jane");
        assert!(v["experience"].is_array());
    }
}
