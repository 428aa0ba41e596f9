//! Embedded section upsert: a document update may carry, per section
//! type, a mixed list of "update this existing id" and "create new"
//! requests in one call.
//!
//! Requests partition three ways: no id -> create; existing id under the
//! same type -> in-place update; existing id under a different type ->
//! type change. Creates and same-type updates touch disjoint storage keys
//! and run concurrently; type changes re-key records the other two must
//! not race against, so they run sequentially afterward.

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::documents::models::{strip_refs, SectionRefs};
use crate::errors::AppError;
use crate::sections::models::{apply_patch, Section, SectionPatch};
use crate::sections::store;

/// One entry in a document update's per-type section list.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionUpsert {
    /// Present: update (or re-type) the existing section. Absent: create.
    pub section_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub data: Value,
}

/// Per-type upsert lists, as they arrive on the wire.
pub type UpsertRequests = BTreeMap<String, Vec<SectionUpsert>>;

#[derive(Debug, Default)]
pub struct PartitionedUpserts {
    pub creates: Vec<Section>,
    pub updates: Vec<Section>,
    /// `(old record, prepared replacement)` pairs.
    pub type_changes: Vec<(Section, Section)>,
}

/// Splits the request lists against the document's existing sections and
/// pre-assigns every resulting id, returning the type -> id-list map the
/// caller writes back onto the document record.
///
/// An id that names no existing section fails the whole call.
pub fn partition_upserts(
    owner_id: Uuid,
    document_id: Option<Uuid>,
    requests: &UpsertRequests,
    existing: &[Section],
) -> Result<(PartitionedUpserts, BTreeMap<String, Vec<Uuid>>), AppError> {
    let now = Utc::now();
    let mut partitioned = PartitionedUpserts::default();
    let mut result_ids: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();

    for (section_type, entries) in requests {
        let ids = result_ids.entry(section_type.clone()).or_default();

        for entry in entries {
            match entry.section_id {
                None => {
                    let section = Section::new(
                        owner_id,
                        document_id,
                        section_type.clone(),
                        entry.title.clone(),
                        entry.tags.clone(),
                        entry.data.clone(),
                    );
                    ids.push(section.section_id);
                    partitioned.creates.push(section);
                }
                Some(id) => {
                    let current = existing
                        .iter()
                        .find(|s| s.section_id == id)
                        .ok_or_else(|| AppError::NotFound("Section not found".to_string()))?;

                    let patch = SectionPatch {
                        title: Some(entry.title.clone()),
                        tags: Some(entry.tags.clone()),
                        data: Some(entry.data.clone()),
                    };

                    if current.section_type == *section_type {
                        let merged = apply_patch(current.clone(), patch, now);
                        ids.push(merged.section_id);
                        partitioned.updates.push(merged);
                    } else {
                        // Type change: the replacement gets a fresh id,
                        // which is what the document list must reference.
                        let replacement = apply_patch(current.retyped(section_type), patch, now);
                        ids.push(replacement.section_id);
                        partitioned.type_changes.push((current.clone(), replacement));
                    }
                }
            }
        }
    }

    Ok((partitioned, result_ids))
}

/// Writes an upsert's outcome back onto the document's reference lists.
/// Touched types are replaced wholesale with the ids the upsert produced;
/// ids re-keyed by a type change additionally leave every list still
/// naming them, or the document would reference deleted records forever.
pub fn merge_result_refs(
    sections: &mut SectionRefs,
    partitioned: &PartitionedUpserts,
    result_ids: BTreeMap<String, Vec<Uuid>>,
) {
    let moved: Vec<Uuid> = partitioned
        .type_changes
        .iter()
        .map(|(old, _)| old.section_id)
        .collect();
    strip_refs(sections, &moved);

    for (section_type, ids) in result_ids {
        sections.insert(section_type, ids);
    }
}

/// Executes a partitioned upsert. Creates and updates are awaited
/// together; type changes run one at a time afterward (each is itself a
/// non-atomic create-then-delete pair).
pub async fn apply_upserts(pool: &PgPool, partitioned: &PartitionedUpserts) -> Result<(), AppError> {
    let (created, updated) = tokio::join!(
        store::bulk_create(pool, &partitioned.creates),
        store::bulk_update(pool, &partitioned.updates),
    );
    created?;
    updated?;

    for (old, replacement) in &partitioned.type_changes {
        store::change_section_type(pool, old, replacement).await?;
    }
    Ok(())
}
