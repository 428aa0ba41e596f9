use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::OwnerId;
use crate::documents;
use crate::errors::{AppError, FieldViolation};
use crate::schema::validator;
use crate::sections::models::{Section, SectionPatch};
use crate::sections::store::{self, SectionLocator};
use crate::state::AppState;
use crate::templates::catalog;

#[derive(Debug, Deserialize)]
pub struct CreateSectionRequest {
    pub section_type: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub data: Value,
    pub document_id: Option<Uuid>,
}

/// Validates one create request against the catalog schema for its type,
/// prefixing violation paths with `prefix` so bulk callers can tell the
/// failing request apart.
fn validate_create(req: &CreateSectionRequest, prefix: &str) -> Vec<FieldViolation> {
    let schema = match catalog::default_schema(&req.section_type) {
        Some(s) => s,
        None => {
            return vec![FieldViolation {
                field: format!("{prefix}section_type"),
                message: format!("unknown section type '{}'", req.section_type),
            }]
        }
    };
    let result = validator::validate(&req.data, &schema);
    result
        .errors
        .into_iter()
        .map(|v| {
            let field = if v.field.is_empty() {
                format!("{prefix}data")
            } else if v.field.starts_with('[') {
                format!("{prefix}data{}", v.field)
            } else {
                format!("{prefix}data.{}", v.field)
            };
            FieldViolation {
                field,
                message: v.message,
            }
        })
        .collect()
}

fn build_section(owner_id: Uuid, req: CreateSectionRequest) -> Section {
    Section::new(
        owner_id,
        req.document_id,
        req.section_type,
        req.title,
        req.tags,
        req.data,
    )
}

/// POST /api/v1/sections
pub async fn handle_create_section(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<CreateSectionRequest>,
) -> Result<Json<Section>, AppError> {
    let violations = validate_create(&req, "");
    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }

    let section = build_section(owner_id, req);
    store::create_section(&state.db, &section).await?;
    Ok(Json(section))
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub sections: Vec<CreateSectionRequest>,
}

/// POST /api/v1/sections/bulk
pub async fn handle_bulk_create(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<BulkCreateRequest>,
) -> Result<Json<Vec<Section>>, AppError> {
    // Validate every request before writing anything, collecting all
    // violations across the batch.
    let violations: Vec<FieldViolation> = req
        .sections
        .iter()
        .enumerate()
        .flat_map(|(i, r)| validate_create(r, &format!("sections[{i}].")))
        .collect();
    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }

    let sections: Vec<Section> = req
        .sections
        .into_iter()
        .map(|r| build_section(owner_id, r))
        .collect();
    store::bulk_create(&state.db, &sections).await?;
    Ok(Json(sections))
}

#[derive(Debug, Deserialize)]
pub struct GetSectionQuery {
    /// Optional locator hint. With a complete hint the lookup is a direct
    /// point read; otherwise the store falls back to an owner-wide scan.
    pub section_type: Option<String>,
    pub document_id: Option<Uuid>,
    /// Names the unassigned partition explicitly. Without it, a missing
    /// `document_id` means "unknown", not "unassigned".
    #[serde(default)]
    pub unassigned: bool,
}

impl GetSectionQuery {
    /// A point lookup needs the full key: the type plus either a document
    /// id or the explicit unassigned marker. A type-only hint would probe
    /// the wrong partition, so anything less takes the scan path.
    fn locator(&self) -> Option<SectionLocator> {
        let section_type = self.section_type.as_ref()?;
        if self.document_id.is_none() && !self.unassigned {
            return None;
        }
        Some(SectionLocator {
            document_id: self.document_id,
            section_type: section_type.clone(),
        })
    }
}

/// GET /api/v1/sections/:id
pub async fn handle_get_section(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
    Query(query): Query<GetSectionQuery>,
) -> Result<Json<Section>, AppError> {
    let section = store::get_section(&state.db, owner_id, id, query.locator().as_ref()).await?;
    Ok(Json(section))
}

/// PATCH /api/v1/sections/:id
pub async fn handle_update_section(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
    Query(query): Query<GetSectionQuery>,
    Json(patch): Json<SectionPatch>,
) -> Result<Json<Section>, AppError> {
    // A patched payload must still conform to the section's schema.
    if let Some(data) = &patch.data {
        let existing =
            store::get_section(&state.db, owner_id, id, query.locator().as_ref()).await?;
        if let Some(schema) = catalog::default_schema(&existing.section_type) {
            let result = validator::validate(data, &schema);
            if !result.valid {
                return Err(AppError::Validation(result.errors));
            }
        }
    }

    let section =
        store::update_section(&state.db, owner_id, id, patch, query.locator().as_ref()).await?;
    Ok(Json(section))
}

#[derive(Debug, Serialize)]
pub struct DeleteSectionResponse {
    pub deleted: Uuid,
}

/// DELETE /api/v1/sections/:id
///
/// Deleting the row does not touch document reference lists by itself;
/// the follow-up cleanup runs here, after the delete.
pub async fn handle_delete_section(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
    Query(query): Query<GetSectionQuery>,
) -> Result<Json<DeleteSectionResponse>, AppError> {
    let deleted =
        store::delete_section(&state.db, owner_id, id, query.locator().as_ref()).await?;
    documents::store::remove_section_refs(&state.db, owner_id, &[deleted.section_id]).await?;
    Ok(Json(DeleteSectionResponse { deleted: id }))
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: Vec<Uuid>,
}

/// POST /api/v1/sections/bulk-delete
///
/// Deletes the rows in chunks, then strips every deleted id from the
/// owner's document reference lists in one pass.
pub async fn handle_bulk_delete(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    store::bulk_delete(&state.db, owner_id, &req.ids).await?;
    documents::store::remove_section_refs(&state.db, owner_id, &req.ids).await?;
    Ok(Json(BulkDeleteResponse { deleted: req.ids }))
}

#[derive(Debug, Deserialize)]
pub struct ListSectionsQuery {
    pub document_id: Option<Uuid>,
    /// Comma-separated section types to restrict a document listing.
    pub types: Option<String>,
    /// Comma-separated tags; when present, the listing is a tag-index
    /// prefix query instead of a document listing.
    pub tags: Option<String>,
}

/// GET /api/v1/sections
pub async fn handle_list_sections(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Query(query): Query<ListSectionsQuery>,
) -> Result<Json<Vec<Section>>, AppError> {
    if let Some(raw) = &query.tags {
        let tags: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let sections = store::list_by_tags(&state.db, owner_id, &tags).await?;
        return Ok(Json(sections));
    }

    let types: Option<Vec<String>> = query.types.as_ref().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    });

    let sections = store::list_by_document(
        &state.db,
        owner_id,
        query.document_id,
        types.as_deref(),
    )
    .await?;
    Ok(Json(sections))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(
        section_type: Option<&str>,
        document_id: Option<Uuid>,
        unassigned: bool,
    ) -> GetSectionQuery {
        GetSectionQuery {
            section_type: section_type.map(str::to_string),
            document_id,
            unassigned,
        }
    }

    #[test]
    fn test_type_only_hint_takes_the_scan_path() {
        // A lookup hinted with just the type must not become a point read
        // against the unassigned partition: the section may well live
        // under a document the caller did not name.
        assert!(query(Some("experience"), None, false).locator().is_none());
    }

    #[test]
    fn test_full_hint_is_a_point_lookup() {
        let doc = Uuid::new_v4();
        let locator = query(Some("experience"), Some(doc), false)
            .locator()
            .unwrap();
        assert_eq!(locator.document_id, Some(doc));
        assert_eq!(locator.section_type, "experience");
    }

    #[test]
    fn test_unassigned_marker_targets_the_unassigned_partition() {
        let locator = query(Some("experience"), None, true).locator().unwrap();
        assert_eq!(locator.document_id, None);
    }

    #[test]
    fn test_document_without_type_is_no_locator() {
        assert!(query(None, Some(Uuid::new_v4()), false).locator().is_none());
    }
}
