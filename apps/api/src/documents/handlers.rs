use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::OwnerId;
use crate::documents::compose::{compose_full, FullDocument};
use crate::documents::models::Document;
use crate::documents::store;
use crate::documents::upsert::{
    apply_upserts, merge_result_refs, partition_upserts, UpsertRequests,
};
use crate::errors::{AppError, FieldViolation};
use crate::schema::validator;
use crate::sections::store as section_store;
use crate::state::AppState;
use crate::templates::catalog;
use crate::templates::store as template_store;

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub name: String,
    pub template_id: Uuid,
}

/// POST /api/v1/documents
pub async fn handle_create_document(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<Json<Document>, AppError> {
    // The template reference is immutable afterward, so it must resolve now.
    template_store::get_template(&state.db, req.template_id).await?;

    let document = Document::new(owner_id, req.name, req.template_id);
    store::create_document(&state.db, &document).await?;
    Ok(Json(document))
}

/// GET /api/v1/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(store::list_documents(&state.db, owner_id).await?))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>, AppError> {
    Ok(Json(store::get_document(&state.db, owner_id, id).await?))
}

/// GET /api/v1/documents/:id/full
pub async fn handle_compose_document(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
) -> Result<Json<FullDocument>, AppError> {
    Ok(Json(compose_full(&state.db, owner_id, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    pub name: Option<String>,
    pub metadata: Option<Value>,
    pub styling: Option<Value>,
    /// Per-type mixed lists of section updates and creates.
    pub sections: Option<UpsertRequests>,
}

/// PATCH /api/v1/documents/:id
///
/// Applies metadata changes and the embedded section upsert, then writes
/// the resulting reference lists back onto the document. The final write
/// is a plain read-modify-write: last writer wins.
pub async fn handle_update_document(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Json<Document>, AppError> {
    let mut document = store::get_document(&state.db, owner_id, id).await?;

    if let Some(name) = req.name {
        document.name = name;
    }
    if let Some(metadata) = req.metadata {
        document.metadata = metadata;
    }
    if let Some(styling) = req.styling {
        document.styling = styling;
    }

    if let Some(requests) = req.sections {
        validate_upserts(&requests)?;

        let existing = section_store::list_by_document(
            &state.db,
            owner_id,
            Some(document.document_id),
            None,
        )
        .await?;

        let (partitioned, result_ids) =
            partition_upserts(owner_id, Some(document.document_id), &requests, &existing)?;
        apply_upserts(&state.db, &partitioned).await?;

        merge_result_refs(&mut document.sections, &partitioned, result_ids);
    }

    document.updated_at = chrono::Utc::now();
    store::save_document(&state.db, &document).await?;
    Ok(Json(document))
}

/// Validates every upsert payload against its target type's schema before
/// anything is written, collecting all violations across the request.
fn validate_upserts(requests: &UpsertRequests) -> Result<(), AppError> {
    let mut violations: Vec<FieldViolation> = Vec::new();

    for (section_type, entries) in requests {
        let schema = match catalog::default_schema(section_type) {
            Some(s) => s,
            None => {
                violations.push(FieldViolation {
                    field: format!("sections.{section_type}"),
                    message: format!("unknown section type '{section_type}'"),
                });
                continue;
            }
        };
        for (i, entry) in entries.iter().enumerate() {
            let result = validator::validate(&entry.data, &schema);
            violations.extend(result.errors.into_iter().map(|v| FieldViolation {
                field: format!("sections.{section_type}[{i}].data{}", suffix(&v.field)),
                message: v.message,
            }));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(violations))
    }
}

fn suffix(field: &str) -> String {
    if field.is_empty() {
        String::new()
    } else if field.starts_with('[') {
        field.to_string()
    } else {
        format!(".{field}")
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteDocumentResponse {
    pub deleted: Uuid,
}

/// DELETE /api/v1/documents/:id
pub async fn handle_delete_document(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteDocumentResponse>, AppError> {
    store::delete_document(&state.db, owner_id, id).await?;
    Ok(Json(DeleteDocumentResponse { deleted: id }))
}
