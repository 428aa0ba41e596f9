//! Document (resume) record persistence.

use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::documents::models::{strip_refs, Document, DocumentRecord};
use crate::errors::AppError;
use crate::keys;

pub async fn create_document(pool: &PgPool, document: &Document) -> Result<(), AppError> {
    let record = DocumentRecord::from_document(document);
    let result = sqlx::query(
        r#"
        INSERT INTO documents
            (pk, sk, document_id, owner_id, name, template_id, sections,
             metadata, styling, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(&record.pk)
    .bind(&record.sk)
    .bind(record.document_id)
    .bind(record.owner_id)
    .bind(&record.name)
    .bind(record.template_id)
    .bind(&record.sections)
    .bind(&record.metadata)
    .bind(&record.styling)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "Resume {} already exists",
            document.document_id
        )));
    }
    Ok(())
}

pub async fn get_document(
    pool: &PgPool,
    owner_id: Uuid,
    document_id: Uuid,
) -> Result<Document, AppError> {
    let record: Option<DocumentRecord> =
        sqlx::query_as("SELECT * FROM documents WHERE pk = $1 AND sk = $2")
            .bind(keys::owner_pk(owner_id))
            .bind(keys::document_sk(document_id))
            .fetch_optional(pool)
            .await?;

    record
        .map(DocumentRecord::into_document)
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))
}

pub async fn list_documents(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Document>, AppError> {
    let records: Vec<DocumentRecord> = sqlx::query_as(
        "SELECT * FROM documents WHERE pk = $1 AND sk LIKE 'RESUME#%' ORDER BY created_at DESC",
    )
    .bind(keys::owner_pk(owner_id))
    .fetch_all(pool)
    .await?;
    Ok(records.into_iter().map(DocumentRecord::into_document).collect())
}

/// Writes the mutable document fields back. `template_id` is immutable
/// and deliberately not part of the UPDATE. Plain last-writer-wins: two
/// concurrent editors of the same document race on this write and the
/// later one prevails.
pub async fn save_document(pool: &PgPool, document: &Document) -> Result<(), AppError> {
    let record = DocumentRecord::from_document(document);
    let result = sqlx::query(
        r#"
        UPDATE documents
        SET name = $3, sections = $4, metadata = $5, styling = $6, updated_at = $7
        WHERE pk = $1 AND sk = $2
        "#,
    )
    .bind(&record.pk)
    .bind(&record.sk)
    .bind(&record.name)
    .bind(&record.sections)
    .bind(&record.metadata)
    .bind(&record.styling)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Resume not found".to_string()));
    }
    Ok(())
}

pub async fn delete_document(
    pool: &PgPool,
    owner_id: Uuid,
    document_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM documents WHERE pk = $1 AND sk = $2")
        .bind(keys::owner_pk(owner_id))
        .bind(keys::document_sk(document_id))
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Resume not found".to_string()));
    }
    Ok(())
}

/// Strips deleted sections' ids out of every reference list the owner's
/// documents still hold. Read-modify-write per document; composition
/// tolerates the window where a stale reference is still present.
pub async fn remove_section_refs(
    pool: &PgPool,
    owner_id: Uuid,
    section_ids: &[Uuid],
) -> Result<(), AppError> {
    if section_ids.is_empty() {
        return Ok(());
    }
    let documents = list_documents(pool, owner_id).await?;

    for mut document in documents {
        if strip_refs(&mut document.sections, section_ids) {
            document.updated_at = chrono::Utc::now();
            let record = DocumentRecord::from_document(&document);
            sqlx::query(
                "UPDATE documents SET sections = $3, updated_at = $4 WHERE pk = $1 AND sk = $2",
            )
            .bind(&record.pk)
            .bind(&record.sk)
            .bind(Json(&document.sections))
            .bind(document.updated_at)
            .execute(pool)
            .await?;
            info!(
                "Removed {} section ref(s) from resume {}",
                section_ids.len(),
                document.document_id
            );
        }
    }
    Ok(())
}
