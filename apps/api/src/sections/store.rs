//! Section Store — CRUD and query operations over section rows.
//!
//! Every function takes the shared pool and returns domain `Section`
//! values with the storage key columns already stripped. All SQL here is
//! key-prefix range scans or point lookups over the key columns derived
//! in `crate::keys`; no other module issues queries against `sections`.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::keys;
use crate::sections::models::{apply_patch, Section, SectionPatch, SectionRecord};

/// Per-chunk item limit for bulk writes, matching the backing store's
/// batch-write request cap.
pub const BATCH_WRITE_LIMIT: usize = 25;

/// Where a section is keyed: needed for a point lookup because the primary
/// sort key embeds document and type. `document_id: None` means the
/// unassigned partition, not "unknown" — callers without a full locator
/// pass no locator at all and take the scan path.
#[derive(Debug, Clone)]
pub struct SectionLocator {
    pub document_id: Option<Uuid>,
    pub section_type: String,
}

/// Writes a new section. Duplicate ids within the owner partition are a
/// `Conflict`.
pub async fn create_section(pool: &PgPool, section: &Section) -> Result<(), AppError> {
    let record = SectionRecord::from_section(section);
    let result = sqlx::query(
        r#"
        INSERT INTO sections
            (pk, sk, tag_sk, type_pk, owner_id, section_id, document_id,
             section_type, title, tags, data, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(&record.pk)
    .bind(&record.sk)
    .bind(&record.tag_sk)
    .bind(&record.type_pk)
    .bind(record.owner_id)
    .bind(record.section_id)
    .bind(record.document_id)
    .bind(&record.section_type)
    .bind(&record.title)
    .bind(&record.tags)
    .bind(&record.data)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "Section {} already exists",
            section.section_id
        )));
    }
    Ok(())
}

/// Point lookup when the caller can name the section's document and type;
/// otherwise an owner-wide scan plus a linear filter by id. The fallback
/// is O(total sections for the owner) — kept as-is, not optimized into a
/// SQL-side filter.
pub async fn get_section(
    pool: &PgPool,
    owner_id: Uuid,
    section_id: Uuid,
    locator: Option<&SectionLocator>,
) -> Result<Section, AppError> {
    let pk = keys::owner_pk(owner_id);

    let record: Option<SectionRecord> = match locator {
        Some(loc) => {
            let sk = keys::section_sk(loc.document_id, &loc.section_type, section_id);
            sqlx::query_as("SELECT * FROM sections WHERE pk = $1 AND sk = $2")
                .bind(&pk)
                .bind(&sk)
                .fetch_optional(pool)
                .await?
        }
        None => {
            let all: Vec<SectionRecord> = sqlx::query_as("SELECT * FROM sections WHERE pk = $1")
                .bind(&pk)
                .fetch_all(pool)
                .await?;
            all.into_iter().find(|r| r.section_id == section_id)
        }
    };

    record
        .map(SectionRecord::into_section)
        .ok_or_else(|| AppError::NotFound("Section not found".to_string()))
}

/// Merges `title`/`tags`/`data` onto the stored section, recomputing the
/// tag index key when tags changed and stamping `updated_at`.
pub async fn update_section(
    pool: &PgPool,
    owner_id: Uuid,
    section_id: Uuid,
    patch: SectionPatch,
    locator: Option<&SectionLocator>,
) -> Result<Section, AppError> {
    let existing = get_section(pool, owner_id, section_id, locator).await?;
    let updated = apply_patch(existing, patch, chrono::Utc::now());
    write_update(pool, &updated).await?;
    Ok(updated)
}

async fn write_update(pool: &PgPool, section: &Section) -> Result<(), AppError> {
    let record = SectionRecord::from_section(section);
    sqlx::query(
        r#"
        UPDATE sections
        SET title = $3, tags = $4, data = $5, tag_sk = $6, updated_at = $7
        WHERE pk = $1 AND sk = $2
        "#,
    )
    .bind(&record.pk)
    .bind(&record.sk)
    .bind(&record.title)
    .bind(&record.tags)
    .bind(&record.data)
    .bind(&record.tag_sk)
    .bind(record.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Removes the section row and its derived index entries (same row here).
/// Does NOT strip the id from document reference lists — that follow-up
/// belongs to the caller.
pub async fn delete_section(
    pool: &PgPool,
    owner_id: Uuid,
    section_id: Uuid,
    locator: Option<&SectionLocator>,
) -> Result<Section, AppError> {
    let existing = get_section(pool, owner_id, section_id, locator).await?;
    let record = SectionRecord::from_section(&existing);

    sqlx::query("DELETE FROM sections WHERE pk = $1 AND sk = $2")
        .bind(&record.pk)
        .bind(&record.sk)
        .execute(pool)
        .await?;

    Ok(existing)
}

/// Batch create, chunked to the store's write limit. Chunks are best
/// effort: a failing chunk aborts the call with one generic error and no
/// per-item detail, and earlier chunks stay written.
pub async fn bulk_create(pool: &PgPool, sections: &[Section]) -> Result<(), AppError> {
    for chunk in sections.chunks(BATCH_WRITE_LIMIT) {
        let mut qb = sqlx::QueryBuilder::new(
            "INSERT INTO sections \
             (pk, sk, tag_sk, type_pk, owner_id, section_id, document_id, \
              section_type, title, tags, data, created_at, updated_at) ",
        );
        qb.push_values(chunk, |mut b, section| {
            let r = SectionRecord::from_section(section);
            b.push_bind(r.pk)
                .push_bind(r.sk)
                .push_bind(r.tag_sk)
                .push_bind(r.type_pk)
                .push_bind(r.owner_id)
                .push_bind(r.section_id)
                .push_bind(r.document_id)
                .push_bind(r.section_type)
                .push_bind(r.title)
                .push_bind(r.tags)
                .push_bind(r.data)
                .push_bind(r.created_at)
                .push_bind(r.updated_at);
        });
        qb.build()
            .execute(pool)
            .await
            .map_err(|e| AppError::PartialBatch(format!("bulk create chunk failed: {e}")))?;
    }
    info!("Bulk created {} section(s)", sections.len());
    Ok(())
}

/// Batch update of already-merged sections. Each chunk runs in one
/// transaction (the grouped-update variant is atomic per chunk); across
/// chunks the call is still best effort.
pub async fn bulk_update(pool: &PgPool, sections: &[Section]) -> Result<(), AppError> {
    for chunk in sections.chunks(BATCH_WRITE_LIMIT) {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| AppError::PartialBatch(format!("bulk update begin failed: {e}")))?;

        for section in chunk {
            let record = SectionRecord::from_section(section);
            sqlx::query(
                r#"
                UPDATE sections
                SET title = $3, tags = $4, data = $5, tag_sk = $6, updated_at = $7
                WHERE pk = $1 AND sk = $2
                "#,
            )
            .bind(&record.pk)
            .bind(&record.sk)
            .bind(&record.title)
            .bind(&record.tags)
            .bind(&record.data)
            .bind(&record.tag_sk)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::PartialBatch(format!("bulk update chunk failed: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::PartialBatch(format!("bulk update commit failed: {e}")))?;
    }
    info!("Bulk updated {} section(s)", sections.len());
    Ok(())
}

/// Batch delete by id, chunked like the other bulk writes.
pub async fn bulk_delete(pool: &PgPool, owner_id: Uuid, ids: &[Uuid]) -> Result<(), AppError> {
    let pk = keys::owner_pk(owner_id);
    for chunk in ids.chunks(BATCH_WRITE_LIMIT) {
        sqlx::query("DELETE FROM sections WHERE pk = $1 AND section_id = ANY($2)")
            .bind(&pk)
            .bind(chunk)
            .execute(pool)
            .await
            .map_err(|e| AppError::PartialBatch(format!("bulk delete chunk failed: {e}")))?;
    }
    Ok(())
}

/// Lists a document's sections. With explicit types, one type-index query
/// per type, merged (newest first within each type); without, a single
/// range scan over the document's sort-key prefix.
pub async fn list_by_document(
    pool: &PgPool,
    owner_id: Uuid,
    document_id: Option<Uuid>,
    section_types: Option<&[String]>,
) -> Result<Vec<Section>, AppError> {
    let pk = keys::owner_pk(owner_id);

    let records: Vec<SectionRecord> = match section_types {
        Some(types) => {
            let mut merged = Vec::new();
            for section_type in types {
                let type_pk = keys::type_pk(document_id, section_type);
                let mut rows: Vec<SectionRecord> = sqlx::query_as(
                    "SELECT * FROM sections \
                     WHERE pk = $1 AND type_pk = $2 \
                     ORDER BY created_at DESC",
                )
                .bind(&pk)
                .bind(&type_pk)
                .fetch_all(pool)
                .await?;
                merged.append(&mut rows);
            }
            merged
        }
        None => {
            let prefix = format!("{}%", keys::section_sk_document_prefix(document_id));
            sqlx::query_as(
                "SELECT * FROM sections WHERE pk = $1 AND sk LIKE $2 ORDER BY sk",
            )
            .bind(&pk)
            .bind(&prefix)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(records.into_iter().map(SectionRecord::into_section).collect())
}

/// Lists sections whose tag set is a superset of `tags`, via a prefix
/// query on the canonical tag key.
pub async fn list_by_tags(
    pool: &PgPool,
    owner_id: Uuid,
    tags: &[String],
) -> Result<Vec<Section>, AppError> {
    let pk = keys::owner_pk(owner_id);
    let prefix = format!("{}%", keys::tag_sk_prefix(tags));

    let records: Vec<SectionRecord> = sqlx::query_as(
        "SELECT * FROM sections WHERE pk = $1 AND tag_sk LIKE $2 ORDER BY tag_sk",
    )
    .bind(&pk)
    .bind(&prefix)
    .fetch_all(pool)
    .await?;

    Ok(records.into_iter().map(SectionRecord::into_section).collect())
}

/// Resolves many ids in one read. Ids that resolve to nothing are simply
/// absent from the result; the composer relies on that to drop stale
/// references.
pub async fn batch_get(
    pool: &PgPool,
    owner_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Section>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let pk = keys::owner_pk(owner_id);
    let records: Vec<SectionRecord> =
        sqlx::query_as("SELECT * FROM sections WHERE pk = $1 AND section_id = ANY($2)")
            .bind(&pk)
            .bind(ids)
            .fetch_all(pool)
            .await?;
    Ok(records.into_iter().map(SectionRecord::into_section).collect())
}

/// Re-keys a section under a new type: the primary sort key embeds the
/// type, so this is create-replacement-then-delete-old, two writes with
/// no atomicity between them. A failure in between leaves both records
/// visible until cleanup; readers tolerate that.
pub async fn change_section_type(
    pool: &PgPool,
    old: &Section,
    replacement: &Section,
) -> Result<(), AppError> {
    create_section(pool, replacement).await?;

    let old_record = SectionRecord::from_section(old);
    sqlx::query("DELETE FROM sections WHERE pk = $1 AND sk = $2")
        .bind(&old_record.pk)
        .bind(&old_record.sk)
        .execute(pool)
        .await?;

    info!(
        "Re-keyed section {} as {} ({} -> {})",
        old.section_id, replacement.section_id, old.section_type, replacement.section_type
    );
    Ok(())
}
