//! Template catalog reads. Templates are seeded out of band (see
//! schema.sql) and immutable at runtime; the service only lists and
//! resolves them.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::keys;
use crate::templates::models::{Template, TemplateRecord};

pub async fn list_templates(pool: &PgPool) -> Result<Vec<Template>, AppError> {
    let records: Vec<TemplateRecord> =
        sqlx::query_as("SELECT * FROM templates WHERE pk = $1 ORDER BY sk")
            .bind(keys::template_pk())
            .fetch_all(pool)
            .await?;
    Ok(records.into_iter().map(TemplateRecord::into_template).collect())
}

pub async fn get_template(pool: &PgPool, template_id: Uuid) -> Result<Template, AppError> {
    let record: Option<TemplateRecord> =
        sqlx::query_as("SELECT * FROM templates WHERE pk = $1 AND sk = $2")
            .bind(keys::template_pk())
            .bind(keys::template_sk(template_id))
            .fetch_optional(pool)
            .await?;

    record
        .map(TemplateRecord::into_template)
        .ok_or_else(|| AppError::NotFound("Template not found".to_string()))
}
