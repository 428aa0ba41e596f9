//! Profile persistence. One row per owner under a fixed sort key.

use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::keys;
use crate::profiles::models::{PersonalInfo, Profile, ProfileRecord};

/// Conditional create. If a profile already exists for the owner this is
/// NOT an error: the existing profile is returned unchanged (intentional
/// idempotency at the profile layer specifically).
pub async fn create_profile(pool: &PgPool, profile: &Profile) -> Result<Profile, AppError> {
    let record = ProfileRecord::from_profile(profile);
    let result = sqlx::query(
        r#"
        INSERT INTO profiles (pk, sk, owner_id, personal_info, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(&record.pk)
    .bind(&record.sk)
    .bind(record.owner_id)
    .bind(&record.personal_info)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        // Already exists: surface the stored profile, not a conflict.
        return get_profile(pool, profile.owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()));
    }
    Ok(profile.clone())
}

pub async fn get_profile(pool: &PgPool, owner_id: Uuid) -> Result<Option<Profile>, AppError> {
    let record: Option<ProfileRecord> =
        sqlx::query_as("SELECT * FROM profiles WHERE pk = $1 AND sk = $2")
            .bind(keys::owner_pk(owner_id))
            .bind(keys::profile_sk())
            .fetch_optional(pool)
            .await?;
    Ok(record.map(ProfileRecord::into_profile))
}

pub async fn update_profile(
    pool: &PgPool,
    owner_id: Uuid,
    personal_info: PersonalInfo,
) -> Result<Profile, AppError> {
    let mut profile = get_profile(pool, owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    profile.personal_info = personal_info;
    profile.updated_at = chrono::Utc::now();

    let record = ProfileRecord::from_profile(&profile);
    sqlx::query(
        "UPDATE profiles SET personal_info = $3, updated_at = $4 WHERE pk = $1 AND sk = $2",
    )
    .bind(&record.pk)
    .bind(&record.sk)
    .bind(&record.personal_info)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(profile)
}
