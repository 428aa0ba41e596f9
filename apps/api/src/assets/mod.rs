//! Image asset storage — uploads validated images to S3/MinIO and hands
//! back the stable public URL. The schema validator's `image` field type
//! checks stored values against this module's URL shape; it never uploads.

use anyhow::anyhow;
use aws_sdk_s3::primitives::ByteStream;
use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::auth::OwnerId;
use crate::errors::AppError;
use crate::state::AppState;

/// Path prefix under which every uploaded image lives.
pub const IMAGE_KEY_PREFIX: &str = "assets/images/";

const ALLOWED_CONTENT_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
];

/// True when `value` is an absolute URL pointing into asset storage.
pub fn is_asset_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => url.path().contains("/assets/images/"),
        Err(_) => false,
    }
}

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub url: String,
}

/// POST /api/v1/assets/images (multipart, one `file` part)
pub async fn handle_upload_image(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, AppError> {
    let mut file: Option<(Bytes, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(vec![crate::errors::FieldViolation {
            field: "file".to_string(),
            message: format!("malformed multipart body: {e}"),
        }]))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Internal(anyhow!("failed to read upload: {e}")))?;
            file = Some((bytes, content_type));
        }
    }

    let (bytes, content_type) =
        file.ok_or_else(|| AppError::Validation(vec![crate::errors::FieldViolation {
            field: "file".to_string(),
            message: "missing multipart field 'file'".to_string(),
        }]))?;

    let ext = ALLOWED_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| AppError::Validation(vec![crate::errors::FieldViolation {
            field: "file".to_string(),
            message: format!("unsupported content type '{content_type}'"),
        }]))?;

    let url = upload_image(&state, owner_id, bytes, &content_type, ext).await?;
    Ok(Json(UploadImageResponse { url }))
}

/// Uploads image bytes and returns the stable public URL.
pub async fn upload_image(
    state: &AppState,
    owner_id: Uuid,
    bytes: Bytes,
    content_type: &str,
    ext: &str,
) -> Result<String, AppError> {
    let key = format!("{IMAGE_KEY_PREFIX}{owner_id}/{}.{ext}", Uuid::new_v4());

    state
        .s3
        .put_object()
        .bucket(&state.config.s3_bucket)
        .key(&key)
        .body(ByteStream::from(bytes.to_vec()))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::Upstream(format!("S3 upload failed: {e}")))?;

    info!("Uploaded image to s3://{}/{}", state.config.s3_bucket, key);

    let base = state.config.asset_base_url.trim_end_matches('/');
    Ok(format!("{base}/{key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_url_accepted() {
        assert!(is_asset_url(
            "https://cdn.example.com/assets/images/abc/photo.png"
        ));
    }

    #[test]
    fn test_foreign_url_rejected() {
        assert!(!is_asset_url("https://example.com/photo.png"));
    }

    #[test]
    fn test_relative_path_rejected() {
        assert!(!is_asset_url("/assets/images/abc/photo.png"));
    }

    #[test]
    fn test_non_url_rejected() {
        assert!(!is_asset_url("not a url"));
    }
}
