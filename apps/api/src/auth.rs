//! Owner identity extraction.
//!
//! Credential verification happens upstream (API gateway / auth service);
//! by the time a request reaches this process the caller's account id has
//! been resolved and placed in the `x-owner-id` header. The core trusts
//! that value unconditionally and scopes every storage key by it.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::errors::AppError;

pub const OWNER_HEADER: &str = "x-owner-id";

/// The authenticated account on whose partition this request operates.
#[derive(Debug, Clone, Copy)]
pub struct OwnerId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let owner = Uuid::parse_str(raw).map_err(|_| AppError::Unauthorized)?;
        Ok(OwnerId(owner))
    }
}
