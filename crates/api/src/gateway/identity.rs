//! Endpoints the gateway answers itself, about the calling identity.
//!
//! Authorization never reads the permission cache; it only backs
//! `/me/permissions` and is invalidated on logout and on permission change.

use std::sync::Arc;

use axum::{Extension, Json, extract::Path, http::StatusCode};
use serde::Serialize;

use stockroom_auth::{
    CacheError, Permission, PermissionCache, PermissionSet, Role, SubjectId, authorize,
};
use stockroom_core::StaffId;

use crate::context::ClaimsContext;
use crate::errors::ApiError;

use super::GatewayState;

const EDIT_USER: Permission = Permission::from_static("edit user");

/// Run one cache operation on the blocking pool. Backends such as redis do
/// synchronous network I/O.
async fn with_cache<T, F>(cache: Arc<dyn PermissionCache>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn PermissionCache) -> Result<T, CacheError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || op(cache.as_ref()))
        .await
        .map_err(|e| ApiError::Internal(format!("permission cache task failed: {e}")))?;
    Ok(result?)
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub subject: SubjectId,
    pub roles: Vec<Role>,
    pub staff_id: Option<StaffId>,
    pub permissions: PermissionSet,
}

pub async fn me(Extension(ctx): Extension<ClaimsContext>) -> Json<MeResponse> {
    Json(MeResponse {
        subject: ctx.subject().clone(),
        roles: ctx.roles().cloned().collect(),
        staff_id: ctx.staff_id(),
        permissions: ctx.permissions().clone(),
    })
}

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub subject: SubjectId,
    pub permissions: PermissionSet,
    pub cached: bool,
}

pub async fn my_permissions(
    Extension(state): Extension<GatewayState>,
    Extension(ctx): Extension<ClaimsContext>,
) -> Result<Json<PermissionsResponse>, ApiError> {
    let subject = ctx.subject().clone();
    let cached = with_cache(state.permission_cache.clone(), {
        let subject = subject.clone();
        move |cache| cache.get(&subject)
    })
    .await?;

    if let Some(permissions) = cached {
        return Ok(Json(PermissionsResponse {
            subject: ctx.subject().clone(),
            permissions,
            cached: true,
        }));
    }

    let permissions = ctx.permissions().clone();
    with_cache(state.permission_cache.clone(), {
        let (subject, permissions) = (subject.clone(), permissions.clone());
        move |cache| cache.put(&subject, &permissions)
    })
    .await?;
    Ok(Json(PermissionsResponse {
        subject,
        permissions,
        cached: false,
    }))
}

pub async fn logout(
    Extension(state): Extension<GatewayState>,
    Extension(ctx): Extension<ClaimsContext>,
) -> Result<StatusCode, ApiError> {
    let subject = ctx.subject().clone();
    with_cache(state.permission_cache.clone(), {
        let subject = subject.clone();
        move |cache| cache.invalidate(&subject)
    })
    .await?;
    tracing::info!(subject = %subject, "permission cache entry dropped on logout");
    Ok(StatusCode::NO_CONTENT)
}

/// Called after a subject's permissions change.
pub async fn invalidate_permission_cache(
    Extension(state): Extension<GatewayState>,
    Extension(ctx): Extension<ClaimsContext>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(ctx.claims(), Some(&EDIT_USER))?;

    let subject = SubjectId::from(user_id.as_str());
    with_cache(state.permission_cache.clone(), {
        let subject = subject.clone();
        move |cache| cache.invalidate(&subject)
    })
    .await?;
    tracing::info!(subject = %subject, by = %ctx.subject(), "permission cache entry invalidated");
    Ok(StatusCode::NO_CONTENT)
}
