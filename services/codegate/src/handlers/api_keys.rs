use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use codegate_auth_types::identity::AdminIdentity;
use codegate_domain::id::{ApiKeyId, ProjectId};

use crate::domain::types::ApiKey;
use crate::error::CodegateError;
use crate::state::AppState;
use crate::usecase::api_key::{
    DeleteApiKeyUseCase, GenerateApiKeyUseCase, ListApiKeysUseCase, ToggleApiKeyUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// Key metadata. The secret is never part of it.
#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub id: ApiKeyId,
    pub project_id: ProjectId,
    pub api_key: String,
    pub name: Option<String>,
    pub is_active: bool,
    #[serde(serialize_with = "codegate_core::serde::to_unix_secs_opt")]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "codegate_core::serde::to_unix_secs")]
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            project_id: key.project_id,
            api_key: key.api_key,
            name: key.name,
            is_active: key.is_active,
            last_used_at: key.last_used_at,
            created_at: key.created_at,
            created_by: key.created_by,
        }
    }
}

/// Returned once, right after issuing.
#[derive(Serialize)]
pub struct IssuedApiKeyResponse {
    #[serde(flatten)]
    pub key: ApiKeyResponse,
    pub secret: String,
}

// ── GET /api/v1/admin/projects/{project_id}/api-keys ─────────────────────────

pub async fn list_api_keys(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<Vec<ApiKeyResponse>>, CodegateError> {
    let usecase = ListApiKeysUseCase {
        projects: state.project_repo(),
        keys: state.api_key_repo(),
    };
    let keys = usecase.execute(project_id).await?;
    Ok(Json(keys.into_iter().map(ApiKeyResponse::from).collect()))
}

// ── POST /api/v1/admin/projects/{project_id}/api-keys ────────────────────────

#[derive(Deserialize, Default)]
pub struct CreateApiKeyRequest {
    pub name: Option<String>,
}

pub async fn create_or_refresh_api_key(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<IssuedApiKeyResponse>), CodegateError> {
    let usecase = GenerateApiKeyUseCase {
        projects: state.project_repo(),
        keys: state.api_key_repo(),
    };
    let mut key = usecase
        .execute(project_id, body.name, &admin.admin_id)
        .await?;
    let secret = std::mem::take(&mut key.secret);
    Ok((
        StatusCode::CREATED,
        Json(IssuedApiKeyResponse {
            key: key.into(),
            secret,
        }),
    ))
}

// ── PATCH /api/v1/admin/projects/{project_id}/api-keys/{key_id} ──────────────

#[derive(Deserialize)]
pub struct ToggleApiKeyRequest {
    pub is_active: bool,
}

pub async fn toggle_api_key(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path((project_id, key_id)): Path<(ProjectId, ApiKeyId)>,
    Json(body): Json<ToggleApiKeyRequest>,
) -> Result<Json<ApiKeyResponse>, CodegateError> {
    let usecase = ToggleApiKeyUseCase {
        keys: state.api_key_repo(),
    };
    let key = usecase
        .execute(project_id, key_id, body.is_active)
        .await?;
    info!(%project_id, api_key_id = %key_id, admin_id = %admin.admin_id, "api key toggled by admin");
    Ok(Json(key.into()))
}

// ── DELETE /api/v1/admin/projects/{project_id}/api-keys/{key_id} ─────────────

pub async fn delete_api_key(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path((project_id, key_id)): Path<(ProjectId, ApiKeyId)>,
) -> Result<StatusCode, CodegateError> {
    let usecase = DeleteApiKeyUseCase {
        keys: state.api_key_repo(),
    };
    usecase.execute(project_id, key_id).await?;
    info!(%project_id, api_key_id = %key_id, admin_id = %admin.admin_id, "api key deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
