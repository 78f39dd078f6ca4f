//! Routes for machine clients. Every handler runs behind
//! [`require_signature`](crate::middleware::require_signature) and is confined to the
//! project that owns the signing key.

use axum::{
    Extension, Json,
    extract::{Path, RawQuery, State},
};
use serde::Deserialize;
use tracing::debug;

use codegate_domain::id::{CodeId, ProjectId};
use codegate_domain::pagination::Page;

use crate::domain::types::{ApiKey, ClientInfo};
use crate::error::CodegateError;
use crate::handlers::codes::{
    CodeResponse, RedemptionResponse, get_code_response, list_codes_page, reactivate_code,
    verify_code,
};
use crate::handlers::logs::{StatisticsResponse, project_statistics};
use crate::handlers::projects::ProjectResponse;
use crate::middleware::AuthenticatedKey;
use crate::state::AppState;
use crate::usecase::code::CodeRef;
use crate::usecase::project::GetProjectUseCase;
use crate::usecase::verify::ReactivateCodeInput;

fn ensure_same_project(key: &ApiKey, project_id: ProjectId) -> Result<(), CodegateError> {
    if key.project_id != project_id {
        debug!(api_key_id = %key.id, %project_id, "api key used outside its project");
        return Err(CodegateError::Forbidden);
    }
    Ok(())
}

// ── GET /api/v1/sdk/projects/{project_id} ────────────────────────────────────

pub async fn get_project(
    Extension(AuthenticatedKey(key)): Extension<AuthenticatedKey>,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<ProjectResponse>, CodegateError> {
    ensure_same_project(&key, project_id)?;
    let usecase = GetProjectUseCase {
        projects: state.project_repo(),
    };
    Ok(Json(usecase.execute(project_id).await?.into()))
}

// ── GET /api/v1/sdk/projects/{project_id}/codes ──────────────────────────────

pub async fn list_codes(
    Extension(AuthenticatedKey(key)): Extension<AuthenticatedKey>,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<CodeResponse>>, CodegateError> {
    ensure_same_project(&key, project_id)?;
    Ok(Json(
        list_codes_page(&state, project_id, raw_query.as_deref()).await?,
    ))
}

// ── GET /api/v1/sdk/projects/{project_id}/codes/{code_id} ────────────────────

pub async fn get_code(
    Extension(AuthenticatedKey(key)): Extension<AuthenticatedKey>,
    State(state): State<AppState>,
    Path((project_id, code_id)): Path<(ProjectId, CodeId)>,
) -> Result<Json<CodeResponse>, CodegateError> {
    ensure_same_project(&key, project_id)?;
    Ok(Json(
        get_code_response(&state, project_id, CodeRef::Id(code_id)).await?,
    ))
}

// ── GET /api/v1/sdk/projects/{project_id}/codes/by-code/{code} ───────────────

pub async fn get_code_by_code(
    Extension(AuthenticatedKey(key)): Extension<AuthenticatedKey>,
    State(state): State<AppState>,
    Path((project_id, code)): Path<(ProjectId, String)>,
) -> Result<Json<CodeResponse>, CodegateError> {
    ensure_same_project(&key, project_id)?;
    Ok(Json(
        get_code_response(&state, project_id, CodeRef::Code(code)).await?,
    ))
}

// ── POST /api/v1/sdk/projects/{project_id}/codes/verify ──────────────────────

#[derive(Deserialize)]
pub struct SdkVerifyRequest {
    pub code: String,
    pub verified_by: Option<String>,
}

pub async fn verify(
    Extension(AuthenticatedKey(key)): Extension<AuthenticatedKey>,
    client: ClientInfo,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<SdkVerifyRequest>,
) -> Result<Json<RedemptionResponse>, CodegateError> {
    ensure_same_project(&key, project_id)?;
    let response = verify_code(
        &state,
        project_id,
        &body.code,
        body.verified_by.as_deref(),
        &client,
    )
    .await?;
    Ok(Json(response))
}

// ── POST /api/v1/sdk/projects/{project_id}/codes/reactivate ──────────────────

/// Exactly one of `code_id` and `code` identifies the target; `code_id` wins if both
/// are given.
#[derive(Deserialize)]
pub struct SdkReactivateRequest {
    pub code_id: Option<CodeId>,
    pub code: Option<String>,
    pub reason: Option<String>,
}

impl SdkReactivateRequest {
    fn target(&self) -> Result<CodeRef, CodegateError> {
        match (self.code_id, self.code.as_deref()) {
            (Some(id), _) => Ok(CodeRef::Id(id)),
            (None, Some(code)) if !code.is_empty() => Ok(CodeRef::Code(code.to_owned())),
            _ => Err(CodegateError::validation("code_id or code is required")),
        }
    }
}

pub async fn reactivate(
    Extension(AuthenticatedKey(key)): Extension<AuthenticatedKey>,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<SdkReactivateRequest>,
) -> Result<Json<RedemptionResponse>, CodegateError> {
    ensure_same_project(&key, project_id)?;
    let target = body.target()?;
    let actor = key.name.clone().unwrap_or_else(|| key.api_key.clone());
    let response = reactivate_code(
        &state,
        project_id,
        ReactivateCodeInput {
            target,
            reason: body.reason,
            actor: Some(actor),
        },
    )
    .await?;
    Ok(Json(response))
}

// ── GET /api/v1/sdk/projects/{project_id}/statistics ─────────────────────────

pub async fn statistics(
    Extension(AuthenticatedKey(key)): Extension<AuthenticatedKey>,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<StatisticsResponse>, CodegateError> {
    ensure_same_project(&key, project_id)?;
    Ok(Json(project_statistics(&state, project_id).await?))
}
