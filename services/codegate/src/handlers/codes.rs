use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use codegate_auth_types::identity::AdminIdentity;
use codegate_domain::id::{CodeId, ProjectId};
use codegate_domain::pagination::{Page, PageRequest};

use crate::domain::types::{ClientInfo, Code, CodeFilter};
use crate::error::CodegateError;
use crate::handlers::{parse_query, parse_unix_secs};
use crate::state::AppState;
use crate::usecase::code::{
    BatchDisableUnusedUseCase, CodeRef, DeleteCodeUseCase, GenerateCodesInput,
    GenerateCodesUseCase, GetCodeUseCase, ListCodesUseCase, SetCodeDisabledUseCase,
};
use crate::usecase::generator::GeneratorParams;
use crate::usecase::verify::{
    ReactivateCodeInput, ReactivateCodeUseCase, Redemption, VerifyCodeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CodeResponse {
    pub id: CodeId,
    pub project_id: ProjectId,
    pub code: String,
    /// `true` = used.
    pub status: bool,
    pub is_disabled: bool,
    pub is_expired: bool,
    /// Effective state: `expired`, `disabled`, `used` or `unused`.
    pub state: &'static str,
    /// Effective expiry (the project's when the code has none of its own).
    #[serde(serialize_with = "codegate_core::serde::to_unix_secs_opt")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "codegate_core::serde::to_unix_secs_opt")]
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    #[serde(serialize_with = "codegate_core::serde::to_unix_secs")]
    pub created_at: DateTime<Utc>,
}

impl CodeResponse {
    pub fn new(code: Code, project_expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        Self {
            is_expired: code.is_expired(project_expires_at, now),
            state: code.state(project_expires_at, now).as_str(),
            expires_at: code.effective_expires_at(project_expires_at),
            id: code.id,
            project_id: code.project_id,
            code: code.code,
            status: code.used,
            is_disabled: code.is_disabled,
            verified_at: code.verified_at,
            verified_by: code.verified_by,
            created_at: code.created_at,
        }
    }
}

/// `{success, message, error_code?, code?}`, always with HTTP 200.
#[derive(Serialize)]
pub struct RedemptionResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeResponse>,
}

impl RedemptionResponse {
    pub fn new(
        redemption: Redemption,
        success_message: &'static str,
        project_expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        match redemption {
            Redemption::Accepted(code) => Self {
                success: true,
                message: success_message,
                error_code: None,
                code: Some(CodeResponse::new(code, project_expires_at, Utc::now())),
            },
            Redemption::Rejected(rejection) => Self {
                success: false,
                message: rejection.message(),
                error_code: Some(rejection.error_code()),
                code: None,
            },
        }
    }
}

// ── Query params ─────────────────────────────────────────────────────────────

/// Filters shared by listing, batch-disable and its preview.
#[derive(Deserialize, Default)]
pub struct CodeListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// `used` or `unused`.
    pub status: Option<String>,
    pub is_disabled: Option<bool>,
    pub is_expired: Option<bool>,
    pub search: Option<String>,
}

impl CodeListQuery {
    pub fn filter(&self) -> Result<CodeFilter, CodegateError> {
        let used = match self.status.as_deref() {
            None | Some("") => None,
            Some("used") => Some(true),
            Some("unused") => Some(false),
            Some(other) => {
                return Err(CodegateError::validation(format!(
                    "status must be 'used' or 'unused', got '{other}'"
                )));
            }
        };
        Ok(CodeFilter {
            used,
            is_disabled: self.is_disabled,
            is_expired: self.is_expired,
            search: self.search.clone().filter(|s| !s.is_empty()),
        })
    }

    pub fn page(&self) -> PageRequest {
        let default = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(default.page),
            self.page_size.unwrap_or(default.page_size),
        )
    }
}

pub(crate) async fn list_codes_page(
    state: &AppState,
    project_id: ProjectId,
    raw_query: Option<&str>,
) -> Result<Page<CodeResponse>, CodegateError> {
    let query: CodeListQuery = parse_query(raw_query)?;
    let usecase = ListCodesUseCase {
        projects: state.project_repo(),
        codes: state.code_repo(),
    };
    let (project, page) = usecase
        .execute(project_id, &query.filter()?, query.page())
        .await?;
    let now = Utc::now();
    Ok(page.map(|code| CodeResponse::new(code, project.expires_at, now)))
}

pub(crate) async fn get_code_response(
    state: &AppState,
    project_id: ProjectId,
    target: CodeRef,
) -> Result<CodeResponse, CodegateError> {
    let usecase = GetCodeUseCase {
        projects: state.project_repo(),
        codes: state.code_repo(),
    };
    let (project, code) = usecase.execute(project_id, target).await?;
    Ok(CodeResponse::new(code, project.expires_at, Utc::now()))
}

pub(crate) async fn verify_code(
    state: &AppState,
    project_id: ProjectId,
    code: &str,
    verified_by: Option<&str>,
    client: &ClientInfo,
) -> Result<RedemptionResponse, CodegateError> {
    let usecase = VerifyCodeUseCase {
        projects: state.project_repo(),
        codes: state.code_repo(),
        logs: state.log_repo(),
    };
    let (project, redemption) = usecase
        .execute(project_id, code, verified_by, client)
        .await?;
    Ok(RedemptionResponse::new(
        redemption,
        "code verified",
        project.expires_at,
    ))
}

pub(crate) async fn reactivate_code(
    state: &AppState,
    project_id: ProjectId,
    input: ReactivateCodeInput,
) -> Result<RedemptionResponse, CodegateError> {
    let usecase = ReactivateCodeUseCase {
        projects: state.project_repo(),
        codes: state.code_repo(),
    };
    let (project, redemption) = usecase.execute(project_id, input).await?;
    Ok(RedemptionResponse::new(
        redemption,
        "code reactivated",
        project.expires_at,
    ))
}

// ── POST /api/v1/admin/projects/{project_id}/codes ───────────────────────────

#[derive(Deserialize)]
pub struct GenerateCodesRequest {
    pub count: u32,
    /// Unix seconds. Omit to follow the project's expiry.
    pub expires_at: Option<i64>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub length: Option<usize>,
}

#[derive(Serialize)]
pub struct GenerateCodesResponse {
    pub count: usize,
    pub items: Vec<CodeResponse>,
}

pub async fn generate_codes(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<GenerateCodesRequest>,
) -> Result<(StatusCode, Json<GenerateCodesResponse>), CodegateError> {
    let usecase = GenerateCodesUseCase {
        projects: state.project_repo(),
        codes: state.code_repo(),
        default_length: state.code_length,
    };
    let (project, codes) = usecase
        .execute(
            project_id,
            GenerateCodesInput {
                count: body.count,
                expires_at: body.expires_at.map(parse_unix_secs).transpose()?,
                params: GeneratorParams {
                    prefix: body.prefix,
                    suffix: body.suffix,
                    length: body.length,
                },
            },
        )
        .await?;
    info!(%project_id, admin_id = %admin.admin_id, count = codes.len(), "codes generated by admin");

    let now = Utc::now();
    let items: Vec<CodeResponse> = codes
        .into_iter()
        .map(|code| CodeResponse::new(code, project.expires_at, now))
        .collect();
    Ok((
        StatusCode::CREATED,
        Json(GenerateCodesResponse {
            count: items.len(),
            items,
        }),
    ))
}

// ── GET /api/v1/admin/projects/{project_id}/codes ────────────────────────────

pub async fn list_codes(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<CodeResponse>>, CodegateError> {
    Ok(Json(
        list_codes_page(&state, project_id, raw_query.as_deref()).await?,
    ))
}

// ── GET /api/v1/admin/projects/{project_id}/codes/{code_id} ──────────────────

pub async fn get_code(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path((project_id, code_id)): Path<(ProjectId, CodeId)>,
) -> Result<Json<CodeResponse>, CodegateError> {
    Ok(Json(
        get_code_response(&state, project_id, CodeRef::Id(code_id)).await?,
    ))
}

// ── DELETE /api/v1/admin/projects/{project_id}/codes/{code_id} ───────────────

pub async fn delete_code(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path((project_id, code_id)): Path<(ProjectId, CodeId)>,
) -> Result<StatusCode, CodegateError> {
    let usecase = DeleteCodeUseCase {
        codes: state.code_repo(),
    };
    usecase.execute(project_id, code_id).await?;
    info!(%project_id, %code_id, admin_id = %admin.admin_id, "code deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}

// ── PATCH /api/v1/admin/projects/{project_id}/codes/{code_id}/disabled ───────

#[derive(Deserialize)]
pub struct SetDisabledRequest {
    pub is_disabled: bool,
}

pub async fn set_code_disabled(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path((project_id, code_id)): Path<(ProjectId, CodeId)>,
    Json(body): Json<SetDisabledRequest>,
) -> Result<Json<CodeResponse>, CodegateError> {
    let usecase = SetCodeDisabledUseCase {
        projects: state.project_repo(),
        codes: state.code_repo(),
    };
    let (project, code) = usecase
        .execute(project_id, code_id, body.is_disabled)
        .await?;
    Ok(Json(CodeResponse::new(code, project.expires_at, Utc::now())))
}

// ── POST /api/v1/admin/projects/{project_id}/codes/{code_id}/reactivate ──────

/// The body is optional: a request without a JSON content type reactivates with no reason.
#[derive(Deserialize, Default)]
pub struct AdminReactivateRequest {
    pub reason: Option<String>,
}

pub async fn admin_reactivate_code(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path((project_id, code_id)): Path<(ProjectId, CodeId)>,
    body: Option<Json<AdminReactivateRequest>>,
) -> Result<Json<RedemptionResponse>, CodegateError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let response = reactivate_code(
        &state,
        project_id,
        ReactivateCodeInput {
            target: CodeRef::Id(code_id),
            reason: body.reason,
            actor: Some(admin.admin_id),
        },
    )
    .await?;
    Ok(Json(response))
}

// ── POST /api/v1/admin/projects/{project_id}/codes/verify ────────────────────

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub code: String,
    pub verified_by: Option<String>,
}

pub async fn admin_verify_code(
    admin: AdminIdentity,
    client: ClientInfo,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<RedemptionResponse>, CodegateError> {
    let verified_by = body.verified_by.unwrap_or(admin.admin_id);
    let response = verify_code(
        &state,
        project_id,
        &body.code,
        Some(&verified_by),
        &client,
    )
    .await?;
    Ok(Json(response))
}

// ── Batch disable ────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DisableCountResponse {
    pub count: u64,
}

#[derive(Serialize)]
pub struct BatchDisableResponse {
    pub disabled_count: u64,
}

/// `GET .../codes/batch-disable-unused/count`, read-only preview.
pub async fn count_disable_candidates(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<DisableCountResponse>, CodegateError> {
    let query: CodeListQuery = parse_query(raw_query.as_deref())?;
    let usecase = BatchDisableUnusedUseCase {
        projects: state.project_repo(),
        codes: state.code_repo(),
    };
    let count = usecase.count(project_id, &query.filter()?).await?;
    Ok(Json(DisableCountResponse { count }))
}

/// `POST .../codes/batch-disable-unused`, taking the same query filters as the preview.
pub async fn batch_disable_unused(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<BatchDisableResponse>, CodegateError> {
    let query: CodeListQuery = parse_query(raw_query.as_deref())?;
    let usecase = BatchDisableUnusedUseCase {
        projects: state.project_repo(),
        codes: state.code_repo(),
    };
    let disabled_count = usecase.execute(project_id, &query.filter()?).await?;
    info!(%project_id, admin_id = %admin.admin_id, disabled_count, "batch disable by admin");
    Ok(Json(BatchDisableResponse { disabled_count }))
}
