use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use codegate_auth_types::identity::AdminIdentity;
use codegate_domain::id::{CodeId, ProjectId};
use codegate_domain::pagination::{Page, PageRequest};

use crate::domain::types::{LogResult, VerificationLogEntry};
use crate::error::CodegateError;
use crate::handlers::parse_query;
use crate::state::AppState;
use crate::usecase::log::{ListLogsUseCase, ProjectStatistics, StatisticsUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LogResponse {
    pub id: Uuid,
    pub project_id: ProjectId,
    pub code_id: Option<CodeId>,
    pub code: String,
    #[serde(serialize_with = "codegate_core::serde::to_unix_secs")]
    pub verified_at: DateTime<Utc>,
    pub verified_by: Option<String>,
    pub result: &'static str,
    pub reason: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl From<VerificationLogEntry> for LogResponse {
    fn from(entry: VerificationLogEntry) -> Self {
        Self {
            id: entry.id,
            project_id: entry.project_id,
            code_id: entry.code_id,
            code: entry.code,
            verified_at: entry.verified_at,
            verified_by: entry.verified_by,
            result: entry.result.as_str(),
            reason: entry.reason,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
        }
    }
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub total: u64,
    pub used: u64,
    pub unused: u64,
    pub disabled: u64,
    pub expired: u64,
    pub usage_rate: f64,
    pub recent: Vec<LogResponse>,
}

impl From<ProjectStatistics> for StatisticsResponse {
    fn from(stats: ProjectStatistics) -> Self {
        let counts = stats.counts;
        Self {
            usage_rate: counts.usage_rate(),
            total: counts.total,
            used: counts.used,
            unused: counts.unused,
            disabled: counts.disabled,
            expired: counts.expired,
            recent: stats.recent.into_iter().map(LogResponse::from).collect(),
        }
    }
}

pub(crate) async fn project_statistics(
    state: &AppState,
    project_id: ProjectId,
) -> Result<StatisticsResponse, CodegateError> {
    let usecase = StatisticsUseCase {
        projects: state.project_repo(),
        codes: state.code_repo(),
        logs: state.log_repo(),
    };
    Ok(usecase.execute(project_id).await?.into())
}

// ── GET /api/v1/admin/projects/{project_id}/logs ─────────────────────────────

#[derive(Deserialize, Default)]
pub struct LogListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// `success`, `failed` or `reactivated`.
    pub result: Option<String>,
}

pub async fn list_logs(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<LogResponse>>, CodegateError> {
    let query: LogListQuery = parse_query(raw_query.as_deref())?;
    let result = query
        .result
        .as_deref()
        .filter(|r| !r.is_empty())
        .map(str::parse::<LogResult>)
        .transpose()
        .map_err(CodegateError::Validation)?;
    let default = PageRequest::default();
    let page = PageRequest::new(
        query.page.unwrap_or(default.page),
        query.page_size.unwrap_or(default.page_size),
    );

    let usecase = ListLogsUseCase {
        projects: state.project_repo(),
        logs: state.log_repo(),
    };
    let logs = usecase.execute(project_id, result, page).await?;
    Ok(Json(logs.map(LogResponse::from)))
}

// ── GET /api/v1/admin/projects/{project_id}/statistics ───────────────────────

pub async fn get_statistics(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<StatisticsResponse>, CodegateError> {
    Ok(Json(project_statistics(&state, project_id).await?))
}
