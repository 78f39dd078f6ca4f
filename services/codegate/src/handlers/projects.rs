use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use codegate_auth_types::identity::AdminIdentity;
use codegate_domain::id::ProjectId;
use codegate_domain::pagination::{Page, PageRequest};

use crate::domain::types::Project;
use crate::error::CodegateError;
use crate::handlers::{double_option, parse_query, parse_unix_secs};
use crate::state::AppState;
use crate::usecase::project::{
    CreateProjectInput, CreateProjectUseCase, DeleteProjectUseCase, GetProjectUseCase,
    ListProjectsUseCase, UpdateProjectInput, UpdateProjectUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    /// `true` = enabled.
    pub status: bool,
    pub is_expired: bool,
    #[serde(serialize_with = "codegate_core::serde::to_unix_secs_opt")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "codegate_core::serde::to_unix_secs")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "codegate_core::serde::to_unix_secs")]
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            is_expired: project.is_expired(Utc::now()),
            id: project.id,
            name: project.name,
            description: project.description,
            status: project.enabled,
            expires_at: project.expires_at,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

// ── POST /api/v1/admin/projects ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    /// Unix seconds.
    pub expires_at: Option<i64>,
}

pub async fn create_project(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), CodegateError> {
    let usecase = CreateProjectUseCase {
        projects: state.project_repo(),
    };
    let project = usecase
        .execute(CreateProjectInput {
            name: body.name,
            description: body.description,
            expires_at: body.expires_at.map(parse_unix_secs).transpose()?,
        })
        .await?;
    info!(project_id = %project.id, admin_id = %admin.admin_id, "project created");
    Ok((StatusCode::CREATED, Json(project.into())))
}

// ── GET /api/v1/admin/projects ───────────────────────────────────────────────

pub async fn list_projects(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Page<ProjectResponse>>, CodegateError> {
    let page: PageRequest = parse_query(raw_query.as_deref())?;
    let usecase = ListProjectsUseCase {
        projects: state.project_repo(),
    };
    let projects = usecase.execute(page).await?;
    Ok(Json(projects.map(ProjectResponse::from)))
}

// ── GET /api/v1/admin/projects/{project_id} ──────────────────────────────────

pub async fn get_project(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<ProjectResponse>, CodegateError> {
    let usecase = GetProjectUseCase {
        projects: state.project_repo(),
    };
    Ok(Json(usecase.execute(project_id).await?.into()))
}

// ── PATCH /api/v1/admin/projects/{project_id} ────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    /// Unix seconds; `null` removes the expiry.
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<i64>>,
    pub status: Option<bool>,
}

pub async fn update_project(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    Json(body): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, CodegateError> {
    let expires_at = match body.expires_at {
        Some(Some(secs)) => Some(Some(parse_unix_secs(secs)?)),
        Some(None) => Some(None),
        None => None,
    };
    let usecase = UpdateProjectUseCase {
        projects: state.project_repo(),
    };
    let project = usecase
        .execute(
            project_id,
            UpdateProjectInput {
                name: body.name,
                description: body.description,
                expires_at,
                enabled: body.status,
            },
        )
        .await?;
    info!(%project_id, admin_id = %admin.admin_id, "project updated");
    Ok(Json(project.into()))
}

// ── DELETE /api/v1/admin/projects/{project_id} ───────────────────────────────

pub async fn delete_project(
    admin: AdminIdentity,
    State(state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> Result<StatusCode, CodegateError> {
    let usecase = DeleteProjectUseCase {
        projects: state.project_repo(),
    };
    usecase.execute(project_id).await?;
    info!(%project_id, admin_id = %admin.admin_id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}
