use chrono::{DateTime, Utc};

use codegate_domain::id::ProjectId;
use codegate_domain::pagination::{Page, PageRequest};

use crate::domain::repository::ProjectRepository;
use crate::domain::types::Project;
use crate::error::CodegateError;

const MAX_NAME_LEN: usize = 100;

/// Load a project or fail with `ProjectNotFound`.
pub async fn load_project<P: ProjectRepository>(
    projects: &P,
    id: ProjectId,
) -> Result<Project, CodegateError> {
    projects
        .find_by_id(id)
        .await?
        .ok_or(CodegateError::ProjectNotFound)
}

fn validate_name(name: &str) -> Result<String, CodegateError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(CodegateError::validation(format!(
            "name must be 1 to {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_owned())
}

// ── CreateProject ────────────────────────────────────────────────────────────

pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct CreateProjectUseCase<P: ProjectRepository> {
    pub projects: P,
}

impl<P: ProjectRepository> CreateProjectUseCase<P> {
    pub async fn execute(&self, input: CreateProjectInput) -> Result<Project, CodegateError> {
        let now = Utc::now();
        let project = Project {
            id: ProjectId::new(),
            name: validate_name(&input.name)?,
            description: input.description,
            enabled: true,
            expires_at: input.expires_at,
            created_at: now,
            updated_at: now,
        };
        if !self.projects.create(&project).await? {
            return Err(CodegateError::ProjectAlreadyExists);
        }
        Ok(project)
    }
}

// ── GetProject ───────────────────────────────────────────────────────────────

pub struct GetProjectUseCase<P: ProjectRepository> {
    pub projects: P,
}

impl<P: ProjectRepository> GetProjectUseCase<P> {
    pub async fn execute(&self, id: ProjectId) -> Result<Project, CodegateError> {
        load_project(&self.projects, id).await
    }
}

// ── ListProjects ─────────────────────────────────────────────────────────────

pub struct ListProjectsUseCase<P: ProjectRepository> {
    pub projects: P,
}

impl<P: ProjectRepository> ListProjectsUseCase<P> {
    pub async fn execute(&self, page: PageRequest) -> Result<Page<Project>, CodegateError> {
        self.projects.list(page.clamped()).await
    }
}

// ── UpdateProject ────────────────────────────────────────────────────────────

/// Partial update. `expires_at: Some(None)` clears the expiry.
#[derive(Default)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub enabled: Option<bool>,
}

pub struct UpdateProjectUseCase<P: ProjectRepository> {
    pub projects: P,
}

impl<P: ProjectRepository> UpdateProjectUseCase<P> {
    pub async fn execute(
        &self,
        id: ProjectId,
        input: UpdateProjectInput,
    ) -> Result<Project, CodegateError> {
        let mut project = load_project(&self.projects, id).await?;

        if let Some(name) = input.name {
            let name = validate_name(&name)?;
            if name != project.name && self.projects.name_taken(&name, Some(id)).await? {
                return Err(CodegateError::ProjectAlreadyExists);
            }
            project.name = name;
        }
        if let Some(description) = input.description {
            project.description = description;
        }
        if let Some(expires_at) = input.expires_at {
            project.expires_at = expires_at;
        }
        if let Some(enabled) = input.enabled {
            project.enabled = enabled;
        }
        project.updated_at = Utc::now();

        self.projects.update(&project).await?;
        Ok(project)
    }
}

// ── DeleteProject ────────────────────────────────────────────────────────────

pub struct DeleteProjectUseCase<P: ProjectRepository> {
    pub projects: P,
}

impl<P: ProjectRepository> DeleteProjectUseCase<P> {
    pub async fn execute(&self, id: ProjectId) -> Result<(), CodegateError> {
        if !self.projects.delete(id).await? {
            return Err(CodegateError::ProjectNotFound);
        }
        Ok(())
    }
}
