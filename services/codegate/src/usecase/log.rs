use chrono::Utc;

use codegate_domain::id::ProjectId;
use codegate_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{CodeRepository, ProjectRepository, VerificationLogRepository};
use crate::domain::types::{CodeCounts, LogResult, RECENT_VERIFICATIONS, VerificationLogEntry};
use crate::error::CodegateError;
use crate::usecase::project::load_project;

// ── ListVerificationLogs ─────────────────────────────────────────────────────

pub struct ListLogsUseCase<P: ProjectRepository, L: VerificationLogRepository> {
    pub projects: P,
    pub logs: L,
}

impl<P: ProjectRepository, L: VerificationLogRepository> ListLogsUseCase<P, L> {
    pub async fn execute(
        &self,
        project_id: ProjectId,
        result: Option<LogResult>,
        page: PageRequest,
    ) -> Result<Page<VerificationLogEntry>, CodegateError> {
        load_project(&self.projects, project_id).await?;
        self.logs.list(project_id, result, page.clamped()).await
    }
}

// ── ProjectStatistics ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProjectStatistics {
    pub counts: CodeCounts,
    pub recent: Vec<VerificationLogEntry>,
}

pub struct StatisticsUseCase<P, C, L>
where
    P: ProjectRepository,
    C: CodeRepository,
    L: VerificationLogRepository,
{
    pub projects: P,
    pub codes: C,
    pub logs: L,
}

impl<P, C, L> StatisticsUseCase<P, C, L>
where
    P: ProjectRepository,
    C: CodeRepository,
    L: VerificationLogRepository,
{
    pub async fn execute(&self, project_id: ProjectId) -> Result<ProjectStatistics, CodegateError> {
        let project = load_project(&self.projects, project_id).await?;
        let counts = self
            .codes
            .counts(project_id, project.expires_at, Utc::now())
            .await?;
        let recent = self.logs.recent(project_id, RECENT_VERIFICATIONS).await?;
        Ok(ProjectStatistics { counts, recent })
    }
}
