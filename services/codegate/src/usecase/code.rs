use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use codegate_domain::id::{CodeId, ProjectId};
use codegate_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{CodeRepository, ProjectRepository};
use crate::domain::types::{Code, CodeFilter, MAX_GENERATE_COUNT, Project};
use crate::error::CodegateError;
use crate::usecase::generator::{CodeGenerator, GeneratorParams, MAX_COLLISION_ROUNDS};
use crate::usecase::project::load_project;

// ── GenerateCodes ────────────────────────────────────────────────────────────

pub struct GenerateCodesInput {
    pub count: u32,
    /// Own expiry for the new codes. `None` leaves them on the project's expiry.
    pub expires_at: Option<DateTime<Utc>>,
    pub params: GeneratorParams,
}

pub struct GenerateCodesUseCase<P: ProjectRepository, C: CodeRepository> {
    pub projects: P,
    pub codes: C,
    pub default_length: usize,
}

impl<P: ProjectRepository, C: CodeRepository> GenerateCodesUseCase<P, C> {
    pub async fn execute(
        &self,
        project_id: ProjectId,
        input: GenerateCodesInput,
    ) -> Result<(Project, Vec<Code>), CodegateError> {
        if input.count == 0 || input.count > MAX_GENERATE_COUNT {
            return Err(CodegateError::validation(format!(
                "count must be between 1 and {MAX_GENERATE_COUNT}"
            )));
        }
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| CodegateError::validation("project not found"))?;
        if !project.enabled {
            return Err(CodegateError::validation("project is disabled"));
        }
        let now = Utc::now();
        if input.expires_at.is_some_and(|exp| exp <= now) {
            return Err(CodegateError::validation("expires_at must be in the future"));
        }

        let generator = CodeGenerator::new(&input.params, self.default_length, input.count)?;
        let codes = self
            .insert_unique(&generator, &project, input.count as usize, input.expires_at, now)
            .await?;

        info!(project_id = %project.id, count = codes.len(), "codes generated");
        Ok((project, codes))
    }

    /// Draw strings until `count` of them are unknown to storage and stored, re-drawing
    /// only the ones that collided, either with stored codes or with a concurrent insert.
    async fn insert_unique(
        &self,
        generator: &CodeGenerator,
        project: &Project,
        count: usize,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Code>, CodegateError> {
        let project_id = project.id;
        let mut taken: HashSet<String> = HashSet::new();
        let mut accepted: Vec<String> = Vec::with_capacity(count);

        for round in 1..=MAX_COLLISION_ROUNDS {
            let batch = generator.fresh_batch(count - accepted.len(), &taken)?;
            let existing: HashSet<String> = self
                .codes
                .find_existing(project_id, &batch)
                .await?
                .into_iter()
                .collect();

            let collisions = existing.len();
            for code in batch {
                taken.insert(code.clone());
                if !existing.contains(&code) {
                    accepted.push(code);
                }
            }
            if accepted.len() < count {
                debug!(%project_id, round, collisions, "regenerating codes that collided");
                continue;
            }

            let codes: Vec<Code> = accepted
                .iter()
                .map(|code| Code {
                    id: CodeId::new(),
                    project_id,
                    code: code.clone(),
                    used: false,
                    is_disabled: false,
                    expires_at,
                    verified_at: None,
                    verified_by: None,
                    created_at: now,
                })
                .collect();
            if self.codes.insert_many(&codes).await? {
                return Ok(codes);
            }

            // Another generate stored one of our strings after the existence check.
            let stored: HashSet<String> = self
                .codes
                .find_existing(project_id, &accepted)
                .await?
                .into_iter()
                .collect();
            debug!(%project_id, round, collisions = stored.len(), "insert raced, regenerating");
            accepted.retain(|code| !stored.contains(code));
        }
        Err(CodegateError::CodeGenerationExhausted)
    }
}

// ── GetCode ──────────────────────────────────────────────────────────────────

/// Target of a single-code lookup.
#[derive(Debug, Clone)]
pub enum CodeRef {
    Id(CodeId),
    Code(String),
}

pub struct GetCodeUseCase<P: ProjectRepository, C: CodeRepository> {
    pub projects: P,
    pub codes: C,
}

impl<P: ProjectRepository, C: CodeRepository> GetCodeUseCase<P, C> {
    /// Returns the code together with its project, which callers need to derive the
    /// effective state.
    pub async fn execute(
        &self,
        project_id: ProjectId,
        target: CodeRef,
    ) -> Result<(Project, Code), CodegateError> {
        let project = load_project(&self.projects, project_id).await?;
        let code = match target {
            CodeRef::Id(id) => self.codes.find_by_id(project_id, id).await?,
            CodeRef::Code(code) => self.codes.find_by_code(project_id, &code).await?,
        };
        let code = code.ok_or(CodegateError::CodeNotFound)?;
        Ok((project, code))
    }
}

// ── ListCodes ────────────────────────────────────────────────────────────────

pub struct ListCodesUseCase<P: ProjectRepository, C: CodeRepository> {
    pub projects: P,
    pub codes: C,
}

impl<P: ProjectRepository, C: CodeRepository> ListCodesUseCase<P, C> {
    pub async fn execute(
        &self,
        project_id: ProjectId,
        filter: &CodeFilter,
        page: PageRequest,
    ) -> Result<(Project, Page<Code>), CodegateError> {
        let project = load_project(&self.projects, project_id).await?;
        let page = self
            .codes
            .list(project_id, project.expires_at, filter, page.clamped(), Utc::now())
            .await?;
        Ok((project, page))
    }
}

// ── SetCodeDisabled ──────────────────────────────────────────────────────────

pub struct SetCodeDisabledUseCase<P: ProjectRepository, C: CodeRepository> {
    pub projects: P,
    pub codes: C,
}

impl<P: ProjectRepository, C: CodeRepository> SetCodeDisabledUseCase<P, C> {
    /// Valid in any state; disabling a used code also blocks its reactivation.
    pub async fn execute(
        &self,
        project_id: ProjectId,
        id: CodeId,
        disabled: bool,
    ) -> Result<(Project, Code), CodegateError> {
        let project = load_project(&self.projects, project_id).await?;
        let code = self
            .codes
            .set_disabled(project_id, id, disabled)
            .await?
            .ok_or(CodegateError::CodeNotFound)?;
        info!(%project_id, code_id = %id, disabled, "code disabled flag set");
        Ok((project, code))
    }
}

// ── DeleteCode ───────────────────────────────────────────────────────────────

pub struct DeleteCodeUseCase<C: CodeRepository> {
    pub codes: C,
}

impl<C: CodeRepository> DeleteCodeUseCase<C> {
    pub async fn execute(&self, project_id: ProjectId, id: CodeId) -> Result<(), CodegateError> {
        if !self.codes.delete(project_id, id).await? {
            return Err(CodegateError::CodeNotFound);
        }
        info!(%project_id, code_id = %id, "code deleted");
        Ok(())
    }
}

// ── BatchDisableUnused ───────────────────────────────────────────────────────

pub struct BatchDisableUnusedUseCase<P: ProjectRepository, C: CodeRepository> {
    pub projects: P,
    pub codes: C,
}

impl<P: ProjectRepository, C: CodeRepository> BatchDisableUnusedUseCase<P, C> {
    /// Read-only preview: how many codes [`execute`](Self::execute) would disable now.
    pub async fn count(
        &self,
        project_id: ProjectId,
        filter: &CodeFilter,
    ) -> Result<u64, CodegateError> {
        let project = load_project(&self.projects, project_id).await?;
        self.codes
            .count_disable_candidates(project_id, project.expires_at, filter, Utc::now())
            .await
    }

    pub async fn execute(
        &self,
        project_id: ProjectId,
        filter: &CodeFilter,
    ) -> Result<u64, CodegateError> {
        let project = load_project(&self.projects, project_id).await?;
        let disabled = self
            .codes
            .disable_unused(project_id, project.expires_at, filter, Utc::now())
            .await?;
        info!(%project_id, disabled, "unused codes batch-disabled");
        Ok(disabled)
    }
}
