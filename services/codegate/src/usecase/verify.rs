use chrono::{DateTime, Utc};
use tracing::{debug, info};

use codegate_domain::id::ProjectId;

use crate::domain::repository::{CodeRepository, ProjectRepository, VerificationLogRepository};
use crate::domain::types::{
    ClientInfo, Code, CodeRejection, LogResult, Project, VerificationLogEntry,
};
use crate::error::CodegateError;
use crate::usecase::code::CodeRef;
use crate::usecase::project::load_project;

/// Result of a verify or reactivate attempt. Rejections are expected outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redemption {
    Accepted(Code),
    Rejected(CodeRejection),
}

impl Redemption {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn rejection(&self) -> Option<CodeRejection> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(r) => Some(*r),
        }
    }
}

/// Classify a code that a conditional update just refused to touch.
fn classify_lost_race(current: Option<&Code>, fallback: CodeRejection) -> CodeRejection {
    match current {
        None => CodeRejection::NotFound,
        Some(c) if c.is_disabled => CodeRejection::Disabled,
        Some(_) => fallback,
    }
}

// ── VerifyCode ───────────────────────────────────────────────────────────────

/// One verification attempt as presented by the caller.
#[derive(Clone, Copy)]
struct Attempt<'a> {
    code: &'a str,
    verified_by: Option<&'a str>,
    client: &'a ClientInfo,
}

pub struct VerifyCodeUseCase<P, C, L>
where
    P: ProjectRepository,
    C: CodeRepository,
    L: VerificationLogRepository,
{
    pub projects: P,
    pub codes: C,
    pub logs: L,
}

impl<P, C, L> VerifyCodeUseCase<P, C, L>
where
    P: ProjectRepository,
    C: CodeRepository,
    L: VerificationLogRepository,
{
    /// Consume `code` exactly once. Every attempt is logged with the caller's client
    /// info, whatever the outcome. The project comes back alongside so callers can render
    /// effective state.
    pub async fn execute(
        &self,
        project_id: ProjectId,
        code: &str,
        verified_by: Option<&str>,
        client: &ClientInfo,
    ) -> Result<(Project, Redemption), CodegateError> {
        let project = load_project(&self.projects, project_id).await?;
        let attempt = Attempt {
            code,
            verified_by,
            client,
        };
        let redemption = self.redeem(&project, &attempt).await?;
        Ok((project, redemption))
    }

    async fn redeem(
        &self,
        project: &Project,
        attempt: &Attempt<'_>,
    ) -> Result<Redemption, CodegateError> {
        let Attempt {
            code, verified_by, ..
        } = *attempt;
        let project_id = project.id;
        let now = Utc::now();

        if !project.enabled {
            return self
                .reject(project_id, None, attempt, CodeRejection::ProjectDisabled, now)
                .await;
        }

        let Some(mut found) = self.codes.find_by_code(project_id, code).await? else {
            return self
                .reject(project_id, None, attempt, CodeRejection::NotFound, now)
                .await;
        };

        let rejection = if found.is_disabled {
            Some(CodeRejection::Disabled)
        } else if found.is_expired(project.expires_at, now) {
            Some(CodeRejection::Expired)
        } else if found.used {
            Some(CodeRejection::AlreadyUsed)
        } else {
            None
        };
        if let Some(rejection) = rejection {
            return self
                .reject(project_id, Some(&found), attempt, rejection, now)
                .await;
        }

        let log = VerificationLogEntry::new(
            project_id,
            Some(found.id),
            code,
            verified_by,
            LogResult::Success,
            None,
            now,
        )
        .with_client(attempt.client);
        if self.codes.mark_used(found.id, verified_by, now, &log).await? {
            info!(%project_id, code_id = %found.id, "code verified");
            found.used = true;
            found.verified_at = Some(now);
            found.verified_by = verified_by.map(str::to_owned);
            return Ok(Redemption::Accepted(found));
        }

        // Another caller flipped the code between our read and the conditional update.
        let current = self.codes.find_by_id(project_id, found.id).await?;
        let rejection = classify_lost_race(current.as_ref(), CodeRejection::AlreadyUsed);
        self.reject(project_id, current.as_ref(), attempt, rejection, now)
            .await
    }

    async fn reject(
        &self,
        project_id: ProjectId,
        found: Option<&Code>,
        attempt: &Attempt<'_>,
        rejection: CodeRejection,
        at: DateTime<Utc>,
    ) -> Result<Redemption, CodegateError> {
        debug!(%project_id, reason = rejection.error_code(), "code verification rejected");
        let entry = VerificationLogEntry::new(
            project_id,
            found.map(|c| c.id),
            attempt.code,
            attempt.verified_by,
            LogResult::Failed,
            Some(rejection.error_code()),
            at,
        )
        .with_client(attempt.client);
        self.logs.append(&entry).await?;
        Ok(Redemption::Rejected(rejection))
    }
}

// ── ReactivateCode ───────────────────────────────────────────────────────────

pub struct ReactivateCodeInput {
    pub target: CodeRef,
    pub reason: Option<String>,
    /// Who asked for the reactivation; recorded in the log entry.
    pub actor: Option<String>,
}

pub struct ReactivateCodeUseCase<P, C>
where
    P: ProjectRepository,
    C: CodeRepository,
{
    pub projects: P,
    pub codes: C,
}

impl<P, C> ReactivateCodeUseCase<P, C>
where
    P: ProjectRepository,
    C: CodeRepository,
{
    /// Return a used code to unused. Eligibility is re-checked here and again by the
    /// conditional update, regardless of what the caller already checked.
    pub async fn execute(
        &self,
        project_id: ProjectId,
        input: ReactivateCodeInput,
    ) -> Result<(Project, Redemption), CodegateError> {
        let project = load_project(&self.projects, project_id).await?;
        let redemption = self.restore(&project, input).await?;
        Ok((project, redemption))
    }

    async fn restore(
        &self,
        project: &Project,
        input: ReactivateCodeInput,
    ) -> Result<Redemption, CodegateError> {
        let project_id = project.id;
        let now = Utc::now();

        if !project.enabled {
            return Ok(Redemption::Rejected(CodeRejection::ProjectDisabled));
        }

        let found = match &input.target {
            CodeRef::Id(id) => self.codes.find_by_id(project_id, *id).await?,
            CodeRef::Code(code) => self.codes.find_by_code(project_id, code).await?,
        };
        let Some(mut found) = found else {
            return Ok(Redemption::Rejected(CodeRejection::NotFound));
        };

        if found.is_disabled {
            return Ok(Redemption::Rejected(CodeRejection::Disabled));
        }
        if found.is_expired(project.expires_at, now) {
            return Ok(Redemption::Rejected(CodeRejection::Expired));
        }
        if !found.used {
            return Ok(Redemption::Rejected(CodeRejection::AlreadyUnused));
        }

        let log = VerificationLogEntry::new(
            project_id,
            Some(found.id),
            &found.code,
            input.actor.as_deref(),
            LogResult::Reactivated,
            input.reason.as_deref(),
            now,
        );
        if self.codes.mark_unused(found.id, &log).await? {
            info!(%project_id, code_id = %found.id, "code reactivated");
            found.used = false;
            found.verified_at = None;
            found.verified_by = None;
            return Ok(Redemption::Accepted(found));
        }

        let current = self.codes.find_by_id(project_id, found.id).await?;
        Ok(Redemption::Rejected(classify_lost_race(
            current.as_ref(),
            CodeRejection::AlreadyUnused,
        )))
    }
}
