#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use codegate_domain::id::{ApiKeyId, CodeId, ProjectId};
use codegate_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    ApiKey, Code, CodeCounts, CodeFilter, LogResult, Project, VerificationLogEntry,
};
use crate::error::CodegateError;

/// Repository for projects.
pub trait ProjectRepository: Send + Sync {
    /// Insert a project. Returns `false` if the name is already taken.
    async fn create(&self, project: &Project) -> Result<bool, CodegateError>;

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, CodegateError>;

    /// Whether another project (other than `except`) already uses `name`.
    async fn name_taken(
        &self,
        name: &str,
        except: Option<ProjectId>,
    ) -> Result<bool, CodegateError>;

    async fn list(&self, page: PageRequest) -> Result<Page<Project>, CodegateError>;

    /// Overwrite the mutable columns of an existing project.
    async fn update(&self, project: &Project) -> Result<(), CodegateError>;

    /// Delete the project with its logs, codes and key in one transaction.
    /// Returns `false` if the project did not exist.
    async fn delete(&self, id: ProjectId) -> Result<bool, CodegateError>;
}

/// Repository for activation codes.
///
/// Methods taking `project_expires_at` evaluate expiry against the code's own expiry,
/// falling back to that value; callers pass the owning project's current expiry.
pub trait CodeRepository: Send + Sync {
    /// The subset of `candidates` already stored for the project.
    async fn find_existing(
        &self,
        project_id: ProjectId,
        candidates: &[String],
    ) -> Result<Vec<String>, CodegateError>;

    /// Insert a batch of new codes atomically. `false` (and nothing stored) when a code
    /// string is already taken in its project.
    async fn insert_many(&self, codes: &[Code]) -> Result<bool, CodegateError>;

    async fn find_by_id(
        &self,
        project_id: ProjectId,
        id: CodeId,
    ) -> Result<Option<Code>, CodegateError>;

    async fn find_by_code(
        &self,
        project_id: ProjectId,
        code: &str,
    ) -> Result<Option<Code>, CodegateError>;

    async fn list(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        filter: &CodeFilter,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Page<Code>, CodegateError>;

    /// Conditionally flip an unused, enabled code to used and append `log` in the same
    /// transaction. Returns `false` (and writes nothing) if the code was no longer
    /// eligible, i.e. another caller won.
    async fn mark_used(
        &self,
        id: CodeId,
        verified_by: Option<&str>,
        at: DateTime<Utc>,
        log: &VerificationLogEntry,
    ) -> Result<bool, CodegateError>;

    /// Conditionally flip a used, enabled code back to unused, clearing the verification
    /// stamp, and append `log` in the same transaction. Returns `false` if not eligible.
    async fn mark_unused(
        &self,
        id: CodeId,
        log: &VerificationLogEntry,
    ) -> Result<bool, CodegateError>;

    async fn set_disabled(
        &self,
        project_id: ProjectId,
        id: CodeId,
        disabled: bool,
    ) -> Result<Option<Code>, CodegateError>;

    async fn delete(&self, project_id: ProjectId, id: CodeId) -> Result<bool, CodegateError>;

    /// Number of codes the matching [`disable_unused`](Self::disable_unused) call would
    /// touch right now.
    async fn count_disable_candidates(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        filter: &CodeFilter,
        now: DateTime<Utc>,
    ) -> Result<u64, CodegateError>;

    /// Disable every unused, enabled, unexpired code matching `filter` in one statement.
    /// Returns the number of rows touched.
    async fn disable_unused(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        filter: &CodeFilter,
        now: DateTime<Utc>,
    ) -> Result<u64, CodegateError>;

    async fn counts(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<CodeCounts, CodegateError>;
}

/// Repository for the per-project credential pair.
pub trait ApiKeyRepository: Send + Sync {
    /// Insert the project's key, or atomically replace the existing one in place.
    /// Returns the stored row.
    async fn upsert_for_project(&self, key: &ApiKey) -> Result<ApiKey, CodegateError>;

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<ApiKey>, CodegateError>;

    async fn find_by_project(&self, project_id: ProjectId)
    -> Result<Option<ApiKey>, CodegateError>;

    async fn set_active(
        &self,
        project_id: ProjectId,
        id: ApiKeyId,
        active: bool,
    ) -> Result<Option<ApiKey>, CodegateError>;

    async fn delete(&self, project_id: ProjectId, id: ApiKeyId) -> Result<bool, CodegateError>;

    async fn touch_last_used(&self, id: ApiKeyId, at: DateTime<Utc>)
    -> Result<(), CodegateError>;
}

/// Append-only verification history.
pub trait VerificationLogRepository: Send + Sync {
    async fn append(&self, entry: &VerificationLogEntry) -> Result<(), CodegateError>;

    /// Newest first.
    async fn list(
        &self,
        project_id: ProjectId,
        result: Option<LogResult>,
        page: PageRequest,
    ) -> Result<Page<VerificationLogEntry>, CodegateError>;

    /// The latest `limit` entries, newest first.
    async fn recent(
        &self,
        project_id: ProjectId,
        limit: u64,
    ) -> Result<Vec<VerificationLogEntry>, CodegateError>;
}
