use chrono::Utc;
use rand::RngExt;
use tracing::info;
use uuid::Uuid;

use codegate_domain::id::{ApiKeyId, ProjectId};

use crate::domain::repository::{ApiKeyRepository, ProjectRepository};
use crate::domain::types::ApiKey;
use crate::error::CodegateError;
use crate::usecase::project::load_project;

/// Public key id: 32 lowercase hex characters.
pub fn generate_api_key() -> String {
    Uuid::new_v4().simple().to_string()
}

/// HMAC secret: 32 random bytes as 64 lowercase hex characters.
pub fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

// ── GenerateOrRefreshApiKey ──────────────────────────────────────────────────

pub struct GenerateApiKeyUseCase<P: ProjectRepository, K: ApiKeyRepository> {
    pub projects: P,
    pub keys: K,
}

impl<P: ProjectRepository, K: ApiKeyRepository> GenerateApiKeyUseCase<P, K> {
    /// Issue the project's key, replacing any existing one in the same statement.
    /// The returned value is the only time the secret leaves the service.
    pub async fn execute(
        &self,
        project_id: ProjectId,
        name: Option<String>,
        created_by: &str,
    ) -> Result<ApiKey, CodegateError> {
        load_project(&self.projects, project_id).await?;
        let key = ApiKey {
            id: ApiKeyId::new(),
            project_id,
            api_key: generate_api_key(),
            secret: generate_secret(),
            name,
            is_active: true,
            last_used_at: None,
            created_at: Utc::now(),
            created_by: created_by.to_owned(),
        };
        let stored = self.keys.upsert_for_project(&key).await?;
        info!(%project_id, api_key_id = %stored.id, "api key issued");
        Ok(stored)
    }
}

// ── ListApiKeys ──────────────────────────────────────────────────────────────

pub struct ListApiKeysUseCase<P: ProjectRepository, K: ApiKeyRepository> {
    pub projects: P,
    pub keys: K,
}

impl<P: ProjectRepository, K: ApiKeyRepository> ListApiKeysUseCase<P, K> {
    /// At most one key per project.
    pub async fn execute(&self, project_id: ProjectId) -> Result<Vec<ApiKey>, CodegateError> {
        load_project(&self.projects, project_id).await?;
        Ok(self.keys.find_by_project(project_id).await?.into_iter().collect())
    }
}

// ── ToggleApiKey ─────────────────────────────────────────────────────────────

pub struct ToggleApiKeyUseCase<K: ApiKeyRepository> {
    pub keys: K,
}

impl<K: ApiKeyRepository> ToggleApiKeyUseCase<K> {
    pub async fn execute(
        &self,
        project_id: ProjectId,
        id: ApiKeyId,
        active: bool,
    ) -> Result<ApiKey, CodegateError> {
        let key = self
            .keys
            .set_active(project_id, id, active)
            .await?
            .ok_or(CodegateError::ApiKeyNotFound)?;
        info!(%project_id, api_key_id = %id, active, "api key toggled");
        Ok(key)
    }
}

// ── DeleteApiKey ─────────────────────────────────────────────────────────────

pub struct DeleteApiKeyUseCase<K: ApiKeyRepository> {
    pub keys: K,
}

impl<K: ApiKeyRepository> DeleteApiKeyUseCase<K> {
    pub async fn execute(&self, project_id: ProjectId, id: ApiKeyId) -> Result<(), CodegateError> {
        if !self.keys.delete(project_id, id).await? {
            return Err(CodegateError::ApiKeyNotFound);
        }
        info!(%project_id, api_key_id = %id, "api key deleted");
        Ok(())
    }
}
