use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbApiKeyRepository, DbCodeRepository, DbProjectRepository, DbVerificationLogRepository,
};
use crate::rate_limit::VerifyRateLimiter;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub signature_window_secs: u64,
    pub max_body_bytes: usize,
    pub code_length: usize,
    pub verify_limiter: VerifyRateLimiter,
}

impl AppState {
    pub fn project_repo(&self) -> DbProjectRepository {
        DbProjectRepository {
            db: self.db.clone(),
        }
    }

    pub fn code_repo(&self) -> DbCodeRepository {
        DbCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn api_key_repo(&self) -> DbApiKeyRepository {
        DbApiKeyRepository {
            db: self.db.clone(),
        }
    }

    pub fn log_repo(&self) -> DbVerificationLogRepository {
        DbVerificationLogRepository {
            db: self.db.clone(),
        }
    }
}
