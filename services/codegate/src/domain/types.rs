use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use codegate_domain::id::{ApiKeyId, CodeId, ProjectId};

/// Maximum number of codes created by one generate call.
pub const MAX_GENERATE_COUNT: u32 = 10_000;

/// Default total code length, prefix and suffix included.
pub const DEFAULT_CODE_LENGTH: usize = 12;

/// Upper bound accepted for the `length` generator parameter.
pub const MAX_CODE_LENGTH: usize = 64;

/// Number of latest verifications returned with project statistics.
pub const RECENT_VERIFICATIONS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }
}

/// Effective state of a code, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeState {
    Expired,
    Disabled,
    Used,
    Unused,
}

impl CodeState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Disabled => "disabled",
            Self::Used => "used",
            Self::Unused => "unused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub id: CodeId,
    pub project_id: ProjectId,
    pub code: String,
    pub used: bool,
    pub is_disabled: bool,
    /// Own expiry. `None` falls back to the project's at evaluation time.
    pub expires_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Code {
    pub fn effective_expires_at(
        &self,
        project_expires_at: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        self.expires_at.or(project_expires_at)
    }

    pub fn is_expired(&self, project_expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        self.effective_expires_at(project_expires_at)
            .is_some_and(|exp| now > exp)
    }

    pub fn state(&self, project_expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> CodeState {
        if self.is_expired(project_expires_at, now) {
            CodeState::Expired
        } else if self.is_disabled {
            CodeState::Disabled
        } else if self.used {
            CodeState::Used
        } else {
            CodeState::Unused
        }
    }
}

/// Why a verify or reactivate attempt did not change the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    ProjectDisabled,
    NotFound,
    Disabled,
    Expired,
    AlreadyUsed,
    AlreadyUnused,
}

impl CodeRejection {
    pub fn error_code(self) -> &'static str {
        match self {
            Self::ProjectDisabled => "PROJECT_DISABLED",
            Self::NotFound => "CODE_NOT_FOUND",
            Self::Disabled => "CODE_DISABLED",
            Self::Expired => "CODE_EXPIRED",
            Self::AlreadyUsed => "CODE_ALREADY_USED",
            Self::AlreadyUnused => "CODE_ALREADY_UNUSED",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::ProjectDisabled => "project is disabled",
            Self::NotFound => "code not found",
            Self::Disabled => "code is disabled",
            Self::Expired => "code has expired",
            Self::AlreadyUsed => "code has already been used",
            Self::AlreadyUnused => "code has not been used",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub project_id: ProjectId,
    pub api_key: String,
    pub secret: String,
    pub name: Option<String>,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogResult {
    Success,
    Failed,
    Reactivated,
}

impl LogResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Reactivated => "reactivated",
        }
    }
}

impl fmt::Display for LogResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "reactivated" => Ok(Self::Reactivated),
            other => Err(format!("unknown log result: {other}")),
        }
    }
}

/// Network origin of a request, recorded with each verification attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Append-only audit record of a verify or reactivate attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationLogEntry {
    pub id: uuid::Uuid,
    pub project_id: ProjectId,
    /// `None` when the presented code string matched nothing.
    pub code_id: Option<CodeId>,
    pub code: String,
    pub verified_at: DateTime<Utc>,
    pub verified_by: Option<String>,
    pub result: LogResult,
    pub reason: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl VerificationLogEntry {
    pub fn new(
        project_id: ProjectId,
        code_id: Option<CodeId>,
        code: &str,
        verified_by: Option<&str>,
        result: LogResult,
        reason: Option<&str>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            project_id,
            code_id,
            code: code.to_owned(),
            verified_at: at,
            verified_by: verified_by.map(str::to_owned),
            result,
            reason: reason.map(str::to_owned),
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_client(mut self, client: &ClientInfo) -> Self {
        self.ip_address = client.ip_address.clone();
        self.user_agent = client.user_agent.clone();
        self
    }
}

/// Caller-supplied code filters. Every `None` field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeFilter {
    pub used: Option<bool>,
    pub is_disabled: Option<bool>,
    pub is_expired: Option<bool>,
    /// Case-sensitive substring of the code string.
    pub search: Option<String>,
}

/// Per-project counts by effective state. Each code lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeCounts {
    pub total: u64,
    pub used: u64,
    pub unused: u64,
    pub disabled: u64,
    pub expired: u64,
}

impl CodeCounts {
    /// Used codes over all codes, 0.0 for an empty project.
    pub fn usage_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.used as f64 / self.total as f64
        }
    }
}
