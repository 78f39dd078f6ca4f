use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use codegate::domain::repository::{
    ApiKeyRepository, CodeRepository, ProjectRepository, VerificationLogRepository,
};
use codegate::domain::types::{
    ApiKey, Code, CodeCounts, CodeFilter, CodeState, LogResult, Project, VerificationLogEntry,
};
use codegate::error::CodegateError;
use codegate::usecase::api_key::{generate_api_key, generate_secret};
use codegate_domain::id::{ApiKeyId, CodeId, ProjectId};
use codegate_domain::pagination::{Page, PageRequest};

/// In-memory backing store shared by every mock repository of one test.
#[derive(Clone, Default)]
pub struct MockStore {
    pub projects: Arc<Mutex<Vec<Project>>>,
    pub codes: Arc<Mutex<Vec<Code>>>,
    pub keys: Arc<Mutex<Vec<ApiKey>>>,
    pub logs: Arc<Mutex<Vec<VerificationLogEntry>>>,
    /// Number of `find_by_api_key` calls.
    pub key_lookups: Arc<AtomicUsize>,
    /// When set, the next `insert_many` finds its first code already stored, as if a
    /// concurrent generate had committed it in between.
    pub race_next_insert: Arc<AtomicBool>,
}

impl MockStore {
    pub fn with_project(project: Project) -> Self {
        let store = Self::default();
        store.projects.lock().unwrap().push(project);
        store
    }

    pub fn projects(&self) -> MockProjectRepo {
        MockProjectRepo {
            store: self.clone(),
        }
    }

    pub fn codes(&self) -> MockCodeRepo {
        MockCodeRepo {
            store: self.clone(),
        }
    }

    pub fn keys(&self) -> MockApiKeyRepo {
        MockApiKeyRepo {
            store: self.clone(),
        }
    }

    pub fn logs(&self) -> MockLogRepo {
        MockLogRepo {
            store: self.clone(),
        }
    }

    pub fn insert_code(&self, code: Code) {
        self.codes.lock().unwrap().push(code);
    }

    pub fn code(&self, id: CodeId) -> Code {
        self.codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .expect("code not in store")
    }

    pub fn log_entries(&self) -> Vec<VerificationLogEntry> {
        self.logs.lock().unwrap().clone()
    }

    pub fn key_lookups(&self) -> usize {
        self.key_lookups.load(Ordering::SeqCst)
    }
}

/// In-memory equivalent of the SQL list filter. `search` is a literal substring.
fn filter_matches(
    filter: &CodeFilter,
    code: &Code,
    project_expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    filter.used.is_none_or(|u| code.used == u)
        && filter.is_disabled.is_none_or(|d| code.is_disabled == d)
        && filter
            .is_expired
            .is_none_or(|e| code.is_expired(project_expires_at, now) == e)
        && filter
            .search
            .as_deref()
            .is_none_or(|s| code.code.contains(s))
}

/// In-memory equivalent of the SQL batch-disable predicate.
fn is_disable_candidate(
    filter: &CodeFilter,
    code: &Code,
    project_expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    filter_matches(filter, code, project_expires_at, now)
        && !code.used
        && !code.is_disabled
        && !code.is_expired(project_expires_at, now)
}

fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let page = page.clamped();
    let slice: Vec<T> = items
        .iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Page::new(slice, items.len() as u64, page)
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_project() -> Project {
    let now = Utc::now();
    Project {
        id: ProjectId::new(),
        name: "launch-campaign".into(),
        description: None,
        enabled: true,
        expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_code(project_id: ProjectId, code: &str) -> Code {
    Code {
        id: CodeId::new(),
        project_id,
        code: code.into(),
        used: false,
        is_disabled: false,
        expires_at: None,
        verified_at: None,
        verified_by: None,
        created_at: Utc::now(),
    }
}

pub fn used_code(project_id: ProjectId, code: &str) -> Code {
    Code {
        used: true,
        verified_at: Some(Utc::now() - Duration::minutes(5)),
        verified_by: Some("carol".into()),
        ..test_code(project_id, code)
    }
}

pub fn past(minutes: i64) -> DateTime<Utc> {
    Utc::now() - Duration::minutes(minutes)
}

pub fn test_api_key(project_id: ProjectId) -> ApiKey {
    ApiKey {
        id: ApiKeyId::new(),
        project_id,
        api_key: generate_api_key(),
        secret: generate_secret(),
        name: Some("backend".into()),
        is_active: true,
        last_used_at: None,
        created_at: Utc::now(),
        created_by: "admin-1".into(),
    }
}

// ── MockProjectRepo ──────────────────────────────────────────────────────────

pub struct MockProjectRepo {
    store: MockStore,
}

impl ProjectRepository for MockProjectRepo {
    async fn create(&self, project: &Project) -> Result<bool, CodegateError> {
        let mut projects = self.store.projects.lock().unwrap();
        if projects.iter().any(|p| p.name == project.name) {
            return Ok(false);
        }
        projects.push(project.clone());
        Ok(true)
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, CodegateError> {
        Ok(self
            .store
            .projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn name_taken(
        &self,
        name: &str,
        except: Option<ProjectId>,
    ) -> Result<bool, CodegateError> {
        Ok(self
            .store
            .projects
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.name == name && Some(p.id) != except))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Project>, CodegateError> {
        let mut projects = self.store.projects.lock().unwrap().clone();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(&projects, page))
    }

    async fn update(&self, project: &Project) -> Result<(), CodegateError> {
        let mut projects = self.store.projects.lock().unwrap();
        if let Some(stored) = projects.iter_mut().find(|p| p.id == project.id) {
            *stored = project.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, CodegateError> {
        let mut projects = self.store.projects.lock().unwrap();
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            return Ok(false);
        }
        self.store.codes.lock().unwrap().retain(|c| c.project_id != id);
        self.store.keys.lock().unwrap().retain(|k| k.project_id != id);
        self.store.logs.lock().unwrap().retain(|l| l.project_id != id);
        Ok(true)
    }
}

// ── MockCodeRepo ─────────────────────────────────────────────────────────────

pub struct MockCodeRepo {
    store: MockStore,
}

impl CodeRepository for MockCodeRepo {
    async fn find_existing(
        &self,
        project_id: ProjectId,
        candidates: &[String],
    ) -> Result<Vec<String>, CodegateError> {
        Ok(self
            .store
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.project_id == project_id && candidates.contains(&c.code))
            .map(|c| c.code.clone())
            .collect())
    }

    async fn insert_many(&self, codes: &[Code]) -> Result<bool, CodegateError> {
        let mut stored = self.store.codes.lock().unwrap();
        if self.store.race_next_insert.swap(false, Ordering::SeqCst) {
            if let Some(first) = codes.first() {
                stored.push(Code {
                    id: CodeId::new(),
                    ..first.clone()
                });
            }
        }
        // All or nothing, like the unique index on (project_id, code).
        let conflict = codes.iter().any(|new| {
            stored
                .iter()
                .any(|c| c.project_id == new.project_id && c.code == new.code)
        });
        if conflict {
            return Ok(false);
        }
        stored.extend_from_slice(codes);
        Ok(true)
    }

    async fn find_by_id(
        &self,
        project_id: ProjectId,
        id: CodeId,
    ) -> Result<Option<Code>, CodegateError> {
        Ok(self
            .store
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.project_id == project_id && c.id == id)
            .cloned())
    }

    async fn find_by_code(
        &self,
        project_id: ProjectId,
        code: &str,
    ) -> Result<Option<Code>, CodegateError> {
        let found = self
            .store
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.project_id == project_id && c.code == code)
            .cloned();
        // Let concurrent callers read the same snapshot before anyone writes.
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn list(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        filter: &CodeFilter,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Page<Code>, CodegateError> {
        let mut matching: Vec<Code> = self
            .store
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                c.project_id == project_id && filter_matches(filter, c, project_expires_at, now)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(&matching, page))
    }

    async fn mark_used(
        &self,
        id: CodeId,
        verified_by: Option<&str>,
        at: DateTime<Utc>,
        log: &VerificationLogEntry,
    ) -> Result<bool, CodegateError> {
        let mut codes = self.store.codes.lock().unwrap();
        let Some(code) = codes
            .iter_mut()
            .find(|c| c.id == id && !c.used && !c.is_disabled)
        else {
            return Ok(false);
        };
        code.used = true;
        code.verified_at = Some(at);
        code.verified_by = verified_by.map(str::to_owned);
        self.store.logs.lock().unwrap().push(log.clone());
        Ok(true)
    }

    async fn mark_unused(
        &self,
        id: CodeId,
        log: &VerificationLogEntry,
    ) -> Result<bool, CodegateError> {
        let mut codes = self.store.codes.lock().unwrap();
        let Some(code) = codes
            .iter_mut()
            .find(|c| c.id == id && c.used && !c.is_disabled)
        else {
            return Ok(false);
        };
        code.used = false;
        code.verified_at = None;
        code.verified_by = None;
        self.store.logs.lock().unwrap().push(log.clone());
        Ok(true)
    }

    async fn set_disabled(
        &self,
        project_id: ProjectId,
        id: CodeId,
        disabled: bool,
    ) -> Result<Option<Code>, CodegateError> {
        let mut codes = self.store.codes.lock().unwrap();
        Ok(codes
            .iter_mut()
            .find(|c| c.project_id == project_id && c.id == id)
            .map(|c| {
                c.is_disabled = disabled;
                c.clone()
            }))
    }

    async fn delete(&self, project_id: ProjectId, id: CodeId) -> Result<bool, CodegateError> {
        let mut codes = self.store.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| !(c.project_id == project_id && c.id == id));
        Ok(codes.len() < before)
    }

    async fn count_disable_candidates(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        filter: &CodeFilter,
        now: DateTime<Utc>,
    ) -> Result<u64, CodegateError> {
        Ok(self
            .store
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                c.project_id == project_id
                    && is_disable_candidate(filter, c, project_expires_at, now)
            })
            .count() as u64)
    }

    async fn disable_unused(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        filter: &CodeFilter,
        now: DateTime<Utc>,
    ) -> Result<u64, CodegateError> {
        let mut codes = self.store.codes.lock().unwrap();
        let mut touched = 0;
        for code in codes.iter_mut().filter(|c| {
            c.project_id == project_id && is_disable_candidate(filter, c, project_expires_at, now)
        }) {
            code.is_disabled = true;
            touched += 1;
        }
        Ok(touched)
    }

    async fn counts(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<CodeCounts, CodegateError> {
        let mut counts = CodeCounts::default();
        for code in self
            .store
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.project_id == project_id)
        {
            counts.total += 1;
            match code.state(project_expires_at, now) {
                CodeState::Expired => counts.expired += 1,
                CodeState::Disabled => counts.disabled += 1,
                CodeState::Used => counts.used += 1,
                CodeState::Unused => counts.unused += 1,
            }
        }
        Ok(counts)
    }
}

// ── MockApiKeyRepo ───────────────────────────────────────────────────────────

pub struct MockApiKeyRepo {
    store: MockStore,
}

impl ApiKeyRepository for MockApiKeyRepo {
    async fn upsert_for_project(&self, key: &ApiKey) -> Result<ApiKey, CodegateError> {
        let mut keys = self.store.keys.lock().unwrap();
        match keys.iter_mut().find(|k| k.project_id == key.project_id) {
            // Same row, new credentials; the id survives rotation.
            Some(stored) => {
                stored.api_key = key.api_key.clone();
                stored.secret = key.secret.clone();
                stored.name = key.name.clone();
                stored.is_active = key.is_active;
                stored.last_used_at = key.last_used_at;
                stored.created_at = key.created_at;
                stored.created_by = key.created_by.clone();
                Ok(stored.clone())
            }
            None => {
                keys.push(key.clone());
                Ok(key.clone())
            }
        }
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<ApiKey>, CodegateError> {
        self.store.key_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .store
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.api_key == api_key)
            .cloned())
    }

    async fn find_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Option<ApiKey>, CodegateError> {
        Ok(self
            .store
            .keys
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.project_id == project_id)
            .cloned())
    }

    async fn set_active(
        &self,
        project_id: ProjectId,
        id: ApiKeyId,
        active: bool,
    ) -> Result<Option<ApiKey>, CodegateError> {
        let mut keys = self.store.keys.lock().unwrap();
        Ok(keys
            .iter_mut()
            .find(|k| k.project_id == project_id && k.id == id)
            .map(|k| {
                k.is_active = active;
                k.clone()
            }))
    }

    async fn delete(&self, project_id: ProjectId, id: ApiKeyId) -> Result<bool, CodegateError> {
        let mut keys = self.store.keys.lock().unwrap();
        let before = keys.len();
        keys.retain(|k| !(k.project_id == project_id && k.id == id));
        Ok(keys.len() < before)
    }

    async fn touch_last_used(&self, id: ApiKeyId, at: DateTime<Utc>) -> Result<(), CodegateError> {
        if let Some(key) = self
            .store
            .keys
            .lock()
            .unwrap()
            .iter_mut()
            .find(|k| k.id == id)
        {
            key.last_used_at = Some(at);
        }
        Ok(())
    }
}

// ── MockLogRepo ──────────────────────────────────────────────────────────────

pub struct MockLogRepo {
    store: MockStore,
}

impl MockLogRepo {
    fn newest_first(&self, project_id: ProjectId, result: Option<LogResult>) -> Vec<VerificationLogEntry> {
        let mut entries: Vec<VerificationLogEntry> = self
            .store
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.project_id == project_id && result.is_none_or(|r| l.result == r))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.verified_at.cmp(&a.verified_at));
        entries
    }
}

impl VerificationLogRepository for MockLogRepo {
    async fn append(&self, entry: &VerificationLogEntry) -> Result<(), CodegateError> {
        self.store.logs.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list(
        &self,
        project_id: ProjectId,
        result: Option<LogResult>,
        page: PageRequest,
    ) -> Result<Page<VerificationLogEntry>, CodegateError> {
        Ok(paginate(&self.newest_first(project_id, result), page))
    }

    async fn recent(
        &self,
        project_id: ProjectId,
        limit: u64,
    ) -> Result<Vec<VerificationLogEntry>, CodegateError> {
        let mut entries = self.newest_first(project_id, None);
        entries.truncate(limit as usize);
        Ok(entries)
    }
}
