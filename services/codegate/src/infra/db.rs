use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, SqlErr, TransactionError, TransactionTrait, UpdateMany,
    sea_query::{Expr, LikeExpr, OnConflict},
};

use codegate_core::retry::retry_read;
use codegate_core::sea_ext::Paginate;
use codegate_domain::id::{ApiKeyId, CodeId, ProjectId};
use codegate_domain::pagination::{Page, PageRequest};
use codegate_schema::{api_keys, codes, projects, verification_logs};

use crate::domain::repository::{
    ApiKeyRepository, CodeRepository, ProjectRepository, VerificationLogRepository,
};
use crate::domain::types::{
    ApiKey, Code, CodeCounts, CodeFilter, LogResult, Project, VerificationLogEntry,
};
use crate::error::CodegateError;

/// Rows per multi-row statement; keeps bind parameters under the Postgres limit.
const CHUNK_SIZE: usize = 1_000;

// ── Project repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProjectRepository {
    pub db: DatabaseConnection,
}

impl ProjectRepository for DbProjectRepository {
    async fn create(&self, project: &Project) -> Result<bool, CodegateError> {
        let rows = projects::Entity::insert(project_to_active_model(project))
            .on_conflict(
                OnConflict::column(projects::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("create project")?;
        Ok(rows > 0)
    }

    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, CodegateError> {
        let model = retry_read("find project by id", || {
            projects::Entity::find_by_id(id.0).one(&self.db)
        })
        .await
        .context("find project by id")?;
        Ok(model.map(project_from_model))
    }

    async fn name_taken(
        &self,
        name: &str,
        except: Option<ProjectId>,
    ) -> Result<bool, CodegateError> {
        let count = retry_read("count projects by name", || {
            let mut select = projects::Entity::find().filter(projects::Column::Name.eq(name));
            if let Some(except) = except {
                select = select.filter(projects::Column::Id.ne(except.0));
            }
            select.count(&self.db)
        })
        .await
        .context("count projects by name")?;
        Ok(count > 0)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Project>, CodegateError> {
        let total = retry_read("count projects", || projects::Entity::find().count(&self.db))
            .await
            .context("count projects")?;
        let models = retry_read("list projects", || {
            projects::Entity::find()
                .order_by_desc(projects::Column::CreatedAt)
                .paginate_by(page)
                .all(&self.db)
        })
        .await
        .context("list projects")?;
        Ok(Page::new(
            models.into_iter().map(project_from_model).collect(),
            total,
            page,
        ))
    }

    async fn update(&self, project: &Project) -> Result<(), CodegateError> {
        project_to_active_model(project)
            .update(&self.db)
            .await
            .context("update project")?;
        Ok(())
    }

    async fn delete(&self, id: ProjectId) -> Result<bool, CodegateError> {
        let deleted = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    verification_logs::Entity::delete_many()
                        .filter(verification_logs::Column::ProjectId.eq(id.0))
                        .exec(txn)
                        .await?;
                    codes::Entity::delete_many()
                        .filter(codes::Column::ProjectId.eq(id.0))
                        .exec(txn)
                        .await?;
                    api_keys::Entity::delete_many()
                        .filter(api_keys::Column::ProjectId.eq(id.0))
                        .exec(txn)
                        .await?;
                    let result = projects::Entity::delete_by_id(id.0).exec(txn).await?;
                    Ok(result.rows_affected > 0)
                })
            })
            .await
            .context("delete project")?;
        Ok(deleted)
    }
}

fn project_to_active_model(project: &Project) -> projects::ActiveModel {
    projects::ActiveModel {
        id: Set(project.id.0),
        name: Set(project.name.clone()),
        description: Set(project.description.clone()),
        status: Set(project.enabled),
        expires_at: Set(project.expires_at),
        created_at: Set(project.created_at),
        updated_at: Set(project.updated_at),
    }
}

fn project_from_model(model: projects::Model) -> Project {
    Project {
        id: ProjectId(model.id),
        name: model.name,
        description: model.description,
        enabled: model.status,
        expires_at: model.expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Code repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCodeRepository {
    pub db: DatabaseConnection,
}

/// Codes whose effective expiry lies in the past. A row without its own expiry inherits
/// the project's, which is known here as a bound value.
fn expired_condition(project_expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Condition {
    let mut cond = Condition::any().add(codes::Column::ExpiresAt.lt(now));
    if project_expires_at.is_some_and(|exp| exp < now) {
        cond = cond.add(codes::Column::ExpiresAt.is_null());
    }
    cond
}

fn not_expired_condition(
    project_expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Condition {
    let mut cond = Condition::any().add(codes::Column::ExpiresAt.gte(now));
    if project_expires_at.is_none_or(|exp| exp >= now) {
        cond = cond.add(codes::Column::ExpiresAt.is_null());
    }
    cond
}

fn filter_condition(
    project_id: ProjectId,
    project_expires_at: Option<DateTime<Utc>>,
    filter: &CodeFilter,
    now: DateTime<Utc>,
) -> Condition {
    let mut cond = Condition::all().add(codes::Column::ProjectId.eq(project_id.0));
    if let Some(used) = filter.used {
        cond = cond.add(codes::Column::Status.eq(used));
    }
    if let Some(disabled) = filter.is_disabled {
        cond = cond.add(codes::Column::IsDisabled.eq(disabled));
    }
    if let Some(expired) = filter.is_expired {
        cond = cond.add(if expired {
            expired_condition(project_expires_at, now)
        } else {
            not_expired_condition(project_expires_at, now)
        });
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        cond = cond.add(
            Expr::col((codes::Entity, codes::Column::Code))
                .like(LikeExpr::new(contains_pattern(search)).escape('\\')),
        );
    }
    cond
}

/// `%search%` with the LIKE metacharacters in `search` escaped by `\`.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// The one predicate behind both the batch-disable preview and the batch-disable itself.
fn disable_candidate_condition(
    project_id: ProjectId,
    project_expires_at: Option<DateTime<Utc>>,
    filter: &CodeFilter,
    now: DateTime<Utc>,
) -> Condition {
    filter_condition(project_id, project_expires_at, filter, now)
        .add(codes::Column::Status.eq(false))
        .add(codes::Column::IsDisabled.eq(false))
        .add(not_expired_condition(project_expires_at, now))
}

fn disable_candidates(
    project_id: ProjectId,
    project_expires_at: Option<DateTime<Utc>>,
    filter: &CodeFilter,
    now: DateTime<Utc>,
) -> Select<codes::Entity> {
    codes::Entity::find().filter(disable_candidate_condition(
        project_id,
        project_expires_at,
        filter,
        now,
    ))
}

fn disable_unused_update(
    project_id: ProjectId,
    project_expires_at: Option<DateTime<Utc>>,
    filter: &CodeFilter,
    now: DateTime<Utc>,
) -> UpdateMany<codes::Entity> {
    codes::Entity::update_many()
        .col_expr(codes::Column::IsDisabled, Expr::value(true))
        .filter(disable_candidate_condition(
            project_id,
            project_expires_at,
            filter,
            now,
        ))
}

/// unused -> used, only while the code is still unused and enabled.
fn mark_used_update(
    id: CodeId,
    verified_by: Option<String>,
    at: DateTime<Utc>,
) -> UpdateMany<codes::Entity> {
    codes::Entity::update_many()
        .col_expr(codes::Column::Status, Expr::value(true))
        .col_expr(codes::Column::VerifiedAt, Expr::value(Some(at)))
        .col_expr(codes::Column::VerifiedBy, Expr::value(verified_by))
        .filter(codes::Column::Id.eq(id.0))
        .filter(codes::Column::Status.eq(false))
        .filter(codes::Column::IsDisabled.eq(false))
}

/// used -> unused, only while the code is still used and enabled.
fn mark_unused_update(id: CodeId) -> UpdateMany<codes::Entity> {
    codes::Entity::update_many()
        .col_expr(codes::Column::Status, Expr::value(false))
        .col_expr(
            codes::Column::VerifiedAt,
            Expr::value(Option::<DateTime<Utc>>::None),
        )
        .col_expr(codes::Column::VerifiedBy, Expr::value(Option::<String>::None))
        .filter(codes::Column::Id.eq(id.0))
        .filter(codes::Column::Status.eq(true))
        .filter(codes::Column::IsDisabled.eq(false))
}

impl CodeRepository for DbCodeRepository {
    async fn find_existing(
        &self,
        project_id: ProjectId,
        candidates: &[String],
    ) -> Result<Vec<String>, CodegateError> {
        let mut existing = Vec::new();
        for chunk in candidates.chunks(CHUNK_SIZE) {
            let found: Vec<String> = retry_read("find existing codes", || {
                codes::Entity::find()
                    .select_only()
                    .column(codes::Column::Code)
                    .filter(codes::Column::ProjectId.eq(project_id.0))
                    .filter(codes::Column::Code.is_in(chunk.iter().cloned()))
                    .into_tuple::<String>()
                    .all(&self.db)
            })
            .await
            .context("find existing codes")?;
            existing.extend(found);
        }
        Ok(existing)
    }

    async fn insert_many(&self, batch: &[Code]) -> Result<bool, CodegateError> {
        if batch.is_empty() {
            return Ok(true);
        }
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let models: Vec<codes::ActiveModel> =
                    batch.iter().map(code_to_active_model).collect();
                Box::pin(async move {
                    for chunk in models.chunks(CHUNK_SIZE) {
                        codes::Entity::insert_many(chunk.to_vec())
                            .exec_without_returning(txn)
                            .await?;
                    }
                    Ok(())
                })
            })
            .await;
        match result {
            Ok(()) => Ok(true),
            Err(TransactionError::Transaction(err)) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(anyhow::Error::new(err).context("insert codes").into()),
        }
    }

    async fn find_by_id(
        &self,
        project_id: ProjectId,
        id: CodeId,
    ) -> Result<Option<Code>, CodegateError> {
        let model = retry_read("find code by id", || {
            codes::Entity::find_by_id(id.0)
                .filter(codes::Column::ProjectId.eq(project_id.0))
                .one(&self.db)
        })
        .await
        .context("find code by id")?;
        Ok(model.map(code_from_model))
    }

    async fn find_by_code(
        &self,
        project_id: ProjectId,
        code: &str,
    ) -> Result<Option<Code>, CodegateError> {
        let model = retry_read("find code by string", || {
            codes::Entity::find()
                .filter(codes::Column::ProjectId.eq(project_id.0))
                .filter(codes::Column::Code.eq(code))
                .one(&self.db)
        })
        .await
        .context("find code by string")?;
        Ok(model.map(code_from_model))
    }

    async fn list(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        filter: &CodeFilter,
        page: PageRequest,
        now: DateTime<Utc>,
    ) -> Result<Page<Code>, CodegateError> {
        let select = codes::Entity::find().filter(filter_condition(
            project_id,
            project_expires_at,
            filter,
            now,
        ));
        let total = retry_read("count codes", || select.clone().count(&self.db))
            .await
            .context("count codes")?;
        let models = retry_read("list codes", || {
            select
                .clone()
                .order_by_desc(codes::Column::CreatedAt)
                .order_by_asc(codes::Column::Code)
                .paginate_by(page)
                .all(&self.db)
        })
        .await
        .context("list codes")?;
        Ok(Page::new(
            models.into_iter().map(code_from_model).collect(),
            total,
            page,
        ))
    }

    async fn mark_used(
        &self,
        id: CodeId,
        verified_by: Option<&str>,
        at: DateTime<Utc>,
        log: &VerificationLogEntry,
    ) -> Result<bool, CodegateError> {
        let won = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                let verified_by = verified_by.map(str::to_owned);
                let log = log.clone();
                Box::pin(async move {
                    let result = mark_used_update(id, verified_by, at).exec(txn).await?;
                    if result.rows_affected != 1 {
                        return Ok(false);
                    }
                    insert_log(txn, &log).await?;
                    Ok(true)
                })
            })
            .await
            .context("mark code used")?;
        Ok(won)
    }

    async fn mark_unused(
        &self,
        id: CodeId,
        log: &VerificationLogEntry,
    ) -> Result<bool, CodegateError> {
        let won = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                let log = log.clone();
                Box::pin(async move {
                    let result = mark_unused_update(id).exec(txn).await?;
                    if result.rows_affected != 1 {
                        return Ok(false);
                    }
                    insert_log(txn, &log).await?;
                    Ok(true)
                })
            })
            .await
            .context("mark code unused")?;
        Ok(won)
    }

    async fn set_disabled(
        &self,
        project_id: ProjectId,
        id: CodeId,
        disabled: bool,
    ) -> Result<Option<Code>, CodegateError> {
        let result = codes::Entity::update_many()
            .col_expr(codes::Column::IsDisabled, Expr::value(disabled))
            .filter(codes::Column::Id.eq(id.0))
            .filter(codes::Column::ProjectId.eq(project_id.0))
            .exec(&self.db)
            .await
            .context("set code disabled")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_id(project_id, id).await
    }

    async fn delete(&self, project_id: ProjectId, id: CodeId) -> Result<bool, CodegateError> {
        let result = codes::Entity::delete_many()
            .filter(codes::Column::Id.eq(id.0))
            .filter(codes::Column::ProjectId.eq(project_id.0))
            .exec(&self.db)
            .await
            .context("delete code")?;
        Ok(result.rows_affected > 0)
    }

    async fn count_disable_candidates(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        filter: &CodeFilter,
        now: DateTime<Utc>,
    ) -> Result<u64, CodegateError> {
        let select = disable_candidates(project_id, project_expires_at, filter, now);
        let count = retry_read("count disable candidates", || {
            select.clone().count(&self.db)
        })
        .await
        .context("count disable candidates")?;
        Ok(count)
    }

    async fn disable_unused(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        filter: &CodeFilter,
        now: DateTime<Utc>,
    ) -> Result<u64, CodegateError> {
        let result = disable_unused_update(project_id, project_expires_at, filter, now)
            .exec(&self.db)
            .await
            .context("batch disable unused codes")?;
        Ok(result.rows_affected)
    }

    async fn counts(
        &self,
        project_id: ProjectId,
        project_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<CodeCounts, CodegateError> {
        let in_project = || Condition::all().add(codes::Column::ProjectId.eq(project_id.0));
        let live = || in_project().add(not_expired_condition(project_expires_at, now));

        let count = |label: &'static str, cond: Condition| {
            let db = &self.db;
            async move {
                retry_read(label, || codes::Entity::find().filter(cond.clone()).count(db))
                    .await
                    .context(label)
            }
        };

        let total = count("count all codes", in_project()).await?;
        let expired = count(
            "count expired codes",
            in_project().add(expired_condition(project_expires_at, now)),
        )
        .await?;
        let disabled = count(
            "count disabled codes",
            live().add(codes::Column::IsDisabled.eq(true)),
        )
        .await?;
        let used = count(
            "count used codes",
            live()
                .add(codes::Column::IsDisabled.eq(false))
                .add(codes::Column::Status.eq(true)),
        )
        .await?;
        let unused = count(
            "count unused codes",
            live()
                .add(codes::Column::IsDisabled.eq(false))
                .add(codes::Column::Status.eq(false)),
        )
        .await?;

        Ok(CodeCounts {
            total,
            used,
            unused,
            disabled,
            expired,
        })
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn code_to_active_model(code: &Code) -> codes::ActiveModel {
    codes::ActiveModel {
        id: Set(code.id.0),
        project_id: Set(code.project_id.0),
        code: Set(code.code.clone()),
        status: Set(code.used),
        is_disabled: Set(code.is_disabled),
        expires_at: Set(code.expires_at),
        verified_at: Set(code.verified_at),
        verified_by: Set(code.verified_by.clone()),
        created_at: Set(code.created_at),
    }
}

fn code_from_model(model: codes::Model) -> Code {
    Code {
        id: CodeId(model.id),
        project_id: ProjectId(model.project_id),
        code: model.code,
        used: model.status,
        is_disabled: model.is_disabled,
        expires_at: model.expires_at,
        verified_at: model.verified_at,
        verified_by: model.verified_by,
        created_at: model.created_at,
    }
}

// ── API key repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbApiKeyRepository {
    pub db: DatabaseConnection,
}

impl ApiKeyRepository for DbApiKeyRepository {
    async fn upsert_for_project(&self, key: &ApiKey) -> Result<ApiKey, CodegateError> {
        let model = api_keys::Entity::insert(api_keys::ActiveModel {
            id: Set(key.id.0),
            project_id: Set(key.project_id.0),
            api_key: Set(key.api_key.clone()),
            secret: Set(key.secret.clone()),
            name: Set(key.name.clone()),
            is_active: Set(key.is_active),
            last_used_at: Set(key.last_used_at),
            created_at: Set(key.created_at),
            created_by: Set(key.created_by.clone()),
        })
        // Replace in place: the row id survives, the old secret stops matching on commit.
        .on_conflict(
            OnConflict::column(api_keys::Column::ProjectId)
                .update_columns([
                    api_keys::Column::ApiKey,
                    api_keys::Column::Secret,
                    api_keys::Column::Name,
                    api_keys::Column::IsActive,
                    api_keys::Column::LastUsedAt,
                    api_keys::Column::CreatedAt,
                    api_keys::Column::CreatedBy,
                ])
                .to_owned(),
        )
        .exec_with_returning(&self.db)
        .await
        .context("upsert api key")?;
        Ok(api_key_from_model(model))
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<ApiKey>, CodegateError> {
        let model = retry_read("find api key", || {
            api_keys::Entity::find()
                .filter(api_keys::Column::ApiKey.eq(api_key))
                .one(&self.db)
        })
        .await
        .context("find api key")?;
        Ok(model.map(api_key_from_model))
    }

    async fn find_by_project(
        &self,
        project_id: ProjectId,
    ) -> Result<Option<ApiKey>, CodegateError> {
        let model = retry_read("find api key by project", || {
            api_keys::Entity::find()
                .filter(api_keys::Column::ProjectId.eq(project_id.0))
                .one(&self.db)
        })
        .await
        .context("find api key by project")?;
        Ok(model.map(api_key_from_model))
    }

    async fn set_active(
        &self,
        project_id: ProjectId,
        id: ApiKeyId,
        active: bool,
    ) -> Result<Option<ApiKey>, CodegateError> {
        let result = api_keys::Entity::update_many()
            .col_expr(api_keys::Column::IsActive, Expr::value(active))
            .filter(api_keys::Column::Id.eq(id.0))
            .filter(api_keys::Column::ProjectId.eq(project_id.0))
            .exec(&self.db)
            .await
            .context("set api key active")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_project(project_id).await
    }

    async fn delete(&self, project_id: ProjectId, id: ApiKeyId) -> Result<bool, CodegateError> {
        let result = api_keys::Entity::delete_many()
            .filter(api_keys::Column::Id.eq(id.0))
            .filter(api_keys::Column::ProjectId.eq(project_id.0))
            .exec(&self.db)
            .await
            .context("delete api key")?;
        Ok(result.rows_affected > 0)
    }

    async fn touch_last_used(
        &self,
        id: ApiKeyId,
        at: DateTime<Utc>,
    ) -> Result<(), CodegateError> {
        api_keys::Entity::update_many()
            .col_expr(api_keys::Column::LastUsedAt, Expr::value(Some(at)))
            .filter(api_keys::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("touch api key last_used_at")?;
        Ok(())
    }
}

fn api_key_from_model(model: api_keys::Model) -> ApiKey {
    ApiKey {
        id: ApiKeyId(model.id),
        project_id: ProjectId(model.project_id),
        api_key: model.api_key,
        secret: model.secret,
        name: model.name,
        is_active: model.is_active,
        last_used_at: model.last_used_at,
        created_at: model.created_at,
        created_by: model.created_by,
    }
}

// ── Verification log repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationLogRepository {
    pub db: DatabaseConnection,
}

impl VerificationLogRepository for DbVerificationLogRepository {
    async fn append(&self, entry: &VerificationLogEntry) -> Result<(), CodegateError> {
        log_to_active_model(entry)
            .insert(&self.db)
            .await
            .context("append verification log")?;
        Ok(())
    }

    async fn list(
        &self,
        project_id: ProjectId,
        result: Option<LogResult>,
        page: PageRequest,
    ) -> Result<Page<VerificationLogEntry>, CodegateError> {
        let mut select = verification_logs::Entity::find()
            .filter(verification_logs::Column::ProjectId.eq(project_id.0));
        if let Some(result) = result {
            select = select.filter(verification_logs::Column::Result.eq(result.as_str()));
        }
        let total = retry_read("count verification logs", || select.clone().count(&self.db))
            .await
            .context("count verification logs")?;
        let models = retry_read("list verification logs", || {
            select
                .clone()
                .order_by_desc(verification_logs::Column::VerifiedAt)
                .paginate_by(page)
                .all(&self.db)
        })
        .await
        .context("list verification logs")?;
        let items = models
            .into_iter()
            .map(log_from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, page))
    }

    async fn recent(
        &self,
        project_id: ProjectId,
        limit: u64,
    ) -> Result<Vec<VerificationLogEntry>, CodegateError> {
        let models = retry_read("recent verification logs", || {
            verification_logs::Entity::find()
                .filter(verification_logs::Column::ProjectId.eq(project_id.0))
                .order_by_desc(verification_logs::Column::VerifiedAt)
                .limit(limit)
                .all(&self.db)
        })
        .await
        .context("recent verification logs")?;
        models.into_iter().map(log_from_model).collect()
    }
}

async fn insert_log(txn: &DatabaseTransaction, entry: &VerificationLogEntry) -> Result<(), DbErr> {
    log_to_active_model(entry).insert(txn).await?;
    Ok(())
}

fn log_to_active_model(entry: &VerificationLogEntry) -> verification_logs::ActiveModel {
    verification_logs::ActiveModel {
        id: Set(entry.id),
        project_id: Set(entry.project_id.0),
        code_id: Set(entry.code_id.map(|id| id.0)),
        code: Set(entry.code.clone()),
        verified_at: Set(entry.verified_at),
        verified_by: Set(entry.verified_by.clone()),
        result: Set(entry.result.as_str().to_owned()),
        reason: Set(entry.reason.clone()),
        ip_address: Set(entry.ip_address.clone()),
        user_agent: Set(entry.user_agent.clone()),
    }
}

fn log_from_model(model: verification_logs::Model) -> Result<VerificationLogEntry, CodegateError> {
    let result = model
        .result
        .parse::<LogResult>()
        .map_err(anyhow::Error::msg)
        .context("decode verification log result")?;
    Ok(VerificationLogEntry {
        id: model.id,
        project_id: ProjectId(model.project_id),
        code_id: model.code_id.map(CodeId),
        code: model.code,
        verified_at: model.verified_at,
        verified_by: model.verified_by,
        result,
        reason: model.reason,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
    })
}
