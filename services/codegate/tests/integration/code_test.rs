use std::collections::HashSet;
use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};

use codegate::domain::types::{ClientInfo, CodeFilter, LogResult};
use codegate::error::CodegateError;
use codegate::usecase::code::{
    BatchDisableUnusedUseCase, CodeRef, DeleteCodeUseCase, GenerateCodesInput,
    GenerateCodesUseCase, GetCodeUseCase, ListCodesUseCase, SetCodeDisabledUseCase,
};
use codegate::usecase::generator::GeneratorParams;
use codegate::usecase::log::{ListLogsUseCase, StatisticsUseCase};
use codegate::usecase::verify::VerifyCodeUseCase;
use codegate_domain::id::{CodeId, ProjectId};
use codegate_domain::pagination::PageRequest;

use crate::helpers::{
    MockCodeRepo, MockProjectRepo, MockStore, past, test_code, test_project, used_code,
};

fn generator(store: &MockStore) -> GenerateCodesUseCase<MockProjectRepo, MockCodeRepo> {
    GenerateCodesUseCase {
        projects: store.projects(),
        codes: store.codes(),
        default_length: 12,
    }
}

fn input(count: u32) -> GenerateCodesInput {
    GenerateCodesInput {
        count,
        expires_at: None,
        params: GeneratorParams::default(),
    }
}

fn batch(store: &MockStore) -> BatchDisableUnusedUseCase<MockProjectRepo, MockCodeRepo> {
    BatchDisableUnusedUseCase {
        projects: store.projects(),
        codes: store.codes(),
    }
}

// ── GenerateCodesUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_generate_unique_unused_codes() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());

    let (_, codes) = generator(&store).execute(project.id, input(3)).await.unwrap();

    assert_eq!(codes.len(), 3);
    let unique: HashSet<&str> = codes.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(unique.len(), 3);
    assert!(codes.iter().all(|c| !c.used && !c.is_disabled && c.code.len() == 12));
    assert_eq!(store.codes.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn should_regenerate_when_a_concurrent_insert_takes_a_code() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    store.race_next_insert.store(true, Ordering::SeqCst);

    let (_, codes) = generator(&store).execute(project.id, input(4)).await.unwrap();

    assert_eq!(codes.len(), 4);
    let unique: HashSet<&str> = codes.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(unique.len(), 4);
    // The racing writer's code plus ours, with no duplicate strings.
    let stored = store.codes.lock().unwrap().clone();
    assert_eq!(stored.len(), 5);
    let stored_unique: HashSet<&str> = stored.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(stored_unique.len(), 5);
    let raced = stored.iter().find(|c| !codes.iter().any(|ours| ours.id == c.id)).unwrap();
    assert!(!unique.contains(raced.code.as_str()));
}

#[tokio::test]
async fn should_apply_prefix_suffix_and_length() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());

    let (_, codes) = generator(&store)
        .execute(
            project.id,
            GenerateCodesInput {
                count: 5,
                expires_at: None,
                params: GeneratorParams {
                    prefix: Some("VIP-".into()),
                    suffix: None,
                    length: Some(10),
                },
            },
        )
        .await
        .unwrap();

    assert!(codes.iter().all(|c| c.code.starts_with("VIP-") && c.code.len() == 10));
}

#[tokio::test]
async fn should_avoid_codes_already_stored() {
    // One random character leaves 36 codes; two are stored before generating.
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    store.insert_code(test_code(project.id, "A"));
    store.insert_code(test_code(project.id, "B"));

    let (_, codes) = generator(&store)
        .execute(
            project.id,
            GenerateCodesInput {
                count: 30,
                expires_at: None,
                params: GeneratorParams {
                    length: Some(1),
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();

    assert_eq!(codes.len(), 30);
    assert!(codes.iter().all(|c| c.code != "A" && c.code != "B"));
    let all: HashSet<String> = store.codes.lock().unwrap().iter().map(|c| c.code.clone()).collect();
    assert_eq!(all.len(), 32);
}

#[tokio::test]
async fn should_reject_out_of_range_count() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());

    for count in [0, 10_001] {
        let result = generator(&store).execute(project.id, input(count)).await;
        assert!(
            matches!(result, Err(CodegateError::Validation(_))),
            "count {count}: expected Validation, got {result:?}"
        );
    }
    assert!(store.codes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_generation_for_disabled_project() {
    let mut project = test_project();
    project.enabled = false;
    let store = MockStore::with_project(project.clone());

    let result = generator(&store).execute(project.id, input(1)).await;

    assert!(matches!(result, Err(CodegateError::Validation(_))));
}

#[tokio::test]
async fn should_reject_generation_for_missing_project() {
    let store = MockStore::default();

    let result = generator(&store).execute(ProjectId::new(), input(1)).await;

    assert!(matches!(result, Err(CodegateError::Validation(_))));
}

#[tokio::test]
async fn should_leave_expiry_unset_to_follow_project() {
    let mut project = test_project();
    project.expires_at = Some(Utc::now() + Duration::days(7));
    let store = MockStore::with_project(project.clone());

    let (returned, codes) = generator(&store).execute(project.id, input(1)).await.unwrap();

    assert_eq!(codes[0].expires_at, None);
    assert_eq!(
        codes[0].effective_expires_at(returned.expires_at),
        project.expires_at
    );
}

// ── Get / List ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_get_code_by_id_and_by_string() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    let code = test_code(project.id, "FINDME");
    store.insert_code(code.clone());
    let usecase = GetCodeUseCase {
        projects: store.projects(),
        codes: store.codes(),
    };

    let (_, by_id) = usecase.execute(project.id, CodeRef::Id(code.id)).await.unwrap();
    let (_, by_code) = usecase
        .execute(project.id, CodeRef::Code("FINDME".into()))
        .await
        .unwrap();

    assert_eq!(by_id, code);
    assert_eq!(by_code, code);
    let missing = usecase.execute(project.id, CodeRef::Id(CodeId::new())).await;
    assert!(matches!(missing, Err(CodegateError::CodeNotFound)));
}

#[tokio::test]
async fn should_filter_listing_by_status_and_search() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    store.insert_code(test_code(project.id, "SUMMER-1"));
    store.insert_code(used_code(project.id, "SUMMER-2"));
    store.insert_code(test_code(project.id, "WINTER-1"));
    let usecase = ListCodesUseCase {
        projects: store.projects(),
        codes: store.codes(),
    };
    let filter = CodeFilter {
        used: Some(false),
        search: Some("SUMMER".into()),
        ..Default::default()
    };

    let (_, page) = usecase
        .execute(project.id, &filter, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].code, "SUMMER-1");
}

#[tokio::test]
async fn should_filter_listing_by_project_level_expiry() {
    let mut project = test_project();
    project.expires_at = Some(past(1));
    let store = MockStore::with_project(project.clone());
    store.insert_code(test_code(project.id, "INHERITS"));
    store.insert_code(test_code(project.id, "OWN"));
    store.codes.lock().unwrap()[1].expires_at = Some(Utc::now() + Duration::days(1));
    let usecase = ListCodesUseCase {
        projects: store.projects(),
        codes: store.codes(),
    };
    let filter = CodeFilter {
        is_expired: Some(true),
        ..Default::default()
    };

    let (_, page) = usecase
        .execute(project.id, &filter, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].code, "INHERITS");
}

// ── SetCodeDisabled / Delete ─────────────────────────────────────────────────

#[tokio::test]
async fn should_disable_used_code_without_touching_status() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    let code = used_code(project.id, "USED");
    store.insert_code(code.clone());
    let usecase = SetCodeDisabledUseCase {
        projects: store.projects(),
        codes: store.codes(),
    };

    let (_, updated) = usecase.execute(project.id, code.id, true).await.unwrap();

    assert!(updated.is_disabled);
    assert!(updated.used);
    assert_eq!(updated.verified_by, code.verified_by);
}

#[tokio::test]
async fn should_not_toggle_code_of_another_project() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    let code = test_code(project.id, "MINE");
    store.insert_code(code.clone());
    let usecase = SetCodeDisabledUseCase {
        projects: store.projects(),
        codes: store.codes(),
    };

    let other = test_project();
    store.projects.lock().unwrap().push(other.clone());
    let result = usecase.execute(other.id, code.id, true).await;

    assert!(matches!(result, Err(CodegateError::CodeNotFound)));
    assert!(!store.code(code.id).is_disabled);
}

#[tokio::test]
async fn should_delete_code_once() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    let code = test_code(project.id, "GONE");
    store.insert_code(code.clone());
    let usecase = DeleteCodeUseCase {
        codes: store.codes(),
    };

    usecase.execute(project.id, code.id).await.unwrap();
    let again = usecase.execute(project.id, code.id).await;

    assert!(store.codes.lock().unwrap().is_empty());
    assert!(matches!(again, Err(CodegateError::CodeNotFound)));
}

// ── BatchDisableUnusedUseCase ────────────────────────────────────────────────

fn seed_mixed(store: &MockStore, project_id: ProjectId) {
    store.insert_code(test_code(project_id, "UNUSED-1"));
    store.insert_code(test_code(project_id, "UNUSED-2"));
    store.insert_code(test_code(project_id, "OTHER-1"));
    store.insert_code(used_code(project_id, "USED-1"));
    let mut disabled = test_code(project_id, "DISABLED-1");
    disabled.is_disabled = true;
    store.insert_code(disabled);
    let mut expired = test_code(project_id, "EXPIRED-1");
    expired.expires_at = Some(past(10));
    store.insert_code(expired);
}

#[tokio::test]
async fn should_disable_only_live_unused_codes_once() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    seed_mixed(&store, project.id);
    let filter = CodeFilter::default();

    let first = batch(&store).execute(project.id, &filter).await.unwrap();
    let second = batch(&store).execute(project.id, &filter).await.unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, 0);
    let codes = store.codes.lock().unwrap();
    let used = codes.iter().find(|c| c.code == "USED-1").unwrap();
    assert!(used.used && !used.is_disabled);
    let expired = codes.iter().find(|c| c.code == "EXPIRED-1").unwrap();
    assert!(!expired.is_disabled);
}

#[tokio::test]
async fn should_preview_the_same_count_the_batch_applies() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    seed_mixed(&store, project.id);
    let filter = CodeFilter {
        search: Some("UNUSED".into()),
        ..Default::default()
    };

    let preview = batch(&store).count(project.id, &filter).await.unwrap();
    let applied = batch(&store).execute(project.id, &filter).await.unwrap();

    assert_eq!(preview, 2);
    assert_eq!(applied, preview);
    assert!(!store.codes.lock().unwrap().iter().find(|c| c.code == "OTHER-1").unwrap().is_disabled);
}

#[tokio::test]
async fn should_skip_codes_expired_through_project() {
    let mut project = test_project();
    project.expires_at = Some(past(1));
    let store = MockStore::with_project(project.clone());
    store.insert_code(test_code(project.id, "INHERITS"));

    let preview = batch(&store).count(project.id, &CodeFilter::default()).await.unwrap();
    let applied = batch(&store)
        .execute(project.id, &CodeFilter::default())
        .await
        .unwrap();

    assert_eq!((preview, applied), (0, 0));
}

// ── Logs and statistics ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_report_statistics_by_effective_state() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    seed_mixed(&store, project.id);
    let verify = VerifyCodeUseCase {
        projects: store.projects(),
        codes: store.codes(),
        logs: store.logs(),
    };
    verify
        .execute(project.id, "UNUSED-1", Some("alice"), &ClientInfo::default())
        .await
        .unwrap();
    verify
        .execute(project.id, "NOPE", Some("bob"), &ClientInfo::default())
        .await
        .unwrap();
    let usecase = StatisticsUseCase {
        projects: store.projects(),
        codes: store.codes(),
        logs: store.logs(),
    };

    let stats = usecase.execute(project.id).await.unwrap();

    assert_eq!(stats.counts.total, 6);
    assert_eq!(stats.counts.used, 2);
    assert_eq!(stats.counts.unused, 2);
    assert_eq!(stats.counts.disabled, 1);
    assert_eq!(stats.counts.expired, 1);
    assert!((stats.counts.usage_rate() - 2.0 / 6.0).abs() < f64::EPSILON);
    assert_eq!(stats.recent.len(), 2);
}

#[tokio::test]
async fn should_filter_logs_by_result() {
    let project = test_project();
    let store = MockStore::with_project(project.clone());
    store.insert_code(test_code(project.id, "ONCE"));
    let verify = VerifyCodeUseCase {
        projects: store.projects(),
        codes: store.codes(),
        logs: store.logs(),
    };
    verify
        .execute(project.id, "ONCE", None, &ClientInfo::default())
        .await
        .unwrap();
    verify
        .execute(project.id, "ONCE", None, &ClientInfo::default())
        .await
        .unwrap();
    verify
        .execute(project.id, "ONCE", None, &ClientInfo::default())
        .await
        .unwrap();
    let usecase = ListLogsUseCase {
        projects: store.projects(),
        logs: store.logs(),
    };

    let failed = usecase
        .execute(project.id, Some(LogResult::Failed), PageRequest::default())
        .await
        .unwrap();
    let all = usecase
        .execute(project.id, None, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(failed.total, 2);
    assert!(failed.items.iter().all(|l| l.reason.as_deref() == Some("CODE_ALREADY_USED")));
    assert_eq!(all.total, 3);
}
