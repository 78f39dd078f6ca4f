use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};

use codegate_core::health::healthz;
use codegate_core::middleware::{
    propagate_request_id_layer, request_id_layer, timeout_layer, trace_layer,
};

use crate::handlers::{
    api_keys::{create_or_refresh_api_key, delete_api_key, list_api_keys, toggle_api_key},
    codes::{
        admin_reactivate_code, admin_verify_code, batch_disable_unused, count_disable_candidates,
        delete_code, generate_codes, get_code, list_codes, set_code_disabled,
    },
    health::readyz,
    logs::{get_statistics, list_logs},
    projects::{create_project, delete_project, get_project, list_projects, update_project},
    sdk,
};
use crate::middleware::{limit_verify_attempts, require_signature};
use crate::state::AppState;

const ADMIN_PROJECT: &str = "/api/v1/admin/projects/{project_id}";
const SDK_PROJECT: &str = "/api/v1/sdk/projects/{project_id}";

pub fn build_router(state: AppState, request_timeout_secs: u64) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(admin_routes(state.clone()))
        .merge(sdk_routes(state.clone()))
        .layer(timeout_layer(request_timeout_secs))
        .layer(trace_layer())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}

fn admin_routes(state: AppState) -> Router<AppState> {
    let p = |suffix: &str| format!("{ADMIN_PROJECT}{suffix}");
    Router::new()
        // Projects
        .route("/api/v1/admin/projects", post(create_project))
        .route("/api/v1/admin/projects", get(list_projects))
        .route(ADMIN_PROJECT, get(get_project))
        .route(ADMIN_PROJECT, patch(update_project))
        .route(ADMIN_PROJECT, delete(delete_project))
        // Codes
        .route(&p("/codes"), post(generate_codes))
        .route(&p("/codes"), get(list_codes))
        .route(
            &p("/codes/verify"),
            post(admin_verify_code)
                .route_layer(from_fn_with_state(state, limit_verify_attempts)),
        )
        .route(&p("/codes/batch-disable-unused"), post(batch_disable_unused))
        .route(
            &p("/codes/batch-disable-unused/count"),
            get(count_disable_candidates),
        )
        .route(&p("/codes/{code_id}"), get(get_code))
        .route(&p("/codes/{code_id}"), delete(delete_code))
        .route(&p("/codes/{code_id}/disabled"), patch(set_code_disabled))
        .route(&p("/codes/{code_id}/reactivate"), post(admin_reactivate_code))
        // API keys
        .route(&p("/api-keys"), get(list_api_keys))
        .route(&p("/api-keys"), post(create_or_refresh_api_key))
        .route(&p("/api-keys/{key_id}"), patch(toggle_api_key))
        .route(&p("/api-keys/{key_id}"), delete(delete_api_key))
        // Logs
        .route(&p("/logs"), get(list_logs))
        .route(&p("/statistics"), get(get_statistics))
}

fn sdk_routes(state: AppState) -> Router<AppState> {
    let p = |suffix: &str| format!("{SDK_PROJECT}{suffix}");
    Router::new()
        .route(SDK_PROJECT, get(sdk::get_project))
        .route(&p("/codes"), get(sdk::list_codes))
        .route(
            &p("/codes/verify"),
            post(sdk::verify)
                .route_layer(from_fn_with_state(state.clone(), limit_verify_attempts)),
        )
        .route(&p("/codes/reactivate"), post(sdk::reactivate))
        .route(&p("/codes/by-code/{code}"), get(sdk::get_code_by_code))
        .route(&p("/codes/{code_id}"), get(sdk::get_code))
        .route(&p("/statistics"), get(sdk::statistics))
        .route_layer(from_fn_with_state(state, require_signature))
}
