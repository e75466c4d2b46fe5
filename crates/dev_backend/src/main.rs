use std::net::SocketAddr;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::{
    error::ErrorDetail,
    protocol::{
        AuthResponse, CredentialsRequest, GuestRequest, InputRequest, PlanResult,
        WorkflowRunRequest,
    },
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod plan;

use app_state::AppState;
use config::load_settings;

type ApiError = (StatusCode, Json<ErrorDetail>);

fn reject(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorDetail::new(message)))
}

/// FastAPI-style validation body: a list of `{loc, msg}` entries.
fn reject_fields(problems: &[(&str, &str)]) -> ApiError {
    let detail = problems
        .iter()
        .map(|(field, msg)| json!({ "loc": ["body", field], "msg": msg }))
        .collect::<Vec<_>>();
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorDetail {
            detail: Some(Value::Array(detail)),
        }),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let app = build_router(AppState::default());

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "dev backend listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/guest", post(guest))
        .route("/input", post(submit_input))
        .route("/workflow/run", post(run_workflow))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn validate_credentials(req: &CredentialsRequest) -> Result<(), ApiError> {
    let mut problems = Vec::new();
    if req.email.trim().is_empty() {
        problems.push(("email", "email must not be empty"));
    }
    if req.password.is_empty() {
        problems.push(("password", "password must not be empty"));
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(reject_fields(&problems))
    }
}

async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_credentials(&req)?;
    let mut store = state.store.write().await;
    if store.account(&req.email).is_some() {
        return Err(reject(StatusCode::CONFLICT, "Email already registered"));
    }
    let account = store.create_account(&req.email, Some(&req.password));
    info!(user_id = %account.user_id, "account created");
    Ok(Json(AuthResponse {
        user_id: account.user_id,
        email: Some(account.email),
    }))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_credentials(&req)?;
    let store = state.store.read().await;
    let account = store
        .account(&req.email)
        .filter(|account| account.password_matches(&req.password))
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;
    Ok(Json(AuthResponse {
        user_id: account.user_id.clone(),
        email: Some(account.email.clone()),
    }))
}

async fn guest(
    State(state): State<AppState>,
    Json(req): Json<GuestRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if req.email.trim().is_empty() {
        return Err(reject_fields(&[("email", "email must not be empty")]));
    }
    let mut store = state.store.write().await;
    let account = match store.account(&req.email) {
        Some(account) if account.is_guest() => account.clone(),
        Some(_) => return Err(reject(StatusCode::CONFLICT, "Email already registered")),
        None => {
            let account = store.create_account(&req.email, None);
            info!(user_id = %account.user_id, "guest account created");
            account
        }
    };
    Ok(Json(AuthResponse {
        user_id: account.user_id,
        email: Some(account.email),
    }))
}

async fn submit_input(
    State(state): State<AppState>,
    Json(req): Json<InputRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut store = state.store.write().await;
    if !store.has_user(&req.user_id) {
        warn!(user_id = %req.user_id, "baseline for unknown user");
        return Err(reject(StatusCode::NOT_FOUND, "User not found"));
    }
    info!(user_id = %req.user_id, "baseline stored");
    store.store_baseline(req);
    Ok(Json(json!({ "status": "ok" })))
}

async fn run_workflow(
    State(state): State<AppState>,
    Json(req): Json<WorkflowRunRequest>,
) -> Result<Json<PlanResult>, ApiError> {
    let store = state.store.read().await;
    if !store.has_user(&req.user_id) {
        warn!(user_id = %req.user_id, "workflow for unknown user");
        return Err(reject(StatusCode::NOT_FOUND, "User not found"));
    }
    info!(user_id = %req.user_id, "running plan workflow");
    Ok(Json(plan::build_plan(store.baseline(&req.user_id))))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
