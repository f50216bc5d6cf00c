use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    ClassifyError, FormError, FormState, ModelCatalog, RunCommand, TimeSeries, ValidationMode,
    apply_defaults, classify_snapshot, extract_commands,
};

mod store;
mod users;

pub use store::{SnapshotStore, StoreError};
pub use users::{MemoryUserStore, UserError, UserRepository};

const INDEX_HTML: &str = "<!doctype html><title>simdash</title>\
<h1>Simulation model dashboard</h1>\
<p>JSON API: /api/models, /api/results, /api/run-form</p>";

/// Server configuration assembled by the CLI.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub validation: ValidationMode,
}

#[derive(Clone)]
struct AppState {
    store: SnapshotStore,
    validation: ValidationMode,
    users: Arc<dyn UserRepository>,
}

#[derive(Debug, Error)]
enum ApiFailure {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Form(#[from] FormError),
}

impl ApiFailure {
    fn status(&self) -> StatusCode {
        match self {
            ApiFailure::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiFailure::Classify(_) | ApiFailure::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelsResponse {
    models: ModelCatalog,
    model_choices: Vec<(String, String)>,
    input_choices: Vec<(String, String)>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunFormResponse {
    form: FormState,
    model_choices: Vec<(String, String)>,
    input_choices: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
struct CredentialsPayload {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub async fn run_http_server(port: u16, config: ServerConfig) -> std::io::Result<()> {
    let state = AppState {
        store: SnapshotStore::new(config.data_dir.clone()),
        validation: config.validation,
        users: Arc::new(MemoryUserStore::new()),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/api/models", get(models_handler))
        .route("/api/results", get(results_handler))
        .route(
            "/api/run-form",
            get(run_form_get_handler).post(run_form_post_handler),
        )
        .route("/api/users/register", post(register_handler))
        .route("/api/users/login", post(login_handler))
        .fallback(not_found_handler)
        .with_state(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, data_dir = %config.data_dir.display(), validation = ?config.validation, "dashboard API listening");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn models_handler(State(state): State<AppState>) -> Response {
    match load_models(&state.store) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(failure) => failure_response(failure),
    }
}

async fn results_handler(State(state): State<AppState>) -> Response {
    match classified_results(&state.store) {
        Ok(series) => json_response(StatusCode::OK, series),
        Err(failure) => failure_response(failure),
    }
}

async fn run_form_get_handler(State(state): State<AppState>) -> Response {
    match run_form_defaults(&state.store) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(failure) => failure_response(failure),
    }
}

async fn run_form_post_handler(
    State(state): State<AppState>,
    Json(form): Json<FormState>,
) -> Response {
    match submit_run_form(&state.store, &form, state.validation) {
        Ok(commands) => json_response(StatusCode::OK, commands),
        Err(failure) => failure_response(failure),
    }
}

async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Response {
    match state.users.register(&payload.username, &payload.password) {
        Ok(()) => json_response(StatusCode::CREATED, OkResponse { ok: true }),
        Err(err @ UserError::Duplicate { .. }) => {
            error_response(StatusCode::CONFLICT, &err.to_string())
        }
        Err(err @ UserError::EmptyCredentials) => {
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Response {
    if state.users.verify(&payload.username, &payload.password) {
        json_response(StatusCode::OK, OkResponse { ok: true })
    } else {
        error_response(StatusCode::UNAUTHORIZED, "Invalid username or password")
    }
}

fn load_models(store: &SnapshotStore) -> Result<ModelsResponse, ApiFailure> {
    let catalog = store.load_catalog()?;
    let model_choices = catalog.model_choices();
    let input_choices = catalog.input_choices();
    Ok(ModelsResponse {
        models: catalog,
        model_choices,
        input_choices,
    })
}

fn classified_results(store: &SnapshotStore) -> Result<Vec<TimeSeries>, ApiFailure> {
    let snapshot = store.load_results()?;
    Ok(classify_snapshot(&snapshot)?)
}

fn run_form_defaults(store: &SnapshotStore) -> Result<RunFormResponse, ApiFailure> {
    let catalog = store.load_catalog()?;
    let commands = store.load_commands()?;
    let mut form = FormState::default();
    apply_defaults(&commands, &mut form);
    Ok(RunFormResponse {
        form,
        model_choices: catalog.model_choices(),
        input_choices: catalog.input_choices(),
    })
}

fn submit_run_form(
    store: &SnapshotStore,
    form: &FormState,
    validation: ValidationMode,
) -> Result<Vec<RunCommand>, ApiFailure> {
    let catalog = store.load_catalog()?;
    let commands = extract_commands(form, &catalog, validation)?;
    store.save_commands(&commands)?;
    info!(count = commands.len(), "stored run configuration");
    // TODO: hand the stored configuration to the execution engine once
    // one exists; today the dashboard only persists it.
    Ok(commands)
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn failure_response(failure: ApiFailure) -> Response {
    warn!(error = %failure, "request failed");
    error_response(failure.status(), &failure.to_string())
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
