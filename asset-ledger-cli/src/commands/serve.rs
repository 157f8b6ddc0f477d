//! HTTP surface for the dashboard UI.
//!
//! Requests run on a current-thread runtime, so store operations execute one
//! at a time just as they do from the command line.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use asset_ledger_lib::dashboard::{
    Ack, CategoriesResponse, CategoryRequest, CategoryView, EntityUpdateRequest,
    MediaStatusRequest, RebuildResponse, StatusRequest, TransitionResponse,
};
use asset_ledger_lib::{ApiResponse, Dashboard, LedgerError};

use crate::CliError;

/// A request that never produced a dashboard response.
///
/// A body that is not JSON, or whose fields have the wrong types, is the
/// caller's mistake and travels like any expected failure: status 200 with
/// `{success: false}`. A store error the dashboard did not anticipate is a
/// 500 with the same body shape.
enum ServerError {
    Body(JsonRejection),
    Store(LedgerError),
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        Self::Store(e)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Body(rejection) => {
                log::debug!("Rejected request body: {}", rejection.body_text());
                (StatusCode::OK, format!("Invalid request body: {}", rejection.body_text()))
            }
            Self::Store(e) => {
                log::error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        let body = json!({
            "success": false,
            "error": error,
        });
        (status, Json(body)).into_response()
    }
}

type Shared = State<Arc<Dashboard>>;
type ApiResult<T> = Result<Json<ApiResponse<T>>, ServerError>;

async fn manifest(State(dashboard): Shared) -> ApiResult<CategoriesResponse> {
    Ok(Json(dashboard.categories()?))
}

async fn get_category(
    State(dashboard): Shared,
    body: Result<Json<CategoryRequest>, JsonRejection>,
) -> ApiResult<CategoryView> {
    let Json(req) = body?;
    Ok(Json(dashboard.get_category(&req.category)?))
}

async fn update_category_status(
    State(dashboard): Shared,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Ack> {
    let Json(req) = body?;
    Ok(Json(dashboard.set_status(
        &req.category,
        &req.file,
        &req.id,
        &req.status,
        req.note.as_deref(),
    )?))
}

async fn update_consumed_status(
    State(dashboard): Shared,
    body: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Ack> {
    let Json(req) = body?;
    Ok(Json(dashboard.set_consumed_status(
        &req.category,
        &req.file,
        &req.id,
        &req.status,
        req.note.as_deref(),
    )?))
}

async fn update_entity(
    State(dashboard): Shared,
    body: Result<Json<EntityUpdateRequest>, JsonRejection>,
) -> ApiResult<Ack> {
    let Json(req) = body?;
    Ok(Json(dashboard.update_entity(
        &req.category,
        &req.file,
        &req.id,
        &req.updates,
    )?))
}

async fn change_status(
    State(dashboard): Shared,
    body: Result<Json<MediaStatusRequest>, JsonRejection>,
) -> ApiResult<TransitionResponse> {
    let Json(req) = body?;
    Ok(Json(dashboard.transition_media(&req.path, &req.status)?))
}

async fn sync_assets(State(dashboard): Shared) -> ApiResult<RebuildResponse> {
    Ok(Json(dashboard.rebuild_manifest()?))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

pub(crate) fn router(dashboard: Dashboard) -> Router {
    Router::new()
        .route("/api/manifest", get(manifest))
        .route("/api/get_category", post(get_category))
        .route("/api/update_category_status", post(update_category_status))
        .route("/api/update_consumed_status", post(update_consumed_status))
        .route("/api/update_entity", post(update_entity))
        .route("/api/change_status", post(change_status))
        .route("/api/sync_assets", post(sync_assets))
        .fallback(not_found)
        .with_state(Arc::new(dashboard))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        log::info!("Shutting down");
    }
}

/// Serve until interrupted.
pub(crate) fn run_serve(dashboard: Dashboard, bind: Option<String>) -> Result<bool, CliError> {
    let addr = bind.unwrap_or_else(|| dashboard.project().config().server.bind.clone());
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| CliError::runtime(format!("Failed to bind {}: {}", addr, e)))?;
        log::info!(
            "Serving {} on http://{}",
            dashboard.project().root().display(),
            addr
        );
        axum::serve(listener, router(dashboard))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| CliError::runtime(format!("Server error: {}", e)))?;
        Ok::<_, CliError>(true)
    })
}
