use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::models::connection_log::{
    ConnectionLog, ConnectionLogListParams, ConnectionLogPage, CreateConnectionLogRequest,
    CreatedConnectionLog,
};
use crate::services::connection_log as service;
use crate::validation::collect_field_errors;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/connection-logs",
    params(ConnectionLogListParams),
    responses(
        (status = 200, description = "One page of connection logs", body = ConnectionLogPage),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Server error")
    )
)]
pub async fn list_connection_logs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConnectionLogListParams>,
) -> impl IntoResponse {
    let query = match params.normalize() {
        Ok(query) => query,
        Err(errors) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
        }
    };

    match service::get_connection_logs(&state.db, &query).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            tracing::error!("Error fetching connection logs: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/connection-logs/{id}",
    params(
        ("id" = i64, Path, description = "Connection log ID")
    ),
    responses(
        (status = 200, description = "Connection log", body = ConnectionLog),
        (status = 404, description = "Not found"),
        (status = 500, description = "Server error")
    )
)]
pub async fn get_connection_log_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match service::get_connection_log_by_id(&state.db, id).await {
        Ok(Some(log)) => (StatusCode::OK, Json(log)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Connection log not found" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error fetching connection log ({}): {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

// An empty list is a normal answer here, never a 404.
#[utoipa::path(
    get,
    path = "/api/connection-logs/server/{server_id}",
    params(
        ("server_id" = i64, Path, description = "Server ID")
    ),
    responses(
        (status = 200, description = "Connection logs for the server", body = Vec<ConnectionLog>),
        (status = 500, description = "Server error")
    )
)]
pub async fn get_connection_logs_by_server_id(
    State(state): State<Arc<AppState>>,
    Path(server_id): Path<i64>,
) -> impl IntoResponse {
    match service::get_connection_logs_by_server_id(&state.db, server_id).await {
        Ok(logs) => (StatusCode::OK, Json(logs)).into_response(),
        Err(e) => {
            tracing::error!("Error fetching connection logs by server ID ({}): {}", server_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/connection-logs",
    request_body = CreateConnectionLogRequest,
    responses(
        (status = 201, description = "Connection log created", body = CreatedConnectionLog),
        (status = 400, description = "Invalid request body"),
        (status = 500, description = "Server error")
    )
)]
pub async fn create_connection_log(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateConnectionLogRequest>,
) -> impl IntoResponse {
    if let Err(errors) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": collect_field_errors(&errors) })),
        )
            .into_response();
    }

    match service::create_connection_log(&state.db, &payload).await {
        Ok(log) => {
            let is_custom = state.config.is_custom_domain(&payload.full_domain);
            (StatusCode::CREATED, Json(log.with_domain_flag(is_custom))).into_response()
        }
        Err(e) => {
            tracing::error!("Error creating connection log: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": format!("Error creating connection log: {}", e) })),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/connection-logs/{id}",
    params(
        ("id" = i64, Path, description = "Connection log ID")
    ),
    responses(
        (status = 204, description = "Connection log deleted"),
        (status = 404, description = "Not found or already deleted"),
        (status = 500, description = "Server error")
    )
)]
pub async fn delete_connection_log(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match service::delete_connection_log(&state.db, id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Connection log not found or already deleted" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting connection log ({}): {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": format!("Error deleting connection log: {}", e) })),
            )
                .into_response()
        }
    }
}
