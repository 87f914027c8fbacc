use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Query, Request, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Router,
};
use serde::Deserialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use service::{RotateOutcome, ServerCfgService, ServiceError};

use crate::errors::ApiError;

/// Largest POST body accepted, matching axum's default body limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ServerCfgService>,
}

impl AppState {
    pub fn new(service: ServerCfgService) -> Self {
        Self { service: Arc::new(service) }
    }
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub server: Option<String>,
}

/// Single entry point for every path: dispatch on method only.
///
/// A query string that does not deserialize (e.g. `server` given twice) is
/// treated as if no server was named. The body is only read by POST, after the
/// store has loaded.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    query: Option<Query<LookupQuery>>,
    request: Request,
) -> Result<Response, ApiError> {
    let svc = &state.service;
    match method {
        Method::GET => {
            let server = query.and_then(|Query(q)| q.server);
            let conn = svc.lookup(server.as_deref()).await?;
            Ok(Html(conn).into_response())
        }
        Method::POST => {
            let body = request.into_body();
            let reply = match svc.rotate_with(|| read_body(body)).await? {
                RotateOutcome::Updated { .. } => "OK",
                RotateOutcome::NotFound => "Server not found",
            };
            Ok((StatusCode::OK, reply).into_response())
        }
        _ => {
            svc.check_loadable().await?;
            Ok((StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response())
        }
    }
}

async fn read_body(body: Body) -> Result<Bytes, ServiceError> {
    axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ServiceError::InvalidData(format!("request body: {e}")))
}

/// Build the application router: one fallback handler plus request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
