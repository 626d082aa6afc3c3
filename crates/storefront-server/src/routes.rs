use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::Response,
    routing::{any, get},
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use storefront_api::{ApiError, AuthHandler, CommentHandler};
use storefront_types::envelope::{HandlerRequest, HandlerResponse};

/// Both handlers, shared across requests. They hold configuration only.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthHandler>,
    pub comments: Arc<CommentHandler>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth", any(auth))
        .route("/comments", any(comments))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

async fn auth(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event = to_event(&method, query, &headers, &body);
    let handler = state.auth.clone();
    run(move || handler.handle(&event)).await
}

async fn comments(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event = to_event(&method, query, &headers, &body);
    let handler = state.comments.clone();
    run(move || handler.handle(&event)).await
}

/// Handlers talk to the store synchronously, so keep them off the async runtime.
async fn run<F>(invoke: F) -> Response
where
    F: FnOnce() -> HandlerResponse + Send + 'static,
{
    match tokio::task::spawn_blocking(invoke).await {
        Ok(resp) => into_http(resp),
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            into_http(ApiError::Internal(e.to_string()).into())
        }
    }
}

fn to_event(
    method: &Method,
    query: HashMap<String, String>,
    headers: &HeaderMap,
    body: &[u8],
) -> HandlerRequest {
    let mut flat: HashMap<String, String> = HashMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            warn!("Dropping non-UTF-8 header {}", name);
            continue;
        };
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    HandlerRequest {
        http_method: Some(method.as_str().to_string()),
        query_string_parameters: Some(query),
        headers: Some(flat),
        body: (!body.is_empty()).then(|| String::from_utf8_lossy(body).into_owned()),
    }
}

fn into_http(resp: HandlerResponse) -> Response {
    let status = StatusCode::from_u16(resp.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut out = Response::new(Body::from(resp.body));
    *out.status_mut() = status;

    for (name, value) in resp.headers {
        match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
            (Ok(name), Ok(value)) => {
                out.headers_mut().insert(name, value);
            }
            _ => warn!("Dropping invalid response header {}", name),
        }
    }

    out
}
